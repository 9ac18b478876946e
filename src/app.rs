use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;

use crate::debug::{self, cat};
use crate::error::SubmitRejected;
use crate::identity::{Identity, IdentityResolver, Plan, ResolverState};
use crate::ledger::LedgerClient;
use crate::mirror::{LedgerMirror, MirrorKey};
use crate::platform::spawn_local;
use crate::projection::{self, MessageView};
use crate::submit::{self, FinishGuard, SubmitOutcome, SubmitPhase};
use crate::types::{AppEvent, RefreshToken};
use crate::ui_snapshot::ViewSnapshot;
use crate::wallet::Wallet;

/// Top-level controller. Owns the address, the refresh token, the mirror,
/// and the submit phase; every async step reports back through `events` and
/// is folded in by [`App::on_event`].
///
/// Must be driven from a single execution context (a `LocalSet` natively).
pub struct App {
    ledger: Rc<dyn LedgerClient>,
    wallet: Rc<dyn Wallet>,
    events: UnboundedSender<AppEvent>,

    location: String,
    identity: IdentityResolver,
    refresh: RefreshToken,
    mirror: LedgerMirror,
    phase: SubmitPhase,

    last_outcome_ok: Option<bool>,
    last_failure: Option<String>,
}

impl App {
    pub fn new(
        ledger: Rc<dyn LedgerClient>,
        wallet: Rc<dyn Wallet>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            ledger,
            wallet,
            events,
            location: String::new(),
            identity: IdentityResolver::new(),
            refresh: RefreshToken::default(),
            mirror: LedgerMirror::new(),
            phase: SubmitPhase::Idle,
            last_outcome_ok: None,
            last_failure: None,
        }
    }

    // ----- getters -----
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.identity()
    }
    pub fn resolver_state(&self) -> &ResolverState {
        self.identity.state()
    }
    pub fn refresh_token(&self) -> RefreshToken {
        self.refresh
    }
    pub fn mirror(&self) -> &LedgerMirror {
        &self.mirror
    }
    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }
    pub fn last_outcome_ok(&self) -> Option<bool> {
        self.last_outcome_ok
    }
    /// Why the most recent submission did not go through, if it didn't.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn has_message_module(&self) -> bool {
        projection::has_message_module(self.mirror.modules().value())
    }

    pub fn message_view(&self) -> Option<MessageView> {
        let id = self.identity()?;
        Some(MessageView::project(self.mirror.resources().value(), &id.address))
    }

    /// Nothing outstanding: no connect prompt, no fetch, no submission.
    pub fn is_settled(&self) -> bool {
        !self.identity.is_pending()
            && self.mirror.in_flight() == 0
            && self.phase == SubmitPhase::Idle
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::from_app(self)
    }

    /// Resolve identity for `location`. Runs once per page lifetime; calling
    /// again after a failed connect retries the wallet.
    pub fn start(&mut self, location: &str) {
        self.location = location.to_string();
        match self.identity.plan(location) {
            Plan::Resolved(_) => self.resync(),
            Plan::AlreadyResolved(_) | Plan::InFlight => {}
            Plan::Connect => {
                let (wallet, tx) = (self.wallet.clone(), self.events.clone());
                spawn_local(async move {
                    let result = wallet.connect().await;
                    let _ = tx.send(AppEvent::Connected(result));
                });
            }
        }
    }

    /// Retry identity resolution after a failed connect.
    pub fn reconnect(&mut self) {
        let location = self.location.clone();
        self.start(&location);
    }

    /// The one re-fetch rule: whenever (Address, RefreshToken) changes, sync.
    fn resync(&mut self) {
        let Some(id) = self.identity.identity() else {
            return;
        };
        let key = MirrorKey {
            address: id.address.clone(),
            refresh: self.refresh,
        };
        self.mirror.sync(key, self.ledger.clone(), &self.events);
    }

    /// Kick off a `set_message` write with `text` (empty text included).
    pub fn submit(&mut self, text: &str) -> Result<(), SubmitRejected> {
        let id = self.identity().ok_or(SubmitRejected::NotReady)?;
        if !id.editable {
            return Err(SubmitRejected::ReadOnly);
        }
        if !self.has_message_module() {
            return Err(SubmitRejected::ModuleMissing);
        }
        if self.phase == SubmitPhase::Submitting {
            return Err(SubmitRejected::Busy);
        }

        let address = id.address.clone();
        let payload = submit::build_intent(&address, text);
        self.phase = SubmitPhase::Submitting;
        debug::log(cat::SUBMIT, format!("Idle -> Submitting ({} chars)", text.len()));

        let guard = FinishGuard::new(self.events.clone());
        spawn_local(submit::dispatch(self.wallet.clone(), address, payload, guard));
        Ok(())
    }

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Connected(result) => match self.identity.adopt(result) {
                Ok(Some(_)) => self.resync(),
                Ok(None) => {}
                Err(e) => log::warn!("{e}; ledger views stay idle"),
            },
            AppEvent::Mirror(event) => {
                if self.mirror.apply(event) {
                    if let Some(view) = self.message_view() {
                        if view.duplicates > 0 {
                            log::warn!(
                                "{} extra MessageHolder records found; showing the first",
                                view.duplicates
                            );
                        }
                    }
                }
            }
            AppEvent::SubmissionFinished(outcome) => self.finish_submission(outcome),
        }
    }

    fn finish_submission(&mut self, outcome: SubmitOutcome) {
        if self.phase != SubmitPhase::Submitting {
            log::warn!("submission finished while idle; ignoring");
            return;
        }
        self.last_failure = match &outcome {
            SubmitOutcome::Submitted(_) => None,
            SubmitOutcome::Failed(e) => Some(e.to_string()),
            SubmitOutcome::Abandoned => {
                log::warn!("submission task ended without reporting");
                Some("submission abandoned before the wallet answered".to_string())
            }
        };
        debug::log(
            cat::SUBMIT,
            match &self.last_failure {
                None => "outcome: submitted".to_string(),
                Some(reason) => format!("outcome: {reason}"),
            },
        );
        self.last_outcome_ok = Some(outcome.is_success());
        self.phase = SubmitPhase::Idle;
        self.refresh = self.refresh.next();
        debug::log(
            cat::SUBMIT,
            format!("Submitting -> Idle, refresh={}", self.refresh.value()),
        );
        self.resync();
    }
}
