//! Submission controller pieces: intent construction, the in-flight phase,
//! and the dispatch task whose completion is guaranteed to be reported.

use std::rc::Rc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::codec;
use crate::debug::{self, cat};
use crate::error::WalletError;
use crate::types::{Address, AppEvent, EntryFunctionPayload, SubmitReceipt, TransactionPayload};
use crate::wallet::Wallet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(SubmitReceipt),
    Failed(WalletError),
    /// The dispatch task went away without reporting.
    Abandoned,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// `{address}::message::set_message` with the hex-encoded text as its only argument.
pub fn build_intent(address: &Address, text: &str) -> TransactionPayload {
    TransactionPayload::EntryFunction(EntryFunctionPayload {
        function: address.set_message_function(),
        arguments: vec![codec::encode(text)],
        type_arguments: vec![],
    })
}

/// Reports the submission outcome exactly once, including when the task is
/// dropped before finishing.
pub struct FinishGuard {
    events: UnboundedSender<AppEvent>,
    outcome: Option<SubmitOutcome>,
}

impl FinishGuard {
    pub fn new(events: UnboundedSender<AppEvent>) -> Self {
        FinishGuard {
            events,
            outcome: None,
        }
    }

    pub fn finish(mut self, outcome: SubmitOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(SubmitOutcome::Abandoned);
        let _ = self.events.send(AppEvent::SubmissionFinished(outcome));
    }
}

/// Check the wallet still speaks for `expected`, then sign and submit.
pub async fn dispatch(
    wallet: Rc<dyn Wallet>,
    expected: Address,
    payload: TransactionPayload,
    guard: FinishGuard,
) {
    let outcome = match submit_as(wallet.as_ref(), &expected, &payload).await {
        Ok(receipt) => {
            log::info!(
                "set_message submitted for {expected} (hash {})",
                receipt.hash.as_deref().unwrap_or("?")
            );
            SubmitOutcome::Submitted(receipt)
        }
        Err(e) => {
            log::warn!("set_message for {expected} failed: {e}");
            SubmitOutcome::Failed(e)
        }
    };
    guard.finish(outcome);
}

async fn submit_as(
    wallet: &dyn Wallet,
    expected: &Address,
    payload: &TransactionPayload,
) -> Result<SubmitReceipt, WalletError> {
    let current = wallet.account().await?;
    if &current.address != expected {
        return Err(WalletError::IdentityMismatch {
            expected: expected.to_string(),
            actual: current.address.to_string(),
        });
    }
    debug::log(cat::SUBMIT, format!("dispatching {payload:?}"));
    wallet.sign_and_submit_transaction(payload).await
}
