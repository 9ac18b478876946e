//! Ledger mirror: the latest account, module, and resource views for the
//! active address.
//!
//! Every fetch is keyed by `(Address, RefreshToken)`. [`LedgerMirror::sync`]
//! launches the three fetches as independent local tasks that report back
//! through the app event channel; [`LedgerMirror::apply`] folds a result in.
//! Results can arrive in any order. A result is dropped if it belongs to another
//! address, or to an older refresh than the one already applied to that view.
//! A failed fetch keeps the previous value and marks the view stale.

use std::rc::Rc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::debug::{self, cat};
use crate::error::LedgerError;
use crate::ledger::LedgerClient;
use crate::platform::spawn_local;
use crate::types::{AccountSnapshot, Address, AppEvent, ModuleSet, RefreshToken, ResourceSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorKey {
    pub address: Address,
    pub refresh: RefreshToken,
}

#[derive(Debug)]
pub enum MirrorEvent {
    Account {
        key: MirrorKey,
        result: Result<AccountSnapshot, LedgerError>,
    },
    Modules {
        key: MirrorKey,
        result: Result<ModuleSet, LedgerError>,
    },
    Resources {
        key: MirrorKey,
        result: Result<ResourceSet, LedgerError>,
    },
}

impl MirrorEvent {
    pub fn key(&self) -> &MirrorKey {
        match self {
            MirrorEvent::Account { key, .. }
            | MirrorEvent::Modules { key, .. }
            | MirrorEvent::Resources { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    /// Nothing fetched yet.
    Empty,
    Ready,
    /// Last fetch failed; the value shown is from an earlier fetch (or empty).
    Stale,
}

#[derive(Debug, Clone)]
pub struct Slot<T> {
    value: T,
    applied: Option<RefreshToken>,
    status: ViewStatus,
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Slot {
            value: T::default(),
            applied: None,
            status: ViewStatus::Empty,
        }
    }
}

impl<T> Slot<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    fn is_outdated(&self, refresh: RefreshToken) -> bool {
        matches!(self.applied, Some(applied) if refresh < applied)
    }

    fn fold(&mut self, name: &str, key: &MirrorKey, result: Result<T, LedgerError>) {
        self.applied = Some(key.refresh);
        match result {
            Ok(v) => {
                self.value = v;
                self.status = ViewStatus::Ready;
            }
            Err(e) => {
                log::warn!(
                    "{name} fetch failed for {} (refresh {}): {e}; keeping previous view",
                    key.address,
                    key.refresh.value()
                );
                self.status = ViewStatus::Stale;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LedgerMirror {
    key: Option<MirrorKey>,
    account: Slot<Option<AccountSnapshot>>,
    modules: Slot<ModuleSet>,
    resources: Slot<ResourceSet>,
    in_flight: usize,
}

impl LedgerMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&MirrorKey> {
        self.key.as_ref()
    }

    pub fn account(&self) -> &Slot<Option<AccountSnapshot>> {
        &self.account
    }

    pub fn modules(&self) -> &Slot<ModuleSet> {
        &self.modules
    }

    pub fn resources(&self) -> &Slot<ResourceSet> {
        &self.resources
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Point the mirror at `key` and launch the three fetches. A new address
    /// starts from empty views; a new refresh keeps the current views until
    /// replacements arrive.
    pub fn sync(
        &mut self,
        key: MirrorKey,
        client: Rc<dyn LedgerClient>,
        events: &UnboundedSender<AppEvent>,
    ) {
        if self.key.as_ref().map(|k| &k.address) != Some(&key.address) {
            self.account = Slot::default();
            self.modules = Slot::default();
            self.resources = Slot::default();
        }
        debug::log(
            cat::MIRROR,
            format!("sync {} refresh={}", key.address, key.refresh.value()),
        );
        self.key = Some(key.clone());
        self.in_flight += 3;

        {
            let (client, key, tx) = (client.clone(), key.clone(), events.clone());
            spawn_local(async move {
                let result = client.get_account(&key.address).await;
                let _ = tx.send(AppEvent::Mirror(MirrorEvent::Account { key, result }));
            });
        }
        {
            let (client, key, tx) = (client.clone(), key.clone(), events.clone());
            spawn_local(async move {
                let result = client.get_account_modules(&key.address).await;
                let _ = tx.send(AppEvent::Mirror(MirrorEvent::Modules { key, result }));
            });
        }
        {
            let tx = events.clone();
            spawn_local(async move {
                let result = match client.get_account_resources(&key.address).await {
                    Ok(raw) => ResourceSet::validate(&key.address, raw),
                    Err(e) => Err(e),
                };
                let _ = tx.send(AppEvent::Mirror(MirrorEvent::Resources { key, result }));
            });
        }
    }

    /// Fold one fetch result in. Returns whether it changed the mirror.
    pub fn apply(&mut self, event: MirrorEvent) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        let current = match &self.key {
            Some(k) if k.address == event.key().address => k,
            _ => {
                debug::log(
                    cat::MIRROR,
                    format!("drop result for foreign address {}", event.key().address),
                );
                return false;
            }
        };
        debug_assert!(event.key().refresh <= current.refresh);

        match event {
            MirrorEvent::Account { key, result } => {
                if self.account.is_outdated(key.refresh) {
                    return false;
                }
                self.account.fold("account", &key, result.map(Some));
            }
            MirrorEvent::Modules { key, result } => {
                if self.modules.is_outdated(key.refresh) {
                    return false;
                }
                self.modules.fold("modules", &key, result);
            }
            MirrorEvent::Resources { key, result } => {
                if self.resources.is_outdated(key.refresh) {
                    return false;
                }
                self.resources.fold("resources", &key, result);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModuleAbi, ModuleDescriptor};

    fn key(addr: &str, refresh: u64) -> MirrorKey {
        let mut r = RefreshToken::default();
        for _ in 0..refresh {
            r = r.next();
        }
        MirrorKey {
            address: Address::new(addr),
            refresh: r,
        }
    }

    fn module(name: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            bytecode: String::new(),
            abi: Some(ModuleAbi {
                address: "0xDEF".into(),
                name: name.into(),
            }),
        }
    }

    fn pointed_at(k: MirrorKey, in_flight: usize) -> LedgerMirror {
        LedgerMirror {
            key: Some(k),
            in_flight,
            ..LedgerMirror::default()
        }
    }

    #[test]
    fn partial_arrival_is_consistent() {
        let mut m = pointed_at(key("0xDEF", 0), 3);
        assert!(m.apply(MirrorEvent::Modules {
            key: key("0xDEF", 0),
            result: Ok(vec![module("message")]),
        }));
        assert_eq!(m.modules().status(), ViewStatus::Ready);
        assert_eq!(m.account().status(), ViewStatus::Empty);
        assert!(m.account().value().is_none());
        assert!(m.resources().value().is_empty());
        assert_eq!(m.in_flight(), 2);
    }

    #[test]
    fn older_refresh_never_overwrites_newer() {
        let mut m = pointed_at(key("0xDEF", 2), 6);
        assert!(m.apply(MirrorEvent::Modules {
            key: key("0xDEF", 2),
            result: Ok(vec![module("message")]),
        }));
        assert!(!m.apply(MirrorEvent::Modules {
            key: key("0xDEF", 1),
            result: Ok(vec![]),
        }));
        assert_eq!(m.modules().value().len(), 1);
    }

    #[test]
    fn failure_keeps_previous_value_and_marks_stale() {
        let mut m = pointed_at(key("0xDEF", 1), 2);
        m.apply(MirrorEvent::Account {
            key: key("0xDEF", 0),
            result: Ok(AccountSnapshot {
                sequence_number: 7,
                authentication_key: String::new(),
            }),
        });
        m.apply(MirrorEvent::Account {
            key: key("0xDEF", 1),
            result: Err(LedgerError::Decode {
                url: "u".into(),
                reason: "boom".into(),
            }),
        });
        assert_eq!(m.account().status(), ViewStatus::Stale);
        assert_eq!(m.account().value().as_ref().map(|a| a.sequence_number), Some(7));
    }

    #[test]
    fn foreign_address_is_dropped() {
        let mut m = pointed_at(key("0xDEF", 0), 1);
        assert!(!m.apply(MirrorEvent::Modules {
            key: key("0xABC", 0),
            result: Ok(vec![module("message")]),
        }));
        assert!(m.modules().value().is_empty());
        assert_eq!(m.in_flight(), 0);
    }
}
