//! Identity resolution: URL override or connected wallet, decided once per
//! page lifetime.

use serde::Serialize;

use crate::debug::{self, cat};
use crate::error::{IdentityError, WalletError};
use crate::router::{self, Route};
use crate::types::{Address, WalletAccount};
use crate::wallet::Wallet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub address: Address,
    /// True exactly when no URL override is present.
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Unresolved,
    /// Waiting on the wallet's connect prompt.
    Pending,
    Resolved(Identity),
    /// Connect failed; may be retried.
    Unavailable(String),
}

/// What the caller has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Established just now from the URL.
    Resolved(Identity),
    /// Established earlier; nothing changes.
    AlreadyResolved(Identity),
    /// Call `wallet.connect()` and hand the result to [`IdentityResolver::adopt`].
    Connect,
    /// A connect is already outstanding.
    InFlight,
}

#[derive(Debug)]
pub struct IdentityResolver {
    state: ResolverState,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    pub fn new() -> Self {
        IdentityResolver {
            state: ResolverState::Unresolved,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            ResolverState::Resolved(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == ResolverState::Pending
    }

    pub fn plan(&mut self, location: &str) -> Plan {
        match &self.state {
            ResolverState::Resolved(id) => return Plan::AlreadyResolved(id.clone()),
            ResolverState::Pending => return Plan::InFlight,
            ResolverState::Unresolved | ResolverState::Unavailable(_) => {}
        }
        match router::parse(location) {
            Route::Address { address } => {
                let id = Identity {
                    address,
                    editable: false,
                };
                debug::log(cat::IDENTITY, format!("url override {}", id.address));
                self.state = ResolverState::Resolved(id.clone());
                Plan::Resolved(id)
            }
            Route::Owner => {
                debug::log(cat::IDENTITY, "no override; connecting wallet");
                self.state = ResolverState::Pending;
                Plan::Connect
            }
        }
    }

    /// Apply a connect result. `Ok(None)` means the result arrived when no
    /// connect was outstanding and was ignored.
    pub fn adopt(
        &mut self,
        result: Result<WalletAccount, WalletError>,
    ) -> Result<Option<Identity>, IdentityError> {
        if !self.is_pending() {
            log::debug!("ignoring wallet connect result; resolver is {:?}", self.state);
            return Ok(None);
        }
        match result {
            Ok(account) => {
                let id = Identity {
                    address: account.address,
                    editable: true,
                };
                debug::log(cat::IDENTITY, format!("wallet identity {}", id.address));
                self.state = ResolverState::Resolved(id.clone());
                Ok(Some(id))
            }
            Err(e) => {
                log::warn!("wallet connect failed: {e}");
                self.state = ResolverState::Unavailable(e.to_string());
                Err(IdentityError::Unavailable(e))
            }
        }
    }

    /// Resolve in one go. Never calls the wallet when the URL carries an address.
    pub async fn resolve(
        &mut self,
        location: &str,
        wallet: &dyn Wallet,
    ) -> Result<Identity, IdentityError> {
        match self.plan(location) {
            Plan::Resolved(id) | Plan::AlreadyResolved(id) => Ok(id),
            Plan::InFlight => Err(IdentityError::Pending),
            Plan::Connect => {
                let result = wallet.connect().await;
                match self.adopt(result)? {
                    Some(id) => Ok(id),
                    None => Err(IdentityError::Pending),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> WalletAccount {
        WalletAccount {
            address: Address::new(s),
            public_key: None,
        }
    }

    #[test]
    fn override_resolves_read_only() {
        let mut r = IdentityResolver::new();
        let plan = r.plan("/0xABC");
        assert_eq!(
            plan,
            Plan::Resolved(Identity {
                address: Address::new("0xABC"),
                editable: false
            })
        );
        // second call is a no-op
        assert!(matches!(r.plan("/0xOTHER"), Plan::AlreadyResolved(_)));
    }

    #[test]
    fn owner_mode_waits_for_wallet() {
        let mut r = IdentityResolver::new();
        assert_eq!(r.plan("/"), Plan::Connect);
        assert_eq!(r.plan("/"), Plan::InFlight);
        let id = r.adopt(Ok(account("0xDEF"))).unwrap().unwrap();
        assert!(id.editable);
        assert_eq!(r.identity().map(|i| i.address.as_str()), Some("0xDEF"));
    }

    #[test]
    fn failed_connect_leaves_address_unset_and_can_retry() {
        let mut r = IdentityResolver::new();
        assert_eq!(r.plan(""), Plan::Connect);
        let err = r.adopt(Err(WalletError::Rejected("denied".into())));
        assert!(matches!(err, Err(IdentityError::Unavailable(_))));
        assert!(r.identity().is_none());
        assert_eq!(r.plan(""), Plan::Connect);
    }

    #[test]
    fn stray_connect_result_is_ignored() {
        let mut r = IdentityResolver::new();
        r.plan("/0xABC");
        assert!(r.adopt(Ok(account("0xDEF"))).unwrap().is_none());
        assert_eq!(r.identity().map(|i| i.address.as_str()), Some("0xABC"));
    }
}
