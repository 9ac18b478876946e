//! Wallet capability seam.
//!
//! Implementations: the browser extension bridge (`webshim`, wasm), the
//! key-file wallet (`credentials`, native), and [`DetachedWallet`] for
//! read-only sessions.

use async_trait::async_trait;

use crate::error::WalletError;
use crate::types::{SubmitReceipt, TransactionPayload, WalletAccount};

#[async_trait(?Send)]
pub trait Wallet {
    /// Ask for a connection; may suspend on a user prompt.
    async fn connect(&self) -> Result<WalletAccount, WalletError>;

    /// Currently authorized identity, without prompting.
    async fn account(&self) -> Result<WalletAccount, WalletError>;

    /// Sign and submit; suspends until the wallet approves, rejects, or fails.
    async fn sign_and_submit_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<SubmitReceipt, WalletError>;
}

/// A wallet that is never there.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedWallet;

#[async_trait(?Send)]
impl Wallet for DetachedWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        Err(WalletError::Unavailable("no wallet configured".into()))
    }

    async fn account(&self) -> Result<WalletAccount, WalletError> {
        Err(WalletError::Unavailable("no wallet configured".into()))
    }

    async fn sign_and_submit_transaction(
        &self,
        _payload: &TransactionPayload,
    ) -> Result<SubmitReceipt, WalletError> {
        Err(WalletError::Unavailable("no wallet configured".into()))
    }
}
