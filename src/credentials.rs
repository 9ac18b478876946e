//! Key-file wallet for native builds
//!
//! Loads an ed25519 private key from a JSON file and signs through the node:
//! the node BCS-encodes the unsigned transaction
//! (`/transactions/encode_submission`), we sign those bytes, then submit the
//! signed JSON and wait for it to commit.
//!
//! Key file format:
//! `{"private_key": "0x<64 hex>", "account_address": "0x..."}`
//! `account_address` is optional; without it the address is derived from the
//! public key (single-key ed25519 authentication key).

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use serde::Deserialize;
use serde_json::{json, Value};
use sha3::{Digest, Sha3_256};

use crate::config::GasSettings;
use crate::debug::{self, cat};
use crate::error::WalletError;
use crate::ledger::{LedgerClient, RestClient};
use crate::types::{Address, SubmitReceipt, TransactionPayload, WalletAccount};
use crate::wallet::Wallet;

/// Seconds a submitted transaction stays valid.
const EXPIRATION_SECS: i64 = 600;
/// Authentication-key scheme byte for single ed25519 keys.
const ED25519_SCHEME: u8 = 0x00;

#[derive(Debug, Deserialize)]
struct KeyFile {
    private_key: String,
    #[serde(default)]
    account_address: Option<String>,
}

pub struct LocalWallet {
    key: SigningKey,
    address: Address,
    node: RestClient,
    gas: GasSettings,
}

/// Accepts `0x`-prefixed or bare hex, and the `ed25519-priv-0x...` form.
fn parse_private_key(s: &str) -> Result<SigningKey, WalletError> {
    let s = s.trim();
    let s = s.strip_prefix("ed25519-priv-").unwrap_or(s);
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| WalletError::Key(format!("private key: {e}")))?;
    let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        WalletError::Key(format!("private key is {} bytes, want 32", b.len()))
    })?;
    Ok(SigningKey::from_bytes(&arr))
}

/// `sha3-256(public_key || 0x00)`, hex with `0x`.
pub fn derive_address(public_key: &[u8; 32]) -> Address {
    let mut h = Sha3_256::new();
    h.update(public_key);
    h.update([ED25519_SCHEME]);
    Address::new(format!("0x{}", hex::encode(h.finalize())))
}

/// A receipt counts only once the node reports a committed, successful user
/// transaction. `wait_by_hash` can hand back a still-pending body.
fn check_committed(hash: &str, committed: &Value) -> Result<(), WalletError> {
    let kind = committed
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown");
    if kind != "user_transaction" {
        return Err(WalletError::Rejected(format!(
            "{hash} not committed: node reports {kind}"
        )));
    }
    if committed.get("success").and_then(|s| s.as_bool()) != Some(true) {
        let status = committed
            .get("vm_status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown vm status");
        return Err(WalletError::Rejected(format!("{hash} failed: {status}")));
    }
    Ok(())
}

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

impl LocalWallet {
    pub fn from_parts(
        private_key: &str,
        account_address: Option<&str>,
        node: RestClient,
        gas: GasSettings,
    ) -> Result<Self, WalletError> {
        let key = parse_private_key(private_key)?;
        let address = match account_address {
            Some(a) if !a.trim().is_empty() => Address::new(a.trim()),
            _ => derive_address(&key.verifying_key().to_bytes()),
        };
        Ok(LocalWallet {
            key,
            address,
            node,
            gas,
        })
    }

    pub fn load(path: &Path, node: RestClient, gas: GasSettings) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading key file {}", path.display()))?;
        let file: KeyFile = serde_json::from_str(&content)
            .with_context(|| format!("parsing key file {}", path.display()))?;
        let wallet =
            Self::from_parts(&file.private_key, file.account_address.as_deref(), node, gas)?;
        log::info!("loaded local wallet for {}", wallet.address);
        Ok(wallet)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    fn public_key_hex(&self) -> String {
        hex0x(&self.key.verifying_key().to_bytes())
    }

    fn account_info(&self) -> WalletAccount {
        WalletAccount {
            address: self.address.clone(),
            public_key: Some(self.public_key_hex()),
        }
    }

    fn unsigned(
        &self,
        sequence_number: u64,
        payload: &TransactionPayload,
    ) -> Result<Value, WalletError> {
        let expiration = chrono::Utc::now().timestamp() + EXPIRATION_SECS;
        let payload = serde_json::to_value(payload)
            .map_err(|e| WalletError::Rejected(format!("payload encoding: {e}")))?;
        Ok(json!({
            "sender": self.address.as_str(),
            "sequence_number": sequence_number.to_string(),
            "max_gas_amount": self.gas.max_gas_amount.to_string(),
            "gas_unit_price": self.gas.gas_unit_price.to_string(),
            "expiration_timestamp_secs": expiration.to_string(),
            "payload": payload,
        }))
    }
}

#[async_trait(?Send)]
impl Wallet for LocalWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        Ok(self.account_info())
    }

    async fn account(&self) -> Result<WalletAccount, WalletError> {
        Ok(self.account_info())
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<SubmitReceipt, WalletError> {
        let account = self.node.get_account(&self.address).await?;
        let mut txn = self.unsigned(account.sequence_number, payload)?;

        let signing_message = self.node.encode_submission(&txn).await?;
        let message = hex::decode(signing_message.trim_start_matches("0x"))
            .map_err(|e| WalletError::Rejected(format!("signing message: {e}")))?;
        let signature = self.key.sign(&message);
        debug::log(
            cat::WALLET,
            format!("signed seq={} for {}", account.sequence_number, self.address),
        );

        txn["signature"] = json!({
            "type": "ed25519_signature",
            "public_key": self.public_key_hex(),
            "signature": hex0x(&signature.to_bytes()),
        });
        let pending = self.node.submit_transaction(&txn).await?;
        let hash = pending
            .get("hash")
            .and_then(|h| h.as_str())
            .map(str::to_string)
            .ok_or_else(|| WalletError::Rejected("node returned no transaction hash".into()))?;

        let committed = self.node.wait_for_transaction(&hash).await?;
        check_committed(&hash, &committed)?;
        Ok(SubmitReceipt {
            hash: Some(hash),
            raw: committed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc_utils::HttpSettings;

    const KEY: &str = "0x9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

    fn node() -> RestClient {
        RestClient::new("http://localhost:8080/v1", HttpSettings::default())
    }

    #[test]
    fn derives_address_from_key() {
        let w = LocalWallet::from_parts(KEY, None, node(), GasSettings::default()).unwrap();
        let a = w.address().as_str();
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 66);
        // deterministic
        let again = LocalWallet::from_parts(KEY, None, node(), GasSettings::default()).unwrap();
        assert_eq!(w.address(), again.address());
    }

    #[test]
    fn explicit_address_wins() {
        let w = LocalWallet::from_parts(KEY, Some("0xDEF"), node(), GasSettings::default())
            .unwrap();
        assert_eq!(w.address().as_str(), "0xDEF");
    }

    #[test]
    fn accepts_prefixed_key_forms() {
        let bare = KEY.trim_start_matches("0x");
        assert!(parse_private_key(bare).is_ok());
        assert!(parse_private_key(&format!("ed25519-priv-{KEY}")).is_ok());
    }

    #[test]
    fn rejects_short_key() {
        assert!(matches!(parse_private_key("0xdead"), Err(WalletError::Key(_))));
    }

    #[test]
    fn only_successful_user_transactions_count() {
        let pending = json!({"hash": "0xaa", "type": "pending_transaction"});
        let err = check_committed("0xaa", &pending).unwrap_err();
        assert!(err.to_string().contains("not committed"), "{err}");

        let aborted = json!({
            "hash": "0xaa",
            "type": "user_transaction",
            "success": false,
            "vm_status": "Move abort"
        });
        let err = check_committed("0xaa", &aborted).unwrap_err();
        assert!(err.to_string().contains("Move abort"), "{err}");

        let ok = json!({"hash": "0xaa", "type": "user_transaction", "success": true});
        assert!(check_committed("0xaa", &ok).is_ok());
    }

    #[test]
    fn unsigned_transaction_shape() {
        let w = LocalWallet::from_parts(KEY, Some("0xDEF"), node(), GasSettings::default())
            .unwrap();
        let payload = crate::submit::build_intent(w.address(), "Hello");
        let txn = w.unsigned(5, &payload).unwrap();
        assert_eq!(txn["sender"], "0xDEF");
        assert_eq!(txn["sequence_number"], "5");
        assert_eq!(txn["payload"]["type"], "entry_function_payload");
        assert_eq!(txn["payload"]["arguments"][0], "48656c6c6f");
    }
}
