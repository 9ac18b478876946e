//! Ledger node access.
//!
//! [`LedgerClient`] is the read-only seam the mirror depends on; [`RestClient`]
//! implements it against a fullnode REST API and additionally exposes the
//! handful of write-side endpoints the key-file wallet needs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::LedgerError;
use crate::rpc_utils::{build_client, rest_get, rest_post, HttpSettings};
use crate::types::{AccountSnapshot, Address, ModuleSet, RawResource};

pub const DEFAULT_NODE_URL: &str = "https://fullnode.testnet.aptoslabs.com/v1";

const PAGE_LIMIT: usize = 1000;
const MAX_PAGES: usize = 64;

/// Read-only, idempotent account lookups.
#[async_trait(?Send)]
pub trait LedgerClient {
    async fn get_account(&self, address: &Address) -> Result<AccountSnapshot, LedgerError>;
    async fn get_account_modules(&self, address: &Address) -> Result<ModuleSet, LedgerError>;
    async fn get_account_resources(
        &self,
        address: &Address,
    ) -> Result<Vec<RawResource>, LedgerError>;
}

/// Fullnode REST client. Built once with a fixed endpoint; cheap to clone.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, settings: HttpSettings) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        RestClient {
            http: build_client(),
            base_url,
            settings,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn account_url(&self, address: &Address, suffix: &str) -> String {
        format!(
            "{}/accounts/{}{}",
            self.base_url,
            urlencoding::encode(address.as_str()),
            suffix
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LedgerError> {
        let page = rest_get(&self.http, url, &self.settings).await?;
        decode(url, page.body)
    }

    /// Follow `x-aptos-cursor` until the node stops sending one.
    async fn get_paged<T: DeserializeOwned>(&self, base: &str) -> Result<Vec<T>, LedgerError> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let url = match &cursor {
                Some(c) => format!(
                    "{base}?limit={PAGE_LIMIT}&start={}",
                    urlencoding::encode(c)
                ),
                None => format!("{base}?limit={PAGE_LIMIT}"),
            };
            let page = rest_get(&self.http, &url, &self.settings).await?;
            let mut items: Vec<T> = decode(&url, page.body)?;
            out.append(&mut items);
            match page.cursor {
                Some(next) if Some(&next) != cursor.as_ref() => cursor = Some(next),
                Some(_) => {
                    return Err(LedgerError::Decode {
                        url,
                        reason: "pagination cursor did not advance".into(),
                    })
                }
                None => return Ok(out),
            }
        }
        Err(LedgerError::Decode {
            url: base.to_string(),
            reason: format!("more than {MAX_PAGES} pages"),
        })
    }

    /// BCS signing message for an unsigned transaction, as a `0x` hex string.
    pub async fn encode_submission(&self, unsigned: &Value) -> Result<String, LedgerError> {
        let url = format!("{}/transactions/encode_submission", self.base_url);
        let v = rest_post(&self.http, &url, unsigned, &self.settings).await?;
        decode(&url, v)
    }

    pub async fn submit_transaction(&self, signed: &Value) -> Result<Value, LedgerError> {
        let url = format!("{}/transactions", self.base_url);
        rest_post(&self.http, &url, signed, &self.settings).await
    }

    /// Long-polls the node until the transaction is committed or the node gives up.
    pub async fn wait_for_transaction(&self, hash: &str) -> Result<Value, LedgerError> {
        let url = format!(
            "{}/transactions/wait_by_hash/{}",
            self.base_url,
            urlencoding::encode(hash)
        );
        self.get_json(&url).await
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: Value) -> Result<T, LedgerError> {
    serde_json::from_value(body).map_err(|e| LedgerError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait(?Send)]
impl LedgerClient for RestClient {
    async fn get_account(&self, address: &Address) -> Result<AccountSnapshot, LedgerError> {
        self.get_json(&self.account_url(address, "")).await
    }

    async fn get_account_modules(&self, address: &Address) -> Result<ModuleSet, LedgerError> {
        self.get_paged(&self.account_url(address, "/modules")).await
    }

    async fn get_account_resources(
        &self,
        address: &Address,
    ) -> Result<Vec<RawResource>, LedgerError> {
        self.get_paged(&self.account_url(address, "/resources")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let c = RestClient::new("https://node.example/v1/", HttpSettings::default());
        assert_eq!(c.base_url(), "https://node.example/v1");
        assert_eq!(
            c.account_url(&Address::new("0xABC"), "/modules"),
            "https://node.example/v1/accounts/0xABC/modules"
        );
    }
}
