//! WASM-specific JavaScript bridge functions
//!
//! Rust bindings for the browser wallet extension exposed as `window.aptos`
//! (`connect`, `account`, `signAndSubmitTransaction`) and for reading the page
//! location. Only available when building for WebAssembly targets.

#![cfg(target_arch = "wasm32")]

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::window;

use crate::debug::{self, cat};
use crate::error::WalletError;
use crate::types::{Address, SubmitReceipt, TransactionPayload, WalletAccount};
use crate::wallet::Wallet;

/// `window.location.pathname`, or empty when unavailable.
pub fn current_pathname() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

fn js_err(v: JsValue) -> String {
    v.as_string()
        .or_else(|| {
            Reflect::get(&v, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{v:?}"))
}

/// Bridge to the injected wallet extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserWallet;

impl BrowserWallet {
    fn provider() -> Result<JsValue, WalletError> {
        let win = window().ok_or_else(|| WalletError::Unavailable("no window".into()))?;
        let aptos = Reflect::get(&JsValue::from(win), &JsValue::from_str("aptos"))
            .map_err(|e| WalletError::Unavailable(js_err(e)))?;
        if aptos.is_undefined() || aptos.is_null() {
            return Err(WalletError::Unavailable(
                "wallet extension not installed (window.aptos missing)".into(),
            ));
        }
        Ok(aptos)
    }

    /// Call `window.aptos[method](...args)` and await the returned promise.
    async fn call(method: &str, arg: Option<&JsValue>) -> Result<JsValue, WalletError> {
        let provider = Self::provider()?;
        let f = Reflect::get(&provider, &JsValue::from_str(method))
            .map_err(|e| WalletError::Unavailable(js_err(e)))?;
        if !f.is_function() {
            return Err(WalletError::Unavailable(format!(
                "window.aptos.{method} is not a function"
            )));
        }
        let f = Function::from(f);
        let ret = match arg {
            Some(a) => f.call1(&provider, a),
            None => f.call0(&provider),
        }
        .map_err(|e| WalletError::Rejected(js_err(e)))?;
        debug::log(cat::WALLET, format!("awaiting window.aptos.{method}"));
        JsFuture::from(Promise::resolve(&ret))
            .await
            .map_err(|e| WalletError::Rejected(js_err(e)))
    }

    fn to_account(v: &JsValue) -> Result<WalletAccount, WalletError> {
        let address = Reflect::get(v, &JsValue::from_str("address"))
            .ok()
            .and_then(|a| a.as_string())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| WalletError::Unavailable("wallet returned no address".into()))?;
        let public_key = Reflect::get(v, &JsValue::from_str("publicKey"))
            .ok()
            .and_then(|k| k.as_string());
        Ok(WalletAccount {
            address: Address::new(address),
            public_key,
        })
    }
}

#[async_trait(?Send)]
impl Wallet for BrowserWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        let v = Self::call("connect", None).await?;
        Self::to_account(&v)
    }

    async fn account(&self) -> Result<WalletAccount, WalletError> {
        let v = Self::call("account", None).await?;
        Self::to_account(&v)
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<SubmitReceipt, WalletError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| WalletError::Rejected(format!("payload encoding: {e}")))?;
        let arg = JSON::parse(&json).map_err(|e| WalletError::Rejected(js_err(e)))?;
        let result = Self::call("signAndSubmitTransaction", Some(&arg)).await?;

        let raw = JSON::stringify(&result)
            .ok()
            .and_then(|s| s.as_string())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or(serde_json::Value::Null);
        let hash = raw.get("hash").and_then(|h| h.as_str()).map(str::to_string);
        Ok(SubmitReceipt { hash, raw })
    }
}
