//! Thin REST helpers over reqwest with a small, bounded retry on transient
//! HTTP statuses (429/5xx). Callers above this layer never retry.

use std::time::Duration;

use serde_json::Value;

use crate::error::LedgerError;
use crate::platform::sleep;

/// Response header carrying the pagination cursor for list endpoints.
pub const CURSOR_HEADER: &str = "x-aptos-cursor";

#[derive(Clone, Debug)]
pub struct HttpSettings {
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_ms: 8000,
            retries: 2,
        }
    }
}

pub fn build_client() -> reqwest::Client {
    #[cfg(not(target_arch = "wasm32"))]
    {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default http client: {e}");
                reqwest::Client::new()
            })
    }

    #[cfg(target_arch = "wasm32")]
    {
        reqwest::Client::new()
    }
}

/// A JSON body plus the pagination cursor, if the node sent one.
#[derive(Debug)]
pub struct Page {
    pub body: Value,
    pub cursor: Option<String>,
}

pub async fn rest_get(
    client: &reqwest::Client,
    url: &str,
    settings: &HttpSettings,
) -> Result<Page, LedgerError> {
    with_retry(url, settings, || get_once(client, url, settings)).await
}

async fn get_once(
    client: &reqwest::Client,
    url: &str,
    settings: &HttpSettings,
) -> Result<Page, LedgerError> {
    let res = client
        .get(url)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .send()
        .await?;
    let cursor = res
        .headers()
        .get(CURSOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = read_json(url, res).await?;
    Ok(Page { body, cursor })
}

/// POST is never retried: a submit that timed out may still have landed.
pub async fn rest_post(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
    settings: &HttpSettings,
) -> Result<Value, LedgerError> {
    let res = client
        .post(url)
        .json(body)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .send()
        .await?;
    read_json(url, res).await
}

async fn read_json(url: &str, res: reqwest::Response) -> Result<Value, LedgerError> {
    let status = res.status();
    if status.is_success() {
        return res.json::<Value>().await.map_err(|e| LedgerError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        });
    }
    // Node errors look like {"message": "...", "error_code": "...", "vm_error_code": ...}
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(text);
    Err(LedgerError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        message,
    })
}

async fn with_retry<T, F, Fut>(
    label: &str,
    settings: &HttpSettings,
    mut op: F,
) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LedgerError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < settings.retries => {
                attempt += 1;
                let back_ms = backoff_delay_ms(attempt);
                log::warn!("{label}: {e}; retry={attempt} backoff={back_ms}ms");
                sleep(Duration::from_millis(back_ms)).await;
            }
            other => return other,
        }
    }
}

fn backoff_delay_ms(attempt: u32) -> u64 {
    let base = 150u64.saturating_mul(1u64 << (attempt.clamp(1, 6) - 1)); // 150,300,600,...
    base + jitter_ms()
}

#[cfg(feature = "native")]
fn jitter_ms() -> u64 {
    use rand::{thread_rng, Rng};
    thread_rng().gen_range(0..=100)
}

#[cfg(not(feature = "native"))]
fn jitter_ms() -> u64 {
    0
}
