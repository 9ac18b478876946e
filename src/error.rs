use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed hex: {reason}")]
    MalformedHex { reason: String },
    #[error("decoded bytes are not valid utf-8: {0}")]
    InvalidUtf8(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("node returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("malformed resource {type_tag}: {reason}")]
    MalformedResource { type_tag: String, reason: String },
}

impl LedgerError {
    /// True for HTTP statuses worth a bounded transport retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Status { status, .. } if matches!(status, 429 | 500 | 502 | 503 | 504)
        )
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
    #[error("wallet key error: {0}")]
    Key(String),
    #[error("wallet identity changed: page is {expected}, wallet reports {actual}")]
    IdentityMismatch { expected: String, actual: String },
    #[error("ledger error during wallet operation: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity unavailable: {0}")]
    Unavailable(#[from] WalletError),
    #[error("identity resolution already in progress")]
    Pending,
}

/// Reasons a submit request is refused before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no address resolved yet")]
    NotReady,
    #[error("page is read-only (address override present)")]
    ReadOnly,
    #[error("message module is not published for this address")]
    ModuleMissing,
    #[error("a submission is already in flight")]
    Busy,
}
