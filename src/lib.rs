//! msgx - on-chain message viewer/editor
//!
//! This library keeps a wallet identity, an optional URL address override, and
//! the ledger's view of one account (account info, published modules,
//! resources) in sync, and lets the owner write a new message through the
//! `message::set_message` entry function.
//!
//! ## Architecture
//!
//! - **Native**: `msgx` CLI over a key-file wallet (`--features native`)
//! - **Web**: `msgx-web-dom` wasm façade over the browser wallet extension
//!   (`--features dom-web`, `wasm32-unknown-unknown`)
//!
//! Both drive the same single-threaded [`App`] controller: identity
//! resolution → [`mirror::LedgerMirror`] fetches keyed by
//! `(Address, RefreshToken)` → [`projection`] → [`ui_snapshot::ViewSnapshot`],
//! with [`submit`] bumping the refresh token after every write attempt.

// Core modules (available on all platforms)
pub mod codec;
pub mod config;
pub mod error;
pub mod types;

// Identity, ledger access and sync
pub mod identity;
pub mod ledger;
pub mod mirror;
pub mod projection;
pub mod router;
pub mod rpc_utils;
pub mod submit;
pub mod wallet;

pub mod app;

// Debug logging system (available on all platforms)
pub mod debug;

// Snapshot types for rendering (all platforms)
pub mod ui_snapshot;

// Platform abstraction layer
pub mod platform;

// Key-file wallet (native only)
#[cfg(feature = "native")]
pub mod credentials;

// WASM-specific JavaScript bridge (web only)
#[cfg(target_arch = "wasm32")]
pub mod webshim;

// Re-export commonly used types
pub use app::App;
pub use config::Config;
pub use types::{Address, AppEvent, RefreshToken};
pub use ui_snapshot::ViewSnapshot;
