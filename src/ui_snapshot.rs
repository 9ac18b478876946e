//! View snapshot for rendering
//!
//! A serializable, one-way (Rust → renderer) picture of the controller. The
//! wasm façade hands it to JS as JSON; the native CLI prints it. This is also
//! where the stored hex message is decoded for display.

use serde::Serialize;

use crate::app::App;
use crate::codec;
use crate::identity::ResolverState;
use crate::mirror::ViewStatus;
use crate::submit::SubmitPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewMode {
    /// Waiting on the wallet.
    Connecting,
    /// Wallet connect failed or was denied; nothing is fetched.
    Disconnected { reason: String },
    /// Module not published: show how to publish it. Non-interactive.
    Instructions { command: String },
    /// Owner view with the message form.
    Editor { submitting: bool },
    /// Someone else's account (URL override).
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub hex: String,
    /// Decoded text; `None` when the stored value is not valid hex/UTF-8.
    pub text: Option<String>,
    pub decode_error: Option<String>,
}

impl RenderedMessage {
    pub fn from_hex(hex: &str) -> Self {
        match codec::decode(hex) {
            Ok(text) => RenderedMessage {
                hex: hex.to_string(),
                text: Some(text),
                decode_error: None,
            },
            Err(e) => {
                log::warn!("stored message is not decodable: {e}");
                RenderedMessage {
                    hex: hex.to_string(),
                    text: None,
                    decode_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Staleness {
    pub account: ViewStatus,
    pub modules: ViewStatus,
    pub resources: ViewStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub address: Option<String>,
    pub editable: bool,
    pub sequence_number: Option<u64>,
    pub mode: ViewMode,
    pub message: Option<RenderedMessage>,
    pub duplicate_messages: usize,
    pub views: Staleness,
    pub refresh: u64,
    /// Whether the most recent submission went through; `None` before any.
    pub last_submit_ok: Option<bool>,
    /// Failure reason for the most recent submission (wallet error or abandonment).
    pub last_submit_error: Option<String>,
}

pub fn publish_command(address: &str) -> String {
    format!(
        "aptos move publish --package-dir /path/to/hello_blockchain/ \
         --named-addresses HelloBlockchain={address}"
    )
}

impl ViewSnapshot {
    pub fn from_app(app: &App) -> Self {
        let mirror = app.mirror();
        let identity = app.identity();

        let mode = match (identity, app.resolver_state()) {
            (None, ResolverState::Unavailable(reason)) => ViewMode::Disconnected {
                reason: reason.clone(),
            },
            (None, _) => ViewMode::Connecting,
            (Some(id), _) if !app.has_message_module() => ViewMode::Instructions {
                command: publish_command(id.address.as_str()),
            },
            (Some(id), _) if id.editable => ViewMode::Editor {
                submitting: app.phase() == SubmitPhase::Submitting,
            },
            (Some(_), _) => ViewMode::ReadOnly,
        };

        let view = app.message_view();
        ViewSnapshot {
            address: identity.map(|id| id.address.to_string()),
            editable: identity.map(|id| id.editable).unwrap_or(false),
            sequence_number: mirror.account().value().as_ref().map(|a| a.sequence_number),
            mode,
            message: view
                .as_ref()
                .and_then(|v| v.current.as_deref())
                .map(RenderedMessage::from_hex),
            duplicate_messages: view.map(|v| v.duplicates).unwrap_or(0),
            views: Staleness {
                account: mirror.account().status(),
                modules: mirror.modules().status(),
                resources: mirror.resources().status(),
            },
            refresh: app.refresh_token().value(),
            last_submit_ok: app.last_outcome_ok(),
            last_submit_error: app.last_failure().map(str::to_string),
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "address:  {}\n",
            self.address.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!(
            "sequence: {}\n",
            self.sequence_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".into())
        ));
        match &self.mode {
            ViewMode::Connecting => out.push_str("status:   connecting to wallet...\n"),
            ViewMode::Disconnected { reason } => {
                out.push_str(&format!("status:   wallet unavailable ({reason})\n"))
            }
            ViewMode::Instructions { command } => {
                out.push_str("Run this command to publish the module:\n");
                out.push_str(&format!("  {command}\n"));
            }
            ViewMode::Editor { submitting } => out.push_str(if *submitting {
                "status:   saving...\n"
            } else {
                "status:   editable\n"
            }),
            ViewMode::ReadOnly => out.push_str("status:   read-only\n"),
        }
        match &self.message {
            Some(RenderedMessage {
                text: Some(text), ..
            }) => out.push_str(&format!("message:  {text}\n")),
            Some(RenderedMessage {
                hex,
                decode_error: Some(err),
                ..
            }) => out.push_str(&format!("message:  <undecodable {hex}: {err}>\n")),
            _ => out.push_str("message:  (none)\n"),
        }
        if self.duplicate_messages > 0 {
            out.push_str(&format!(
                "warning:  {} duplicate MessageHolder records ignored\n",
                self.duplicate_messages
            ));
        }
        if let Some(err) = &self.last_submit_error {
            out.push_str(&format!("last submit failed: {err}\n"));
        }
        let stale: Vec<&str> = [
            ("account", self.views.account),
            ("modules", self.views.modules),
            ("resources", self.views.resources),
        ]
        .iter()
        .filter(|(_, s)| *s == ViewStatus::Stale)
        .map(|(n, _)| *n)
        .collect();
        if !stale.is_empty() {
            out.push_str(&format!("stale:    {}\n", stale.join(", ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hello() {
        let m = RenderedMessage::from_hex("48656c6c6f");
        assert_eq!(m.text.as_deref(), Some("Hello"));
        assert!(m.decode_error.is_none());
    }

    #[test]
    fn undecodable_message_is_flagged_not_garbled() {
        let m = RenderedMessage::from_hex("4865f");
        assert!(m.text.is_none());
        assert!(m.decode_error.is_some());
    }

    #[test]
    fn publish_command_names_address() {
        assert_eq!(
            publish_command("0xDEF"),
            "aptos move publish --package-dir /path/to/hello_blockchain/ \
             --named-addresses HelloBlockchain=0xDEF"
        );
    }

    #[test]
    fn mode_serializes_with_kind_tag() {
        let v = serde_json::to_value(ViewMode::Editor { submitting: true }).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "editor", "submitting": true}));
    }
}
