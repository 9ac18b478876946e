use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{LedgerError, WalletError};
use crate::mirror::MirrorEvent;
use crate::submit::SubmitOutcome;

/// ABI name of the published module that owns `set_message`.
pub const MESSAGE_MODULE: &str = "message";
pub const MESSAGE_HOLDER_STRUCT: &str = "MessageHolder";
pub const SET_MESSAGE_FN: &str = "set_message";

/// Opaque account identifier. Compared byte-for-byte, never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Address(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{address}::message::MessageHolder`
    pub fn message_holder_type(&self) -> String {
        format!("{}::{MESSAGE_MODULE}::{MESSAGE_HOLDER_STRUCT}", self.0)
    }

    /// `{address}::message::set_message`
    pub fn set_message_function(&self) -> String {
        format!("{}::{MESSAGE_MODULE}::{SET_MESSAGE_FN}", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bumped once per finished submission; the only non-address re-fetch trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RefreshToken(u64);

impl RefreshToken {
    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        RefreshToken(self.0.wrapping_add(1))
    }
}

/// The node encodes u64 values as decimal strings.
fn de_u64_str<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }
    match StrOrNum::deserialize(de)? {
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
        StrOrNum::Num(n) => Ok(n),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(deserialize_with = "de_u64_str")]
    pub sequence_number: u64,
    #[serde(default)]
    pub authentication_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAbi {
    pub address: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub bytecode: String,
    #[serde(default)]
    pub abi: Option<ModuleAbi>,
}

impl ModuleDescriptor {
    pub fn abi_name(&self) -> Option<&str> {
        self.abi.as_ref().map(|a| a.name.as_str())
    }
}

pub type ModuleSet = Vec<ModuleDescriptor>;

/// A resource exactly as the node returns it, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawResource {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHolder {
    /// Hex-encoded UTF-8, as written by `set_message`.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    MessageHolder(MessageHolder),
    Opaque(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub type_tag: String,
    pub data: ResourceData,
}

/// Validated resource list, in node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    records: Vec<ResourceRecord>,
}

impl ResourceSet {
    /// Parse raw records for `address`. A record tagged as this address's
    /// message holder must carry `{message: string}`; anything else is kept opaque.
    pub fn validate(address: &Address, raw: Vec<RawResource>) -> Result<Self, LedgerError> {
        let holder_type = address.message_holder_type();
        let mut records = Vec::with_capacity(raw.len());
        for r in raw {
            let data = if r.type_tag == holder_type {
                let holder: MessageHolder = serde_json::from_value(r.data).map_err(|e| {
                    LedgerError::MalformedResource {
                        type_tag: r.type_tag.clone(),
                        reason: e.to_string(),
                    }
                })?;
                ResourceData::MessageHolder(holder)
            } else {
                ResourceData::Opaque(r.data)
            };
            records.push(ResourceRecord {
                type_tag: r.type_tag,
                data,
            });
        }
        Ok(ResourceSet { records })
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Transaction payload as the wallet and node accept it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionPayload {
    #[serde(rename = "entry_function_payload")]
    EntryFunction(EntryFunctionPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    pub function: String,
    pub arguments: Vec<String>,
    pub type_arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: Address,
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub hash: Option<String>,
    pub raw: Value,
}

#[derive(Debug)]
pub enum AppEvent {
    /// Wallet connect finished (owner mode only).
    Connected(Result<WalletAccount, WalletError>),
    Mirror(MirrorEvent),
    SubmissionFinished(SubmitOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn qualified_names() {
        let a = Address::new("0xDEF");
        assert_eq!(a.message_holder_type(), "0xDEF::message::MessageHolder");
        assert_eq!(a.set_message_function(), "0xDEF::message::set_message");
    }

    #[test]
    fn account_snapshot_parses_string_sequence_number() {
        let v = json!({"sequence_number": "42", "authentication_key": "0xabc"});
        let snap: AccountSnapshot = serde_json::from_value(v).unwrap();
        assert_eq!(snap.sequence_number, 42);
    }

    #[test]
    fn payload_wire_shape() {
        let payload = TransactionPayload::EntryFunction(EntryFunctionPayload {
            function: "0xDEF::message::set_message".into(),
            arguments: vec!["48656c6c6f".into()],
            type_arguments: vec![],
        });
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "type": "entry_function_payload",
                "function": "0xDEF::message::set_message",
                "arguments": ["48656c6c6f"],
                "type_arguments": []
            })
        );
    }

    #[test]
    fn validate_rejects_malformed_holder() {
        let a = Address::new("0xDEF");
        let raw = vec![RawResource {
            type_tag: a.message_holder_type(),
            data: json!({"msg": 1}),
        }];
        assert!(matches!(
            ResourceSet::validate(&a, raw),
            Err(LedgerError::MalformedResource { .. })
        ));
    }

    #[test]
    fn validate_keeps_foreign_records_opaque() {
        let a = Address::new("0xDEF");
        let raw = vec![
            RawResource {
                type_tag: "0x1::account::Account".into(),
                data: json!({"sequence_number": "3"}),
            },
            RawResource {
                // another address's holder is not ours to validate
                type_tag: "0xABC::message::MessageHolder".into(),
                data: json!({"unexpected": true}),
            },
        ];
        let set = ResourceSet::validate(&a, raw).unwrap();
        assert_eq!(set.len(), 2);
        assert!(matches!(set.records()[1].data, ResourceData::Opaque(_)));
    }
}
