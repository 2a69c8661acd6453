//! Chain event records as delivered by the event subscription.
//!
//! Every notification carries all events of one block in index order:
//!
//! ```json
//! [{"phase":{"applyExtrinsic":1},
//!   "event":{"section":"balances","method":"Transfer","data":["5E..","5H..","0x2a"]}}]
//! ```

use super::account::AccountId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where in block processing an event was deposited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// While applying the extrinsic at this index.
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub phase: Phase,
    pub event: ChainEvent,
}

/// An event as an opaque `section.method` tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("{section}.{method}: missing field {index}")]
    MissingField {
        section: String,
        method: String,
        index: usize,
    },

    #[error("{section}.{method}: field {index} has unexpected shape: {value}")]
    InvalidField {
        section: String,
        method: String,
        index: usize,
        value: String,
    },
}

/// `balances.Transfer` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: AccountId,
    pub to: AccountId,
    pub value: u128,
}

/// `system.ExtrinsicFailed` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedExtrinsic {
    /// Typed error, `None` when the node sent a variant this crate does not know.
    pub error: Option<DispatchError>,
    /// The error exactly as it appeared on the wire.
    pub raw: String,
}

/// The event classes txpulse acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Transfer(TransferEvent),
    ExtrinsicFailed(FailedExtrinsic),
    Other,
}

impl ChainEvent {
    pub fn is(&self, section: &str, method: &str) -> bool {
        self.section == section && self.method == method
    }

    /// Classify and decode the payload of the events the monitor cares about.
    pub fn classify(&self) -> Result<EventKind, EventDecodeError> {
        if self.is("balances", "Transfer") {
            let from = self.account_field(0)?;
            let to = self.account_field(1)?;
            let value_field = self.field(2)?;
            let value = super::parse_uint(value_field)
                .ok_or_else(|| self.invalid(2, value_field))?;
            Ok(EventKind::Transfer(TransferEvent { from, to, value }))
        } else if self.is("system", "ExtrinsicFailed") {
            let raw_error = self.field(0)?;
            let error = serde_json::from_value::<DispatchError>(raw_error.clone()).ok();
            Ok(EventKind::ExtrinsicFailed(FailedExtrinsic {
                error,
                raw: raw_error.to_string(),
            }))
        } else {
            Ok(EventKind::Other)
        }
    }

    fn field(&self, index: usize) -> Result<&Value, EventDecodeError> {
        self.data.get(index).ok_or_else(|| EventDecodeError::MissingField {
            section: self.section.clone(),
            method: self.method.clone(),
            index,
        })
    }

    fn account_field(&self, index: usize) -> Result<AccountId, EventDecodeError> {
        let value = self.field(index)?;
        value
            .as_str()
            .map(AccountId::from)
            .ok_or_else(|| self.invalid(index, value))
    }

    fn invalid(&self, index: usize, value: &Value) -> EventDecodeError {
        EventDecodeError::InvalidField {
            section: self.section.clone(),
            method: self.method.clone(),
            index,
            value: value.to_string(),
        }
    }
}

/// Why an included extrinsic failed to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchError {
    Other,
    CannotLookup,
    BadOrigin,
    Module(ModuleError),
    ConsumerRemaining,
    NoProviders,
    TooManyConsumers,
    Token(String),
    Arithmetic(String),
    Transactional(String),
    Exhausted,
    Corruption,
    Unavailable,
    RootNotAllowed,
}

impl DispatchError {
    pub fn as_module(&self) -> Option<&ModuleError> {
        match self {
            DispatchError::Module(m) => Some(m),
            _ => None,
        }
    }
}

/// A pallet error: the pallet's index in the runtime and the error's index
/// within that pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleError {
    pub index: u8,
    #[serde(deserialize_with = "module_error_code")]
    pub error: u8,
}

/// Newer runtimes send the error as a 4-byte little-endian array in hex
/// (`"0x02000000"`); the first byte is the in-pallet code.
fn module_error_code<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| D::Error::custom(format!("module error code out of range: {n}"))),
        Value::String(s) => {
            let bytes = hex::decode(s.trim_start_matches("0x")).map_err(D::Error::custom)?;
            bytes
                .first()
                .copied()
                .ok_or_else(|| D::Error::custom("empty module error code"))
        }
        other => Err(D::Error::custom(format!("unexpected module error code: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(section: &str, method: &str, data: Vec<Value>) -> ChainEvent {
        ChainEvent {
            section: section.to_string(),
            method: method.to_string(),
            data,
        }
    }

    #[test]
    fn test_phase_wire_format() {
        let apply: Phase = serde_json::from_value(json!({"applyExtrinsic": 3})).unwrap();
        let finalization: Phase = serde_json::from_value(json!("finalization")).unwrap();
        assert_eq!(apply, Phase::ApplyExtrinsic(3));
        assert_eq!(finalization, Phase::Finalization);
    }

    #[test]
    fn test_classify_transfer() {
        let ev = event("balances", "Transfer", vec![json!("alice"), json!("bob"), json!("0x2a")]);
        let EventKind::Transfer(transfer) = ev.classify().unwrap() else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.from, AccountId::from("alice"));
        assert_eq!(transfer.to, AccountId::from("bob"));
        assert_eq!(transfer.value, 42);
    }

    #[test]
    fn test_classify_transfer_missing_value() {
        let ev = event("balances", "Transfer", vec![json!("alice"), json!("bob")]);
        assert!(matches!(
            ev.classify(),
            Err(EventDecodeError::MissingField { index: 2, .. })
        ));
    }

    #[test]
    fn test_classify_extrinsic_failed_module() {
        let raw = json!({"module": {"index": 3, "error": "0x02000000"}});
        let ev = event("system", "ExtrinsicFailed", vec![raw.clone(), json!({"weight": 0})]);
        let EventKind::ExtrinsicFailed(failed) = ev.classify().unwrap() else {
            panic!("expected failure");
        };
        assert_eq!(
            failed.error.as_ref().and_then(DispatchError::as_module),
            Some(&ModuleError { index: 3, error: 2 })
        );
        assert_eq!(failed.raw, raw.to_string());
    }

    #[test]
    fn test_classify_extrinsic_failed_unknown_variant_keeps_raw() {
        let ev = event("system", "ExtrinsicFailed", vec![json!({"somethingNew": 1})]);
        let EventKind::ExtrinsicFailed(failed) = ev.classify().unwrap() else {
            panic!("expected failure");
        };
        assert!(failed.error.is_none());
        assert_eq!(failed.raw, r#"{"somethingNew":1}"#);
    }

    #[test]
    fn test_classify_other() {
        let ev = event("system", "ExtrinsicSuccess", vec![]);
        assert_eq!(ev.classify().unwrap(), EventKind::Other);
    }
}
