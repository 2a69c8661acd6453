pub mod account;
pub mod chain;
pub mod events;
pub mod transfer;

pub use account::{AccountId, Nonce, TxHash};
pub use chain::{Block, BlockNumber, ExtrinsicInfo, Header, MetaError, ModuleErrorEntry, SignedBlock};
pub use events::{
    ChainEvent, DispatchError, EventDecodeError, EventKind, EventRecord, FailedExtrinsic,
    ModuleError, Phase, TransferEvent,
};
pub use transfer::{SignedTransfer, TransferCall};

/// Accepts a JSON number, a decimal string or a `0x`-prefixed hex string.
///
/// Substrate nodes hex-encode most integers on the wire, while decoded
/// gateways tend to emit plain numbers; both are seen in practice.
pub(crate) fn parse_uint(value: &serde_json::Value) -> Option<u128> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(u128::from),
        serde_json::Value::String(s) => {
            if let Some(hex) = s.strip_prefix("0x") {
                u128::from_str_radix(hex, 16).ok()
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

pub(crate) mod uint_serde {
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u128>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let n = super::parse_uint(&value)
            .ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {value}")))?;
        T::try_from(n).map_err(|_| D::Error::custom(format!("integer {n} out of range")))
    }
}
