use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address as the node renders it (SS58 for Substrate chains).
///
/// Compared byte-for-byte; no address normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Per-account ledger sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(#[serde(deserialize_with = "super::uint_serde::deserialize")] pub u64);

impl Nonce {
    /// The nonce that follows this one. Saturates at `u64::MAX`, which the
    /// node then rejects as stale instead of wrapping to 0.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hex-encoded extrinsic hash, `0x`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_deserializes_from_hex_and_number() {
        let from_number: Nonce = serde_json::from_str("7").unwrap();
        let from_hex: Nonce = serde_json::from_str("\"0x07\"").unwrap();
        assert_eq!(from_number, Nonce(7));
        assert_eq!(from_hex, Nonce(7));
        assert_eq!(from_hex.next(), Nonce(8));
    }

    #[test]
    fn test_nonce_next_saturates() {
        assert_eq!(Nonce(41).next(), Nonce(42));
        assert_eq!(Nonce(u64::MAX).next(), Nonce(u64::MAX));
    }

    #[test]
    fn test_account_id_is_exact_match() {
        let a = AccountId::from("5EHFcagqMUGu47Yx5ZHHY6z5VhMr375U5MmsF1WuFuDFFoix");
        let b = AccountId::from("5ehfcagqmugu47yx5zhhy6z5vhmr375u5mmsf1wufudffoix");
        assert_ne!(a, b);
    }
}
