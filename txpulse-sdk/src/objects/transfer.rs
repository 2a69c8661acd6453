//! Signed transfer payloads submitted through `author_submitTransfer`.
//!
//! The signed bytes are the canonical JSON of the [`TransferCall`]; the node
//! verifies the signature against the attached public key.

use super::account::{AccountId, Nonce};
use crate::signer::{Signer, SignerError};
use serde::{Deserialize, Serialize};

/// A `balances.transfer` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCall {
    pub dest: AccountId,
    /// Serialized as a decimal string, balances overflow JSON numbers.
    #[serde(with = "u128_string")]
    pub value: u128,
    /// `None` lets the node pick the account's next nonce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
}

/// A transfer call together with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransfer {
    pub call: TransferCall,
    /// Hex-encoded public key of the signer.
    pub signer: String,
    /// Hex-encoded signature over the call's JSON.
    pub signature: String,
}

impl SignedTransfer {
    /// Serialize `call`, sign it with `signer` and assemble the payload.
    pub fn new(call: TransferCall, signer: &dyn Signer) -> Result<Self, SignerError> {
        let json = serde_json::to_vec(&call)?;
        let signature = signer.sign(&json);
        Ok(Self {
            call,
            signer: format!("0x{}", hex::encode(signer.public_key())),
            signature: format!("0x{}", hex::encode(signature)),
        })
    }
}

mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        super::super::parse_uint(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid balance: {value}")))
    }
}
