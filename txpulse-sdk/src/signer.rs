//! Signing capability used for transfer submission.
//!
//! The rest of txpulse treats a [`Signer`] as opaque: it only asks for the
//! public key and a signature over a payload. [`Ed25519Signer`] is the
//! implementation built from a hex seed.

use ring::signature::{Ed25519KeyPair, KeyPair};

/// Errors produced while building a signer or a signed payload.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("seed must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("key rejected: {0}")]
    Rejected(String),

    #[error("payload encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ring::error::KeyRejected> for SignerError {
    fn from(value: ring::error::KeyRejected) -> Self {
        Self::Rejected(value.to_string())
    }
}

/// Something that can sign payloads on behalf of one account.
pub trait Signer: Send + Sync {
    fn public_key(&self) -> &[u8];

    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

/// Ed25519 key pair derived from a 32-byte seed.
pub struct Ed25519Signer {
    key_pair: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Build a signer from a hex seed, with or without a `0x` prefix.
    pub fn from_seed_hex(seed: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(seed.trim().trim_start_matches("0x"))?;
        if bytes.len() != 32 {
            return Err(SignerError::InvalidLength(bytes.len()));
        }
        let key_pair = Ed25519KeyPair::from_seed_unchecked(&bytes)?;
        Ok(Self { key_pair })
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.key_pair.sign(payload).as_ref().to_vec()
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_accepts_prefix() {
        let seed = "ab".repeat(32);
        let plain = Ed25519Signer::from_seed_hex(&seed).unwrap();
        let prefixed = Ed25519Signer::from_seed_hex(&format!("0x{seed}")).unwrap();
        assert_eq!(plain.public_key(), prefixed.public_key());
        assert_eq!(plain.public_key().len(), 32);
    }

    #[test]
    fn test_seed_length_checked() {
        assert!(matches!(
            Ed25519Signer::from_seed_hex("abcd"),
            Err(SignerError::InvalidLength(2))
        ));
        assert!(matches!(
            Ed25519Signer::from_seed_hex("not hex"),
            Err(SignerError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_signature_verifies() {
        let signer = Ed25519Signer::from_seed_hex(&"07".repeat(32)).unwrap();
        let signature = signer.sign(b"payload");
        ring::signature::UnparsedPublicKey::new(&ring::signature::ED25519, signer.public_key())
            .verify(b"payload", &signature)
            .unwrap();
    }
}
