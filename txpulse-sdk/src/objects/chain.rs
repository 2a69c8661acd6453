//! Block and metadata views returned by the node.

use super::account::TxHash;
use serde::{Deserialize, Serialize};

pub type BlockNumber = u64;

/// Block header. Only the number is needed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    #[serde(deserialize_with = "super::uint_serde::deserialize")]
    pub number: BlockNumber,
}

/// `chain_getBlock` response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedBlock {
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
    pub header: Header,
    #[serde(default)]
    pub extrinsics: Vec<ExtrinsicInfo>,
}

impl Block {
    /// Hash of the extrinsic at `index`, if the block has one there.
    pub fn extrinsic_hash(&self, index: u32) -> Option<&TxHash> {
        self.extrinsics.get(index as usize).map(|x| &x.hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtrinsicInfo {
    pub hash: TxHash,
}

/// A resolved module error, rendered as `section.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaError {
    pub section: String,
    pub name: String,
}

impl std::fmt::Display for MetaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section, self.name)
    }
}

/// One row of the node's module error table (`metadata_moduleErrors`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleErrorEntry {
    pub index: u8,
    pub error: u8,
    pub section: String,
    pub name: String,
}
