//! Human-readable log records.
//!
//! The layouts are fixed; downstream tooling greps these files, so the
//! field labels and the dashed delimiters must not change.

use crate::utils::timestamp::{NOT_AVAILABLE, format_timestamp};
use std::fmt;
use txpulse_sdk::objects::{AccountId, BlockNumber, TxHash};

/// Transaction hash as shown in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashField {
    Resolved(TxHash),
    /// The event was not tied to an extrinsic.
    NotAvailable,
}

impl fmt::Display for HashField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashField::Resolved(hash) => hash.fmt(f),
            HashField::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// A submitted or observed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub block_number: BlockNumber,
    /// Chain time in milliseconds.
    pub timestamp: Option<u64>,
    pub from: AccountId,
    /// Omitted from the `From:` line when `None`.
    pub nonce: Option<u64>,
    pub to: AccountId,
    pub amount: u128,
    /// The `Transaction Hash:` line is omitted when `None`.
    pub tx_hash: Option<HashField>,
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------- TRANSACTION LOG -------")?;
        writeln!(f, "Block Number: {}", self.block_number)?;
        writeln!(f, "Timestamp: {}", format_timestamp(self.timestamp))?;
        match self.nonce {
            Some(nonce) => writeln!(f, "From: {} (Account Nonce: {})", self.from, nonce)?,
            None => writeln!(f, "From: {}", self.from)?,
        }
        writeln!(f, "To: {}", self.to)?;
        writeln!(f, "Amount: {} tokens", self.amount)?;
        if let Some(hash) = &self.tx_hash {
            writeln!(f, "Transaction Hash: {hash}")?;
        }
        writeln!(f, "---------------------------------")
    }
}

/// An extrinsic that was included but failed to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub block_number: BlockNumber,
    pub timestamp: Option<u64>,
    /// `section.name` when the metadata resolved it, otherwise the raw error.
    pub error: String,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------- TRANSACTION FAILED -------")?;
        writeln!(f, "Block Number: {}", self.block_number)?;
        writeln!(f, "Timestamp: {}", format_timestamp(self.timestamp))?;
        writeln!(f, "Error: {}", self.error)?;
        writeln!(f, "----------------------------------")
    }
}
