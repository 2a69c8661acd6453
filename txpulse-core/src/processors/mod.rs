//! Processors that drive a load run.
//!
//! - `TransactionGenerator`: submits nonce-ordered transfers, emits generated records
//! - `EventMonitor`: receives chain event batches, emits monitored and failure records
//! - `fund_account`: tops up the generator account before a run

pub mod funding;
pub mod generator;
pub mod monitor;

pub use funding::fund_account;
pub use generator::{GenerationReport, GeneratorError, TransactionGenerator};
pub use monitor::{BatchSummary, EventMonitor, MonitorError, resolve_hash};
