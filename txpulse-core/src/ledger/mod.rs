//! The ledger node as seen by the generator and the monitor.
//!
//! [`LedgerClient`] is the seam between the processors and the node
//! connection. [`RpcLedger`] implements it over the JSON-RPC WebSocket
//! client; tests use an in-memory double.

mod registry;
mod rpc;

pub use registry::MetadataRegistry;
pub use rpc::RpcLedger;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use txpulse_sdk::client::ClientError;
use txpulse_sdk::objects::{
    AccountId, Block, BlockNumber, EventRecord, MetaError, ModuleError, Nonce, TxHash,
};
use txpulse_sdk::signer::{Signer, SignerError};

/// All events of one block, in index order.
pub type EventBatch = Vec<EventRecord>;

/// Errors surfaced by a ledger client.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection, transport or node-side RPC failure
    #[error("node client error: {0}")]
    Client(#[from] ClientError),

    /// The transfer could not be signed
    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    /// The metadata has no entry for this module error
    #[error("no metadata for module {index} error {error}")]
    MetadataNotFound { index: u8, error: u8 },
}

/// Operations the processors need from the ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign and broadcast a transfer. `nonce: None` lets the node choose.
    ///
    /// Returns once the node has accepted the extrinsic into its pool, not
    /// when it is included in a block.
    async fn submit_transfer(
        &self,
        signer: &dyn Signer,
        dest: &AccountId,
        value: u128,
        nonce: Option<Nonce>,
    ) -> Result<TxHash, LedgerError>;

    /// Number of the current chain head.
    async fn block_number(&self) -> Result<BlockNumber, LedgerError>;

    /// Current chain head with its extrinsic hashes.
    async fn block(&self) -> Result<Block, LedgerError>;

    /// Chain time in milliseconds since the epoch.
    async fn timestamp(&self) -> Result<Option<u64>, LedgerError>;

    /// Next nonce the chain expects from `account`.
    async fn next_nonce(&self, account: &AccountId) -> Result<Nonce, LedgerError>;

    /// Application-level sequence counter for `account` (`tokenManager.nonces`).
    async fn app_sequence(&self, account: &AccountId) -> Result<Option<u64>, LedgerError>;

    /// The chain's minimum period between blocks.
    async fn minimum_period(&self) -> Result<Duration, LedgerError>;

    /// Resolve a module error to its `section.name` from the runtime metadata.
    fn find_meta_error(&self, module: ModuleError) -> Result<MetaError, LedgerError>;

    /// Start the standing event subscription.
    async fn subscribe_events(&self) -> Result<Box<dyn EventStream>, LedgerError>;
}

/// A stream of per-block event batches.
#[async_trait]
pub trait EventStream: Send {
    /// Next batch, or `None` when the subscription has ended.
    async fn next_batch(&mut self) -> Option<Result<EventBatch, LedgerError>>;
}
