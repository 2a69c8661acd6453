//! EventMonitor processor.
//!
//! The EventMonitor is responsible for:
//! - Holding one standing subscription to the chain's event stream
//! - Resolving block number, block body and chain time for each batch
//! - Recording `balances.Transfer` events between the watched pair
//! - Recording every `system.ExtrinsicFailed` event, decoded where possible
//!
//! Correlation with generated transfers is by address pair only. When
//! several transfers between the pair are in flight, a monitored record
//! cannot be tied to a specific generated one.

use crate::config::WatchedPair;
use crate::ledger::{EventBatch, LedgerClient, LedgerError};
use crate::records::{FailureRecord, HashField, TransactionRecord};
use crate::sink::{LogChannel, RecordSink, SinkError};
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use txpulse_sdk::objects::{
    Block, BlockNumber, DispatchError, EventKind, FailedExtrinsic, Phase, TransferEvent,
};

/// Errors that stop the monitor or abandon a whole event batch.
///
/// Failures tied to a single event never surface here; they are logged and
/// the next event is handled.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Subscription or block context query failed
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// What one batch produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub monitored: usize,
    pub failed: usize,
    pub ignored: usize,
    /// Records that could not be written.
    pub dropped: usize,
}

/// Block context shared by every event in a batch.
struct BatchContext {
    block_number: BlockNumber,
    block: Block,
    timestamp: Option<u64>,
}

/// Watches the chain event stream for one sender/recipient pair.
pub struct EventMonitor<L> {
    ledger: Arc<L>,
    sink: Arc<dyn RecordSink>,
    watched: WatchedPair,
}

impl<L: LedgerClient> EventMonitor<L> {
    /// Create a new EventMonitor.
    pub fn new(ledger: Arc<L>, sink: Arc<dyn RecordSink>, watched: WatchedPair) -> Self {
        Self {
            ledger,
            sink,
            watched,
        }
    }

    /// Subscribe and process batches until shutdown or until the stream ends.
    ///
    /// Only a failed subscription is returned as an error; errors inside a
    /// batch are logged and the next batch is processed normally.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), MonitorError> {
        let mut stream = self.ledger.subscribe_events().await?;

        info!(
            sender = %self.watched.sender,
            recipient = %self.watched.recipient,
            "EventMonitor started"
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("EventMonitor received shutdown signal");
                        break;
                    }
                }

                batch = stream.next_batch() => match batch {
                    Some(Ok(batch)) => match self.handle_batch(batch).await {
                        Ok(summary) => debug!(
                            monitored = summary.monitored,
                            failed = summary.failed,
                            ignored = summary.ignored,
                            dropped = summary.dropped,
                            "Processed event batch"
                        ),
                        Err(e) => error!(error = %e, "Failed to process event batch"),
                    },
                    Some(Err(e)) => {
                        warn!(error = %e, "Skipping undecodable event batch");
                    }
                    None => {
                        warn!("Event stream ended");
                        break;
                    }
                },
            }
        }

        info!("EventMonitor shutdown complete");
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "EventMonitor:batch", fields(events = batch.len()))]
    async fn handle_batch(&self, batch: EventBatch) -> Result<BatchSummary, MonitorError> {
        let ctx = self.context().await?;
        let mut summary = BatchSummary::default();

        for record in batch {
            match record.event.classify() {
                Ok(EventKind::Transfer(transfer)) => {
                    if self.watched.matches(&transfer.from, &transfer.to) {
                        match self.record_transfer(&ctx, record.phase, transfer).await {
                            Ok(()) => summary.monitored += 1,
                            Err(e) => {
                                error!(
                                    block = ctx.block_number,
                                    error = %e,
                                    "Dropped monitored record"
                                );
                                summary.dropped += 1;
                            }
                        }
                    } else {
                        summary.ignored += 1;
                    }
                }
                Ok(EventKind::ExtrinsicFailed(failed)) => {
                    match self.record_failure(&ctx, &failed).await {
                        Ok(()) => summary.failed += 1,
                        Err(e) => {
                            error!(
                                block = ctx.block_number,
                                error = %e,
                                "Dropped failure record"
                            );
                            summary.dropped += 1;
                        }
                    }
                }
                Ok(EventKind::Other) => summary.ignored += 1,
                Err(e) => {
                    warn!(block = ctx.block_number, error = %e, "Skipping undecodable event");
                    summary.ignored += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn context(&self) -> Result<BatchContext, LedgerError> {
        let block_number = self.ledger.block_number().await?;
        let block = self.ledger.block().await?;
        let timestamp = self.ledger.timestamp().await?;
        Ok(BatchContext {
            block_number,
            block,
            timestamp,
        })
    }

    async fn record_transfer(
        &self,
        ctx: &BatchContext,
        phase: Phase,
        transfer: TransferEvent,
    ) -> Result<(), SinkError> {
        let tx_hash = resolve_hash(phase, &ctx.block);
        // The sequence annotation is optional in the record layout.
        let sequence = match self.ledger.app_sequence(&transfer.from).await {
            Ok(sequence) => sequence,
            Err(e) => {
                warn!(account = %transfer.from, error = %e, "App sequence unavailable");
                None
            }
        };

        let record = TransactionRecord {
            block_number: ctx.block_number,
            timestamp: ctx.timestamp,
            from: transfer.from,
            nonce: sequence,
            to: transfer.to,
            amount: transfer.value,
            tx_hash,
        };
        self.sink
            .append(LogChannel::Monitored, &record.to_string())
            .await
    }

    async fn record_failure(
        &self,
        ctx: &BatchContext,
        failed: &FailedExtrinsic,
    ) -> Result<(), SinkError> {
        let record = FailureRecord {
            block_number: ctx.block_number,
            timestamp: ctx.timestamp,
            error: self.describe_failure(failed),
        };
        self.sink
            .append(LogChannel::Failed, &record.to_string())
            .await
    }

    /// `section.name` for module errors the metadata knows, the raw error
    /// otherwise.
    fn describe_failure(&self, failed: &FailedExtrinsic) -> String {
        let Some(module) = failed.error.as_ref().and_then(DispatchError::as_module) else {
            return failed.raw.clone();
        };
        match self.ledger.find_meta_error(*module) {
            Ok(meta) => meta.to_string(),
            Err(e) => {
                debug!(error = %e, raw = %failed.raw, "Falling back to raw dispatch error");
                failed.raw.clone()
            }
        }
    }
}

/// Hash of the extrinsic that deposited an event.
///
/// Events outside extrinsic application have no hash (`N/A`); an index the
/// fetched block does not contain yields no hash line at all.
pub fn resolve_hash(phase: Phase, block: &Block) -> Option<HashField> {
    match phase {
        Phase::ApplyExtrinsic(index) => block
            .extrinsic_hash(index)
            .cloned()
            .map(HashField::Resolved),
        Phase::Finalization | Phase::Initialization => Some(HashField::NotAvailable),
    }
}

impl<L: LedgerClient> Processor<EventBatch> for EventMonitor<L> {
    type Output = BatchSummary;
    type Error = MonitorError;

    async fn process(&self, batch: EventBatch) -> Result<BatchSummary, MonitorError> {
        self.handle_batch(batch).await
    }
}
