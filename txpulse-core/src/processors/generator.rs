//! TransactionGenerator processor.
//!
//! The TransactionGenerator is responsible for:
//! - Seeding its nonce from the chain, once
//! - Submitting transfers with a locally advanced nonce and an escalating amount
//! - Recording each submission with the chain head and time at submission
//! - Pausing between batches so the node's pool is not flooded
//!
//! The nonce is never re-read from the chain after seeding. Waiting for
//! inclusion before every submission would serialize the run on block time.
//! The price is that a rejected submission leaves the local counter out of
//! step with the chain for the rest of the run.

use crate::config::GeneratorConfig;
use crate::ledger::{LedgerClient, LedgerError};
use crate::records::{HashField, TransactionRecord};
use crate::sink::{LogChannel, RecordSink, SinkError};
use crate::utils::pacing::{as_millis_u64, is_batch_boundary};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};
use txpulse_sdk::objects::{AccountId, Nonce};
use txpulse_sdk::signer::Signer;

/// Errors that stop a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Submission or chain query failed
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The generated record could not be written
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Outcome of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub submitted: usize,
    pub next_nonce: Option<Nonce>,
    pub last_amount: u128,
}

/// Submits nonce-ordered transfers from one sender to one recipient.
pub struct TransactionGenerator<L> {
    ledger: Arc<L>,
    signer: Arc<dyn Signer>,
    sink: Arc<dyn RecordSink>,
    sender: AccountId,
    recipient: AccountId,
    nonce: Option<Nonce>,
    amount: u128,
}

impl<L: LedgerClient> TransactionGenerator<L> {
    /// Create a new TransactionGenerator.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Connection to the node, shared with the monitor
    /// * `signer` - Signs transfers on behalf of `config.sender`
    /// * `sink` - Receives generated records
    /// * `config` - Sender, recipient and starting amount
    pub fn new(
        ledger: Arc<L>,
        signer: Arc<dyn Signer>,
        sink: Arc<dyn RecordSink>,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            ledger,
            signer,
            sink,
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            nonce: None,
            amount: config.initial_amount,
        }
    }

    /// The nonce the next submission will use, once seeded.
    pub fn next_nonce(&self) -> Option<Nonce> {
        self.nonce
    }

    /// The amount of the most recent submission.
    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// Submit up to `max_count` transfers, sleeping `per_batch_delay` after
    /// every `batch_size`-th one.
    ///
    /// Stops at the first error. Nonce and amount progress made before the
    /// error is kept.
    pub async fn generate(
        &mut self,
        max_count: usize,
        batch_size: usize,
        per_batch_delay: Duration,
    ) -> Result<GenerationReport, GeneratorError> {
        let mut nonce = self.seed_nonce().await?;

        info!(
            sender = %self.sender,
            recipient = %self.recipient,
            start_nonce = %nonce,
            max_count,
            batch_size,
            per_batch_delay_ms = as_millis_u64(per_batch_delay),
            "Starting transaction generation"
        );

        let mut submitted = 0usize;

        for i in 0..max_count {
            self.amount += 1;

            let hash = self
                .ledger
                .submit_transfer(self.signer.as_ref(), &self.recipient, self.amount, Some(nonce))
                .await
                .map_err(|e| {
                    error!(
                        nonce = %nonce,
                        amount = %self.amount,
                        submitted,
                        error = %e,
                        "Transfer submission failed, stopping generation"
                    );
                    e
                })?;

            // The node holds this nonce now, whatever happens to the record.
            self.nonce = Some(nonce.next());
            submitted += 1;

            let block_number = self.ledger.block_number().await?;
            let timestamp = self.ledger.timestamp().await?;

            let record = TransactionRecord {
                block_number,
                timestamp,
                from: self.sender.clone(),
                nonce: Some(nonce.0),
                to: self.recipient.clone(),
                amount: self.amount,
                tx_hash: Some(HashField::Resolved(hash)),
            };
            self.sink
                .append(LogChannel::Generated, &record.to_string())
                .await?;

            nonce = nonce.next();

            if is_batch_boundary(i, batch_size) {
                debug!(submitted, "Batch complete, pausing");
                tokio::time::sleep(per_batch_delay).await;
            }
        }

        info!(submitted, next_nonce = %nonce, "Transaction generation finished");

        Ok(GenerationReport {
            submitted,
            next_nonce: self.nonce,
            last_amount: self.amount,
        })
    }

    async fn seed_nonce(&mut self) -> Result<Nonce, LedgerError> {
        if let Some(nonce) = self.nonce {
            return Ok(nonce);
        }
        let nonce = self.ledger.next_nonce(&self.sender).await?;
        debug!(account = %self.sender, %nonce, "Seeded nonce from chain");
        self.nonce = Some(nonce);
        Ok(nonce)
    }
}
