//! In-memory ledger and sink doubles for processor tests.

use crate::ledger::{EventBatch, EventStream, LedgerClient, LedgerError};
use crate::sink::{LogChannel, RecordSink, SinkError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use txpulse_sdk::client::ClientError;
use txpulse_sdk::objects::{
    AccountId, Block, BlockNumber, ExtrinsicInfo, Header, MetaError, ModuleError, Nonce, TxHash,
};
use txpulse_sdk::signer::Signer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub dest: AccountId,
    pub value: u128,
    pub nonce: Option<Nonce>,
    pub at: tokio::time::Instant,
}

pub struct MockLedger {
    pub next_nonce: Nonce,
    pub block_number: BlockNumber,
    pub extrinsics: Vec<TxHash>,
    pub timestamp: Option<u64>,
    pub app_sequence: Option<u64>,
    /// Make every `app_sequence` query fail.
    pub app_sequence_error: bool,
    pub minimum_period: Duration,
    pub meta_errors: HashMap<(u8, u8), MetaError>,
    /// 0-based submission index that the node rejects.
    pub reject_at: Option<usize>,
    pub nonce_queries: AtomicUsize,
    pub submissions: Mutex<Vec<Submission>>,
    events: Mutex<Option<mpsc::Receiver<EventBatch>>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            next_nonce: Nonce(0),
            block_number: 100,
            extrinsics: Vec::new(),
            timestamp: Some(1_700_000_000_000),
            app_sequence: None,
            app_sequence_error: false,
            minimum_period: Duration::from_millis(3000),
            meta_errors: HashMap::new(),
            reject_at: None,
            nonce_queries: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
            events: Mutex::new(None),
        }
    }

    /// Attach an event feed; returns the sending half.
    pub fn with_events(self) -> (Self, mpsc::Sender<EventBatch>) {
        let (tx, rx) = mpsc::channel(16);
        *self.events.lock().unwrap() = Some(rx);
        (self, tx)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn submit_transfer(
        &self,
        _signer: &dyn Signer,
        dest: &AccountId,
        value: u128,
        nonce: Option<Nonce>,
    ) -> Result<TxHash, LedgerError> {
        let mut submissions = self.submissions.lock().unwrap();
        let index = submissions.len();
        if self.reject_at == Some(index) {
            return Err(LedgerError::Client(ClientError::Rpc {
                code: 1010,
                message: "Invalid Transaction: Transaction is outdated".to_string(),
            }));
        }
        submissions.push(Submission {
            dest: dest.clone(),
            value,
            nonce,
            at: tokio::time::Instant::now(),
        });
        Ok(TxHash::new(format!("0x{index:064x}")))
    }

    async fn block_number(&self) -> Result<BlockNumber, LedgerError> {
        Ok(self.block_number)
    }

    async fn block(&self) -> Result<Block, LedgerError> {
        Ok(Block {
            header: Header {
                number: self.block_number,
            },
            extrinsics: self
                .extrinsics
                .iter()
                .cloned()
                .map(|hash| ExtrinsicInfo { hash })
                .collect(),
        })
    }

    async fn timestamp(&self) -> Result<Option<u64>, LedgerError> {
        Ok(self.timestamp)
    }

    async fn next_nonce(&self, _account: &AccountId) -> Result<Nonce, LedgerError> {
        self.nonce_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_nonce)
    }

    async fn app_sequence(&self, _account: &AccountId) -> Result<Option<u64>, LedgerError> {
        if self.app_sequence_error {
            return Err(LedgerError::Client(ClientError::Rpc {
                code: -32601,
                message: "Method not found".to_string(),
            }));
        }
        Ok(self.app_sequence)
    }

    async fn minimum_period(&self) -> Result<Duration, LedgerError> {
        Ok(self.minimum_period)
    }

    fn find_meta_error(&self, module: ModuleError) -> Result<MetaError, LedgerError> {
        self.meta_errors
            .get(&(module.index, module.error))
            .cloned()
            .ok_or(LedgerError::MetadataNotFound {
                index: module.index,
                error: module.error,
            })
    }

    async fn subscribe_events(&self) -> Result<Box<dyn EventStream>, LedgerError> {
        let rx = self
            .events
            .lock()
            .unwrap()
            .take()
            .ok_or(LedgerError::Client(ClientError::Closed))?;
        Ok(Box::new(rx))
    }
}

#[async_trait]
impl EventStream for mpsc::Receiver<EventBatch> {
    async fn next_batch(&mut self) -> Option<Result<EventBatch, LedgerError>> {
        self.recv().await.map(Ok)
    }
}

/// Signer that is never asked to sign by the mock ledger.
pub struct NullSigner;

impl Signer for NullSigner {
    fn public_key(&self) -> &[u8] {
        &[0; 32]
    }

    fn sign(&self, _payload: &[u8]) -> Vec<u8> {
        vec![0; 64]
    }
}

/// Collects appended records per channel.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<(LogChannel, String)>>,
    failing: Vec<LogChannel>,
}

impl MemorySink {
    /// A sink whose every append fails.
    pub fn failing() -> Self {
        Self::failing_on(&LogChannel::ALL)
    }

    /// A sink whose appends to `channels` fail; other channels work.
    pub fn failing_on(channels: &[LogChannel]) -> Self {
        Self {
            failing: channels.to_vec(),
            ..Default::default()
        }
    }

    pub fn records(&self, channel: LogChannel) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, channel: LogChannel, record: &str) -> Result<(), SinkError> {
        if self.failing.contains(&channel) {
            return Err(SinkError::Io {
                channel,
                source: std::io::Error::other("disk full"),
            });
        }
        self.records
            .lock()
            .unwrap()
            .push((channel, record.to_string()));
        Ok(())
    }
}
