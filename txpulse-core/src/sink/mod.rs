//! Append-only record channels.
//!
//! Three independent channels receive pre-formatted records:
//!
//! - `Generated`: transfers the generator submitted
//! - `Monitored`: watched transfers seen in chain events
//! - `Failed`: extrinsics that failed to dispatch, from any account

mod file;

pub use file::FileSink;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    Generated,
    Monitored,
    Failed,
}

impl LogChannel {
    pub const ALL: [LogChannel; 3] = [
        LogChannel::Generated,
        LogChannel::Monitored,
        LogChannel::Failed,
    ];

    /// File backing this channel.
    pub fn file_name(self) -> &'static str {
        match self {
            LogChannel::Generated => "generated_transactions.txt",
            LogChannel::Monitored => "monitored_transactions.txt",
            LogChannel::Failed => "failed_transactions.txt",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogChannel::Generated => "generated",
            LogChannel::Monitored => "monitored",
            LogChannel::Failed => "failed",
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to append to {channel} log: {source}")]
    Io {
        channel: LogChannel,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for formatted records.
///
/// Each call appends one whole record; implementations must not interleave
/// two records within a channel.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, channel: LogChannel, record: &str) -> Result<(), SinkError>;
}
