use super::{LogChannel, RecordSink, SinkError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Writes each channel to its own text file under one directory and echoes
/// every record to the console trace.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, channel: LogChannel) -> PathBuf {
        self.dir.join(channel.file_name())
    }
}

#[async_trait]
impl RecordSink for FileSink {
    async fn append(&self, channel: LogChannel, record: &str) -> Result<(), SinkError> {
        match channel {
            LogChannel::Monitored => info!(%channel, "MONITORED {record}"),
            _ => info!(%channel, "{record}"),
        }

        let io_err = |source: std::io::Error| SinkError::Io { channel, source };

        // One write per record so O_APPEND keeps records whole.
        let mut line = String::with_capacity(record.len() + 1);
        line.push_str(record);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(channel))
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}
