//! txpulse
//!
//! Drives a stream of nonce-ordered transfers against a ledger node and
//! records, side by side, what was submitted and what the chain reports.

mod config;
mod shutdown;

use anyhow::Context;
use clap::Parser;
use config::{Args, Mode, ServiceConfig};
use shutdown::shutdown_signal;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use txpulse_core::config::GeneratorConfig;
use txpulse_core::ledger::{LedgerClient, RpcLedger};
use txpulse_core::processors::{EventMonitor, MonitorError, TransactionGenerator, fund_account};
use txpulse_core::sink::{FileSink, LogChannel, RecordSink};
use txpulse_core::utils::pacing::{as_millis_u64, default_batch_delay};
use txpulse_sdk::signer::Ed25519Signer;

type MonitorHandle = JoinHandle<Result<(), MonitorError>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting txpulse v{}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::try_from(args).map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    // Connect to the node
    tracing::info!("Connecting to ledger node at {}", config.url);
    let ledger = Arc::new(RpcLedger::connect(&config.url).await.map_err(|e| {
        tracing::error!("Failed to connect to ledger node: {}", e);
        e
    })?);
    tracing::info!("Ledger node connection established");

    let file_sink = FileSink::new(&config.log_dir);
    for channel in LogChannel::ALL {
        tracing::debug!(%channel, path = %file_sink.path(channel).display(), "Record channel");
    }
    let sink: Arc<dyn RecordSink> = Arc::new(file_sink);

    // Start the monitor before anything is submitted
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = EventMonitor::new(ledger.clone(), sink.clone(), config.watched.clone());
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx));

    let result = match config.mode {
        Mode::MonitorOnly => {
            tracing::info!("Starting in monitoring mode");
            run_monitor_only(monitor_handle, shutdown_tx).await
        }
        Mode::Generate {
            generator,
            signer,
            funder,
            run_time,
        } => {
            let generated = generate(ledger, sink, &generator, signer, funder).await;
            match generated {
                Ok(()) => {
                    tracing::info!(
                        run_time_ms = as_millis_u64(run_time),
                        "Generation finished, monitoring until run time elapses"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(run_time) => {}
                        _ = shutdown_signal() => {}
                    }
                    stop_monitor(&monitor_handle, &shutdown_tx);
                    tracing::info!("Service has completed its run");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Transaction generation failed: {:#}", e);
                    stop_monitor(&monitor_handle, &shutdown_tx);
                    Err(e)
                }
            }
        }
    };

    tracing::info!("Shutdown complete");
    result
}

/// Fund the generator account if a funder is configured, then submit the
/// configured number of transfers.
async fn generate(
    ledger: Arc<RpcLedger>,
    sink: Arc<dyn RecordSink>,
    config: &GeneratorConfig,
    signer: Arc<Ed25519Signer>,
    funder: Option<Arc<Ed25519Signer>>,
) -> anyhow::Result<()> {
    if let Some(funder) = funder {
        fund_account(
            &*ledger,
            &*funder,
            &config.sender,
            config.initial_amount,
        )
        .await
        .context("funding transfer failed")?;
    }

    let batch_delay = match config.batch_delay {
        Some(delay) => delay,
        None => {
            let period = ledger
                .minimum_period()
                .await
                .context("failed to read the chain's minimum block period")?;
            default_batch_delay(period)
        }
    };

    let mut generator = TransactionGenerator::new(ledger, signer, sink, config);
    let report = generator
        .generate(
            config.max_transactions,
            config.transactions_per_batch,
            batch_delay,
        )
        .await?;

    tracing::info!(
        submitted = report.submitted,
        last_amount = %report.last_amount,
        "Submitted all transfers"
    );
    Ok(())
}

/// Run until a shutdown signal, or until the monitor stops on its own.
async fn run_monitor_only(
    mut monitor_handle: MonitorHandle,
    shutdown_tx: watch::Sender<bool>,
) -> anyhow::Result<()> {
    let finished = tokio::select! {
        _ = shutdown_signal() => None,
        finished = &mut monitor_handle => Some(finished),
    };

    match finished {
        None => {
            stop_monitor(&monitor_handle, &shutdown_tx);
            Ok(())
        }
        Some(finished) => {
            finished.context("monitor task panicked")??;
            anyhow::bail!("event stream ended")
        }
    }
}

/// Halt the monitor where it stands. A batch in progress is not finished.
fn stop_monitor(monitor_handle: &MonitorHandle, shutdown_tx: &watch::Sender<bool>) {
    let _ = shutdown_tx.send(true);
    monitor_handle.abort();
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn,tokio_tungstenite=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_monitor_halts_a_busy_monitor() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        // Stands in for a monitor stuck inside a batch: it never looks at
        // the shutdown channel again.
        let handle: MonitorHandle = tokio::spawn(async move {
            let _shutdown_rx = shutdown_rx;
            std::future::pending::<()>().await;
            Ok(())
        });

        stop_monitor(&handle, &shutdown_tx);

        let joined = tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .unwrap();
        assert!(joined.unwrap_err().is_cancelled());
        assert!(*shutdown_tx.borrow());
    }
}
