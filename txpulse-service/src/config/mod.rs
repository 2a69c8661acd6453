//! Configuration module for txpulse.
//!
//! Every option is read from a command-line flag or, failing that, from the
//! environment. Validation turns the raw arguments into a [`ServiceConfig`]
//! before any connection is made, so a bad key or a missing address fails
//! fast.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use txpulse_core::config::{GeneratorConfig, WatchedPair};
use txpulse_sdk::objects::AccountId;
use txpulse_sdk::signer::{Ed25519Signer, SignerError};
use url::Url;

/// txpulse - transfer load generator and event monitor for a ledger node
#[derive(Parser, Debug, Clone)]
#[command(name = "txpulse")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// WebSocket endpoint of the ledger node
    #[arg(long, env = "PARACHAIN_URL", default_value = "ws://127.0.0.1:9944")]
    pub url: Url,

    /// Account the generator sends from
    #[arg(long, env = "USER_ADDRESS")]
    pub user_address: Option<String>,

    /// Hex seed of the generator account's key
    #[arg(long, env = "USER_PRIVATE_KEY", hide_env_values = true)]
    pub user_private_key: Option<String>,

    /// Starting amount; the first transfer carries this plus one
    #[arg(long = "initial-amount", env = "INITIAL_TRANSFER_AMOUNT", default_value_t = 0)]
    pub initial_amount: u128,

    /// How long to keep monitoring after generation finishes, in milliseconds
    #[arg(long = "run-time-ms", env = "SERVICE_RUN_TIME", default_value_t = 60_000)]
    pub run_time_ms: u64,

    /// Number of transfers to submit
    #[arg(long, env = "MAX_TRANSACTIONS", default_value_t = 100)]
    pub max_transactions: usize,

    /// Transfers submitted between pauses (0 disables pacing)
    #[arg(long, env = "TRANSACTIONS_PER_BLOCK", default_value_t = 10)]
    pub transactions_per_block: usize,

    /// Hex seed of the key that funds the generator account
    #[arg(long, env = "FUNDER_PRIVATE_KEY", hide_env_values = true)]
    pub funder_private_key: Option<String>,

    /// Account the generator sends to
    #[arg(long, env = "RECIPIENT_ADDRESS")]
    pub recipient_address: Option<String>,

    /// Sender of the transfers the monitor records (defaults to the user address)
    #[arg(long, env = "WATCH_SENDER")]
    pub watch_sender: Option<String>,

    /// Recipient of the transfers the monitor records (defaults to the recipient address)
    #[arg(long, env = "WATCH_RECIPIENT")]
    pub watch_recipient: Option<String>,

    /// Pause between batches in milliseconds (defaults to two minimum block periods)
    #[arg(long, env = "BATCH_DELAY_MS")]
    pub batch_delay_ms: Option<u64>,

    /// Directory holding the three record files
    #[arg(long, env = "LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// Only monitor; submit nothing
    #[arg(long)]
    pub monitor_only: bool,

    /// Skip the funding transfer before generation
    #[arg(long)]
    pub no_fund: bool,
}

/// Errors that can occur while validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is not a valid key: {source}")]
    InvalidKey {
        name: &'static str,
        #[source]
        source: SignerError,
    },
}

/// What the service does after connecting.
#[derive(Debug)]
pub enum Mode {
    /// Record events until a shutdown signal arrives.
    MonitorOnly,
    /// Optionally fund, generate, then keep monitoring for `run_time`.
    Generate {
        generator: GeneratorConfig,
        signer: Arc<Ed25519Signer>,
        funder: Option<Arc<Ed25519Signer>>,
        run_time: Duration,
    },
}

/// Validated service configuration.
#[derive(Debug)]
pub struct ServiceConfig {
    pub url: Url,
    pub log_dir: PathBuf,
    pub watched: WatchedPair,
    pub mode: Mode,
}

impl TryFrom<Args> for ServiceConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, ConfigError> {
        let user_address = non_empty(args.user_address);
        let recipient_address = non_empty(args.recipient_address);

        let watched = WatchedPair::new(
            non_empty(args.watch_sender)
                .or_else(|| user_address.clone())
                .map(AccountId::from)
                .ok_or(ConfigError::Missing("WATCH_SENDER or USER_ADDRESS"))?,
            non_empty(args.watch_recipient)
                .or_else(|| recipient_address.clone())
                .map(AccountId::from)
                .ok_or(ConfigError::Missing("WATCH_RECIPIENT or RECIPIENT_ADDRESS"))?,
        );

        let mode = if args.monitor_only {
            Mode::MonitorOnly
        } else {
            let sender = user_address.ok_or(ConfigError::Missing("USER_ADDRESS"))?;
            let recipient = recipient_address.ok_or(ConfigError::Missing("RECIPIENT_ADDRESS"))?;
            let signer = load_signer("USER_PRIVATE_KEY", non_empty(args.user_private_key))?;
            let funder = if args.no_fund {
                None
            } else {
                Some(load_signer(
                    "FUNDER_PRIVATE_KEY",
                    non_empty(args.funder_private_key),
                )?)
            };

            Mode::Generate {
                generator: GeneratorConfig {
                    sender: AccountId::from(sender),
                    recipient: AccountId::from(recipient),
                    initial_amount: args.initial_amount,
                    max_transactions: args.max_transactions,
                    transactions_per_batch: args.transactions_per_block,
                    batch_delay: args.batch_delay_ms.map(Duration::from_millis),
                },
                signer,
                funder,
                run_time: Duration::from_millis(args.run_time_ms),
            }
        };

        Ok(Self {
            url: args.url,
            log_dir: args.log_dir,
            watched,
            mode,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn load_signer(
    name: &'static str,
    seed: Option<String>,
) -> Result<Arc<Ed25519Signer>, ConfigError> {
    let seed = seed.ok_or(ConfigError::Missing(name))?;
    Ed25519Signer::from_seed_hex(&seed)
        .map(Arc::new)
        .map_err(|source| ConfigError::InvalidKey { name, source })
}
