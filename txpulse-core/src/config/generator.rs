use std::time::Duration;
use txpulse_sdk::objects::AccountId;

/// What the transaction generator sends, and how fast.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub sender: AccountId,
    pub recipient: AccountId,
    /// The first transfer carries `initial_amount + 1`.
    pub initial_amount: u128,
    pub max_transactions: usize,
    /// Submissions between pauses. 0 disables pacing.
    pub transactions_per_batch: usize,
    /// Pause after each batch. `None` derives it from the chain's minimum period.
    pub batch_delay: Option<Duration>,
}
