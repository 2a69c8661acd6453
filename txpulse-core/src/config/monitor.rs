use txpulse_sdk::objects::AccountId;

/// The sender/recipient pair whose transfers the monitor records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedPair {
    pub sender: AccountId,
    pub recipient: AccountId,
}

impl WatchedPair {
    pub fn new(sender: AccountId, recipient: AccountId) -> Self {
        Self { sender, recipient }
    }

    /// Exact match on both ends of the transfer.
    pub fn matches(&self, from: &AccountId, to: &AccountId) -> bool {
        &self.sender == from && &self.recipient == to
    }
}
