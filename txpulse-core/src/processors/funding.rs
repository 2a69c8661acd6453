//! One-shot funding of the generator account before a run.

use crate::ledger::{LedgerClient, LedgerError};
use tracing::{error, info};
use txpulse_sdk::objects::{AccountId, TxHash};
use txpulse_sdk::signer::Signer;

/// Transfer `amount` from the funder to `account`.
///
/// The nonce is left to the node. The transfer is logged to the console
/// only; it never reaches the record channels.
pub async fn fund_account<L: LedgerClient + ?Sized>(
    ledger: &L,
    funder: &dyn Signer,
    account: &AccountId,
    amount: u128,
) -> Result<TxHash, LedgerError> {
    match ledger.submit_transfer(funder, account, amount, None).await {
        Ok(hash) => {
            info!(%account, amount = %amount, %hash, "Funded generator account");
            Ok(hash)
        }
        Err(e) => {
            error!(%account, amount = %amount, error = %e, "Failed to fund generator account");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockLedger, NullSigner};

    #[tokio::test]
    async fn test_funding_uses_node_nonce() {
        let ledger = MockLedger::new();
        let account = AccountId::from("alice");

        let hash = fund_account(&ledger, &NullSigner, &account, 1_000).await.unwrap();

        assert_eq!(hash, TxHash::new(format!("0x{:064x}", 0)));
        let submissions = ledger.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].dest, account);
        assert_eq!(submissions[0].value, 1_000);
        assert_eq!(submissions[0].nonce, None);
    }

    #[tokio::test]
    async fn test_funding_error_is_returned() {
        let mut ledger = MockLedger::new();
        ledger.reject_at = Some(0);

        let result = fund_account(&ledger, &NullSigner, &AccountId::from("alice"), 1).await;

        assert!(matches!(result, Err(LedgerError::Client(_))));
        assert!(ledger.submissions().is_empty());
    }
}
