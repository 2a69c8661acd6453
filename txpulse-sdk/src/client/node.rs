//! Typed ledger node methods.

use super::{ClientError, Subscription, WsRpcClient};
use crate::objects::{
    AccountId, Header, ModuleErrorEntry, Nonce, SignedBlock, SignedTransfer, TxHash,
};
use serde_json::{Value, json};

impl WsRpcClient {
    /// `chain_getHeader`: header of the current best block.
    pub async fn header(&self) -> Result<Header, ClientError> {
        self.request("chain_getHeader", json!([])).await
    }

    /// `chain_getBlock`: the current best block with its extrinsic hashes.
    pub async fn block(&self) -> Result<SignedBlock, ClientError> {
        self.request("chain_getBlock", json!([])).await
    }

    /// `timestamp_now`: chain time in milliseconds, `None` before the first
    /// block sets it.
    pub async fn timestamp_now(&self) -> Result<Option<u64>, ClientError> {
        let value: Value = self.request("timestamp_now", json!([])).await?;
        optional_uint(value)
    }

    /// `timestamp_minimumPeriod`: half the target block time, in milliseconds.
    pub async fn minimum_period(&self) -> Result<u64, ClientError> {
        let value: Value = self.request("timestamp_minimumPeriod", json!([])).await?;
        optional_uint(value)?.ok_or_else(|| {
            ClientError::Decode("timestamp_minimumPeriod returned null".to_string())
        })
    }

    /// `system_accountNextIndex`: the next nonce the chain expects from
    /// `account`, counting transactions already in the pool.
    pub async fn account_next_index(&self, account: &AccountId) -> Result<Nonce, ClientError> {
        self.request("system_accountNextIndex", json!([account])).await
    }

    /// `tokenManager_nonces`: the token manager pallet's own per-account counter.
    pub async fn token_manager_nonce(&self, account: &AccountId) -> Result<Option<u64>, ClientError> {
        let value: Value = self.request("tokenManager_nonces", json!([account])).await?;
        optional_uint(value)
    }

    /// `metadata_moduleErrors`: the runtime's module error table.
    pub async fn module_errors(&self) -> Result<Vec<ModuleErrorEntry>, ClientError> {
        self.request("metadata_moduleErrors", json!([])).await
    }

    /// `author_submitTransfer`: broadcast a signed transfer, returning its hash.
    pub async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<TxHash, ClientError> {
        self.request("author_submitTransfer", json!([transfer])).await
    }

    /// `events_subscribe`: one notification per block, carrying that block's
    /// event records in index order.
    pub async fn subscribe_events(&self) -> Result<Subscription, ClientError> {
        self.subscribe("events_subscribe", json!([])).await
    }
}

fn optional_uint(value: Value) -> Result<Option<u64>, ClientError> {
    if value.is_null() {
        return Ok(None);
    }
    crate::objects::parse_uint(&value)
        .and_then(|n| u64::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| ClientError::Decode(format!("expected unsigned integer, got {value}")))
}
