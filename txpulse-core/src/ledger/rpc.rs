use super::{EventBatch, EventStream, LedgerClient, LedgerError, MetadataRegistry};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use txpulse_sdk::client::{Subscription, WsRpcClient};
use txpulse_sdk::objects::{
    AccountId, Block, BlockNumber, MetaError, ModuleError, Nonce, SignedTransfer, TransferCall,
    TxHash,
};
use txpulse_sdk::signer::Signer;
use url::Url;

/// [`LedgerClient`] backed by one JSON-RPC WebSocket connection.
///
/// The module error table is fetched once at connect time; lookups after
/// that are local.
pub struct RpcLedger {
    client: WsRpcClient,
    registry: MetadataRegistry,
}

impl RpcLedger {
    /// Connect to the node and load its module error table.
    ///
    /// A node that cannot serve the table is still usable; dispatch failures
    /// are then reported in raw form.
    pub async fn connect(url: &Url) -> Result<Self, LedgerError> {
        let client = WsRpcClient::connect(url).await?;

        let registry = match client.module_errors().await {
            Ok(entries) => {
                let registry = MetadataRegistry::from_entries(entries);
                info!(entries = registry.len(), "Loaded module error metadata");
                registry
            }
            Err(e) => {
                warn!(error = %e, "Module error metadata unavailable, failures will be logged raw");
                MetadataRegistry::default()
            }
        };

        Ok(Self { client, registry })
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn submit_transfer(
        &self,
        signer: &dyn Signer,
        dest: &AccountId,
        value: u128,
        nonce: Option<Nonce>,
    ) -> Result<TxHash, LedgerError> {
        let call = TransferCall {
            dest: dest.clone(),
            value,
            nonce,
        };
        let signed = SignedTransfer::new(call, signer)?;
        let hash = self.client.submit_transfer(&signed).await?;
        debug!(%dest, value, ?nonce, %hash, "Transfer accepted by node");
        Ok(hash)
    }

    async fn block_number(&self) -> Result<BlockNumber, LedgerError> {
        Ok(self.client.header().await?.number)
    }

    async fn block(&self) -> Result<Block, LedgerError> {
        Ok(self.client.block().await?.block)
    }

    async fn timestamp(&self) -> Result<Option<u64>, LedgerError> {
        Ok(self.client.timestamp_now().await?)
    }

    async fn next_nonce(&self, account: &AccountId) -> Result<Nonce, LedgerError> {
        Ok(self.client.account_next_index(account).await?)
    }

    async fn app_sequence(&self, account: &AccountId) -> Result<Option<u64>, LedgerError> {
        Ok(self.client.token_manager_nonce(account).await?)
    }

    async fn minimum_period(&self) -> Result<Duration, LedgerError> {
        Ok(Duration::from_millis(self.client.minimum_period().await?))
    }

    fn find_meta_error(&self, module: ModuleError) -> Result<MetaError, LedgerError> {
        self.registry
            .find(module)
            .cloned()
            .ok_or(LedgerError::MetadataNotFound {
                index: module.index,
                error: module.error,
            })
    }

    async fn subscribe_events(&self) -> Result<Box<dyn EventStream>, LedgerError> {
        let subscription = self.client.subscribe_events().await?;
        info!(subscription = %subscription.id, "Subscribed to chain events");
        Ok(Box::new(subscription))
    }
}

#[async_trait]
impl EventStream for Subscription {
    async fn next_batch(&mut self) -> Option<Result<EventBatch, LedgerError>> {
        self.next::<EventBatch>()
            .await
            .map(|batch| batch.map_err(LedgerError::from))
    }
}
