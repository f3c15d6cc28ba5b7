//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (balances, nonces, fees, receipts, blocks)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{TransportError, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::block_number::BlockNumber;
use crate::blockchain::rpc::{BlockSummary, LedgerRpc, Receipt, RpcError, RpcResult};
use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made; an unreachable endpoint surfaces on first use.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            RpcError::Transport(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Verify the connected chain ID matches configuration, if one is set.
    pub async fn verify_chain_id(&self) -> BlockchainResult<ChainId> {
        let actual = self.get_chain_id().await.map_err(BlockchainError::ChainId)?;
        if let Some(expected) = self.config.chain_id {
            if actual != expected {
                return Err(BlockchainError::ChainMismatch { expected, actual });
            }
        }
        Ok(ChainId(actual))
    }

    /// Get the balance of an address at a given block.
    pub async fn get_balance_at(&self, address: Address, block: BlockNumber) -> RpcResult<U256> {
        let block_id = BlockId::from(BlockNumberOrTag::from(block));
        self.with_failover("get_balance", move |p| async move {
            p.get_balance(address).block_id(block_id).await
        })
        .await
    }

    /// Run a read-only request against each provider in turn.
    ///
    /// Transport failures and timeouts move on to the next provider. An
    /// error answered by the node is returned as is, since another node
    /// would give the same answer.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, call: F) -> RpcResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => match classify(e) {
                    node @ RpcError::Node(_) => return Err(node),
                    transport => {
                        tracing::warn!(provider_idx = i, method, error = %transport, "RPC error, trying next provider");
                        last_error = Some(transport);
                    }
                },
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                    last_error = Some(RpcError::Transport(format!(
                        "{} timed out after {} seconds",
                        method, self.config.rpc_timeout_secs
                    )));
                }
            }
        }
        Err(RpcError::Transport(format!(
            "All RPC providers failed for {}: {}",
            method,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

fn classify(error: TransportError) -> RpcError {
    match error.as_error_resp() {
        Some(payload) => RpcError::Node(payload.message.to_string()),
        None => RpcError::Transport(error.to_string()),
    }
}

#[async_trait]
impl LedgerRpc for BlockchainClient {
    async fn get_balance(&self, address: Address) -> RpcResult<U256> {
        self.get_balance_at(address, BlockNumber::LATEST).await
    }

    async fn get_pending_nonce(&self, address: Address) -> RpcResult<u64> {
        self.with_failover("get_transaction_count", move |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn get_nonce(&self, address: Address) -> RpcResult<u64> {
        self.with_failover("get_transaction_count", move |p| async move {
            p.get_transaction_count(address).latest().await
        })
        .await
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> RpcResult<u64> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value)
            .with_input(data);
        self.with_failover("estimate_gas", move |p| {
            let request = request.clone();
            async move { p.estimate_gas(request).await }
        })
        .await
    }

    async fn suggest_gas_price(&self) -> RpcResult<u128> {
        self.with_failover("get_gas_price", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn get_chain_id(&self) -> RpcResult<u64> {
        self.with_failover("get_chain_id", |p| async move { p.get_chain_id().await })
            .await
    }

    /// Sent to the primary provider only, exactly once.
    async fn broadcast_transaction(&self, raw: Bytes) -> RpcResult<()> {
        let provider = &self.providers[0];
        match timeout(self.timeout_duration, provider.send_raw_transaction(&raw)).await {
            Ok(Ok(_pending)) => Ok(()),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(RpcError::Transport(format!(
                "send_raw_transaction timed out after {} seconds",
                self.config.rpc_timeout_secs
            ))),
        }
    }

    async fn get_receipt(&self, hash: TxHash) -> RpcResult<Option<Receipt>> {
        let receipt = self
            .with_failover("get_transaction_receipt", move |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;

        Ok(receipt.map(|r| Receipt {
            block_number: r.block_number,
            success: r.status(),
        }))
    }

    async fn get_latest_block(&self) -> RpcResult<BlockSummary> {
        let block = self
            .with_failover("get_block_by_number", |p| async move {
                p.get_block_by_number(BlockNumberOrTag::Latest).await
            })
            .await?
            .ok_or_else(|| RpcError::Node("latest block not available".to_string()))?;

        Ok(BlockSummary {
            number: block.header.number,
            transaction_count: block.transactions.len(),
        })
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
