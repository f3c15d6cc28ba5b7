//! Ledger RPC capability consumed by the transaction workflow.
//!
//! # Responsibilities
//! - Name the node queries the build, submit and confirm stages need
//! - Separate transport failures from errors reported by the node
//!
//! `BlockchainClient` implements this over alloy's HTTP provider; tests
//! substitute scripted ledgers.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Endpoint unreachable or the request timed out.
    #[error("endpoint unreachable: {0}")]
    Transport(String),

    /// The node answered with an error.
    #[error("node error: {0}")]
    Node(String),
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}

/// Result type for RPC requests.
pub type RpcResult<T> = Result<T, RpcError>;

/// Inclusion record for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub block_number: Option<u64>,
    /// False when execution reverted.
    pub success: bool,
}

/// Height and size of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub transaction_count: usize,
}

/// Asynchronous view of a remote ledger node.
///
/// Implementations must be safe for concurrent read-only use.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Balance of `address` at the latest block.
    async fn get_balance(&self, address: Address) -> RpcResult<U256>;

    /// Next nonce including transactions still in the pool.
    async fn get_pending_nonce(&self, address: Address) -> RpcResult<u64>;

    /// Next nonce according to the latest block.
    async fn get_nonce(&self, address: Address) -> RpcResult<u64>;

    /// Simulate a call and return the gas it uses.
    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> RpcResult<u64>;

    async fn suggest_gas_price(&self) -> RpcResult<u128>;

    async fn get_chain_id(&self) -> RpcResult<u64>;

    /// Send an EIP-2718 encoded signed transaction.
    async fn broadcast_transaction(&self, raw: Bytes) -> RpcResult<()>;

    /// `Ok(None)` while the transaction is not yet mined.
    async fn get_receipt(&self, hash: TxHash) -> RpcResult<Option<Receipt>>;

    async fn get_latest_block(&self) -> RpcResult<BlockSummary>;
}
