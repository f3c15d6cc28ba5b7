//! Chain-specific types and error definitions.

use std::time::SystemTime;

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

use crate::blockchain::rpc::RpcError;

// Re-export configuration types from config module to avoid duplication
pub use crate::config::schema::{BlockchainConfig, ConfirmationStrategy, FeeMode};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Why a node refused a broadcast, derived from its error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastRejection {
    /// Fee too low, including replacement transactions.
    Underpriced,
    /// The nonce was already used by an included transaction.
    NonceTooLow,
    /// Balance cannot cover value plus maximum fee.
    InsufficientFunds,
    /// The node already has this exact transaction.
    AlreadyKnown,
    /// Transport failure or an unclassified node error.
    Other,
}

impl BroadcastRejection {
    /// Classify a node error message.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("underpriced") {
            Self::Underpriced
        } else if message.contains("nonce too low") {
            Self::NonceTooLow
        } else if message.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if message.contains("already known") || message.contains("known transaction") {
            Self::AlreadyKnown
        } else {
            Self::Other
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Underpriced => "underpriced",
            Self::NonceTooLow => "nonce_too_low",
            Self::InsufficientFunds => "insufficient_funds",
            Self::AlreadyKnown => "already_known",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for BroadcastRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during blockchain operations.
///
/// Stage variants wrap the RPC failure of the step that failed, so a
/// build-and-submit attempt reports where it stopped.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed outside a named stage.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Pending or confirmed nonce query failed.
    #[error("Failed to get nonce: {0}")]
    NonceFetch(#[source] RpcError),

    /// Gas price query failed.
    #[error("Failed to suggest gas price: {0}")]
    FeeQuery(#[source] RpcError),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u128, max_gwei: u64 },

    /// Fee fields violate the fee model's invariants.
    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    /// Simulated call for the gas limit failed.
    #[error("Failed to estimate gas: {0}")]
    GasEstimation(#[source] RpcError),

    /// Chain ID query failed.
    #[error("Failed to get chain ID: {0}")]
    ChainId(#[source] RpcError),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The credential could not produce a signature.
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    /// The node refused the signed transaction.
    #[error("Failed to send transaction ({reason}): {source}")]
    Broadcast {
        reason: BroadcastRejection,
        #[source]
        source: RpcError,
    },

    /// Receipt lookup failed with something other than "not found".
    #[error("Failed to fetch receipt: {0}")]
    Receipt(#[source] RpcError),

    /// Transaction was not confirmed within the configured attempts.
    #[error("Transaction not confirmed after {0} polls")]
    ConfirmationTimeout(u32),

    /// Key file could not be read or written.
    #[error("Keystore error at {path}: {message}")]
    Keystore { path: String, message: String },
}

impl BlockchainError {
    /// Build a broadcast error, classifying the node's message.
    pub fn broadcast(source: RpcError) -> Self {
        let reason = match &source {
            RpcError::Node(message) => BroadcastRejection::classify(message),
            RpcError::Transport(_) => BroadcastRejection::Other,
        };
        Self::Broadcast { reason, source }
    }

    /// Check if a higher-level caller may retry the whole attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            BlockchainError::Rpc(e)
            | BlockchainError::NonceFetch(e)
            | BlockchainError::FeeQuery(e)
            | BlockchainError::GasEstimation(e)
            | BlockchainError::ChainId(e)
            | BlockchainError::Receipt(e) => e.is_transport(),
            BlockchainError::Broadcast { reason, source } => {
                *reason == BroadcastRejection::Underpriced || source.is_transport()
            }
            _ => false,
        }
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Fee fields of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    /// Single price per unit of gas.
    Legacy { gas_price: u128 },
    /// EIP-1559 priority tip and absolute cap per unit of gas.
    DynamicFee { tip_cap: u128, fee_cap: u128 },
}

impl FeeModel {
    pub fn legacy(gas_price: u128) -> Self {
        Self::Legacy { gas_price }
    }

    /// Build a dynamic fee, rejecting a cap below the tip.
    pub fn dynamic(tip_cap: u128, fee_cap: u128) -> BlockchainResult<Self> {
        if fee_cap < tip_cap {
            return Err(BlockchainError::InvalidFee(format!(
                "fee cap {} is below tip cap {}",
                fee_cap, tip_cap
            )));
        }
        Ok(Self::DynamicFee { tip_cap, fee_cap })
    }

    /// Highest price per gas the sender may pay.
    pub fn max_price_per_gas(&self) -> u128 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::DynamicFee { fee_cap, .. } => *fee_cap,
        }
    }
}

/// Record of an accepted broadcast, consumed by confirmation tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
    pub submitted_nonce: u64,
    pub submitter: Address,
    pub submitted_at: SystemTime,
}

/// Terminal outcome of waiting for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResult {
    /// Included on chain. Nonce-delta tracking cannot name the block.
    Confirmed { block_number: Option<u64> },
    /// The caller abandoned the wait.
    Cancelled,
}
