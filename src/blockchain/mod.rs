//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key files (keystore.rs)
//!     → wallet.rs (key loading, signing)
//!     → transaction.rs + fees.rs (nonce, gas, fee fields)
//!     → submitter.rs (broadcast once)
//!     → confirmation.rs (receipt or nonce-delta polling)
//! All RPC goes through the LedgerRpc trait (rpc.rs), implemented by
//! client.rs over alloy.
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod block_number;
pub mod client;
pub mod confirmation;
pub mod faucet;
pub mod fees;
pub mod keystore;
pub mod rpc;
pub mod submitter;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use block_number::BlockNumber;
pub use client::BlockchainClient;
pub use confirmation::ConfirmationTracker;
pub use faucet::Faucet;
pub use fees::FeeEstimator;
pub use keystore::Account;
pub use rpc::{BlockSummary, LedgerRpc, Receipt, RpcError, RpcResult};
pub use transaction::{SignedTransaction, TxBuilder, UnsignedTransaction};
pub use types::{
    BlockchainError, BlockchainResult, BroadcastRejection, ChainId, ConfirmationResult,
    FeeModel, SubmissionReceipt,
};
pub use wallet::Wallet;
