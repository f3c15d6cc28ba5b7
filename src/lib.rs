//! Devnet faucet: transaction lifecycle for local EVM devnets.
//!
//! Fee estimation, nonce handling, signing, single-shot submission and
//! confirmation tracking, plus a timeout/cancellation race for one-off calls.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::{BlockchainClient, Faucet, LedgerRpc};
pub use config::FaucetConfig;
pub use lifecycle::Shutdown;
