//! Startup orchestration for the faucet commands.
//!
//! # Responsibilities
//! - Connect to the node and verify the chain
//! - Load keys in dependency order (faucet first)
//! - Run the balance and fund flows under a shared cancellation signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Confirmation runs on its own task and is joined before returning

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};

use crate::blockchain::block_number::BlockNumber;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::faucet::Faucet;
use crate::blockchain::keystore::{self, Account};
use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationResult, SubmissionReceipt};
use crate::config::schema::{BlockchainConfig, FaucetConfig};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::resilience::race::race;

/// 1 ether in wei.
pub const ONE_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Build the client and check the chain ID against configuration.
pub async fn connect(config: &BlockchainConfig) -> BlockchainResult<Arc<BlockchainClient>> {
    let client = BlockchainClient::new(config.clone())?;
    let chain_id = client.verify_chain_id().await?;
    tracing::info!(chain_id = chain_id.0, rpc_url = %config.rpc_url, "Connected");
    Ok(Arc::new(client))
}

/// Fetch a balance, giving up after `timeout` or on cancellation.
///
/// `Ok(None)` means the check timed out or was cancelled.
pub async fn check_balance(
    client: Arc<BlockchainClient>,
    address: Address,
    block: BlockNumber,
    timeout: Duration,
    cancel: ShutdownSignal,
) -> BlockchainResult<Option<U256>> {
    let work = async move { client.get_balance_at(address, block).await };
    race("balance", work, timeout, cancel)
        .await
        .into_result()
        .map_err(BlockchainError::from)
}

/// Balances of both parties of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub faucet: U256,
    pub recipient: U256,
}

/// What a fund run observed.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub submission: SubmissionReceipt,
    pub confirmation: ConfirmationResult,
    pub before: Balances,
    /// Only fetched once the transfer is confirmed.
    pub after: Option<Balances>,
}

async fn balances(faucet: &Faucet, recipient: Address) -> BlockchainResult<Balances> {
    Ok(Balances {
        faucet: faucet.balance_of(faucet.address()).await?,
        recipient: faucet.balance_of(recipient).await?,
    })
}

/// Fund `to` from the faucet key and wait for the transfer to land.
pub async fn run_transfer(
    config: &FaucetConfig,
    rpc: Arc<dyn LedgerRpc>,
    to: Account,
    amount: U256,
    cancel: ShutdownSignal,
) -> BlockchainResult<TransferReport> {
    let faucet_wallet = keystore::require_credential(&config.keys.path_of(Account::Faucet))?;
    keystore::ensure_keys_exist(&config.keys)?;
    let recipient = keystore::require_credential(&config.keys.path_of(to))?.address();

    let faucet = Faucet::new(rpc, faucet_wallet, config);
    tracing::info!(faucet = %faucet.address(), recipient = %recipient, amount = %amount, "Funding account");

    let before = balances(&faucet, recipient).await?;
    tracing::info!(faucet = %before.faucet, recipient = %before.recipient, "Balances before");

    let submission = faucet.request_funds(recipient, amount).await?;
    let confirmation = faucet.wait_for_confirmation(submission.clone(), cancel).await?;

    let after = match confirmation {
        ConfirmationResult::Confirmed { .. } => {
            let after = balances(&faucet, recipient).await?;
            tracing::info!(faucet = %after.faucet, recipient = %after.recipient, "Balances after");
            Some(after)
        }
        ConfirmationResult::Cancelled => {
            tracing::warn!(tx_hash = %submission.tx_hash, "Stopped waiting for confirmation");
            None
        }
    };

    Ok(TransferReport {
        submission,
        confirmation,
        before,
        after,
    })
}
