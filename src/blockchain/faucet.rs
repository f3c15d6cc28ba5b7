//! Funding transfers from the faucet account.
//!
//! # Data Flow
//! ```text
//! request_funds
//!     → TxBuilder::assemble (nonce, gas, fees, chain ID, sign)
//!     → submitter::submit (single broadcast)
//! wait_for_confirmation
//!     → spawned ConfirmationTracker::wait, joined before returning
//! ```

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::blockchain::confirmation::ConfirmationTracker;
use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::submitter;
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{
    BlockchainResult, ConfirmationResult, SubmissionReceipt,
};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::FaucetConfig;
use crate::lifecycle::ShutdownSignal;

/// Sends value from one wallet and tracks the transfers to inclusion.
pub struct Faucet {
    rpc: Arc<dyn LedgerRpc>,
    wallet: Wallet,
    builder: TxBuilder,
    tracker: Arc<ConfirmationTracker>,
    chain_id: Option<u64>,
    /// Held from nonce fetch to broadcast so this faucet never hands out
    /// the same pending nonce twice.
    submit_lock: Mutex<()>,
}

impl Faucet {
    pub fn new(rpc: Arc<dyn LedgerRpc>, wallet: Wallet, config: &FaucetConfig) -> Self {
        Self {
            rpc,
            wallet,
            builder: TxBuilder::new(&config.fees),
            tracker: Arc::new(ConfirmationTracker::new(&config.confirmation)),
            chain_id: config.blockchain.chain_id,
            submit_lock: Mutex::new(()),
        }
    }

    /// Faucet wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub async fn balance_of(&self, address: Address) -> BlockchainResult<U256> {
        Ok(self.rpc.get_balance(address).await?)
    }

    /// Build, sign and broadcast a transfer of `amount` to `recipient`.
    ///
    /// With nonce-delta confirmation, wait for each transfer before
    /// requesting the next one.
    pub async fn request_funds(
        &self,
        recipient: Address,
        amount: U256,
    ) -> BlockchainResult<SubmissionReceipt> {
        let _guard = self.submit_lock.lock().await;

        let signed = self
            .builder
            .assemble(recipient, amount, self.chain_id, &self.wallet, self.rpc.as_ref())
            .await?;

        submitter::submit(&signed, self.rpc.as_ref()).await
    }

    /// Start tracking `submission` on its own task.
    pub fn spawn_confirmation(
        &self,
        submission: SubmissionReceipt,
        cancel: ShutdownSignal,
    ) -> JoinHandle<BlockchainResult<ConfirmationResult>> {
        let rpc = self.rpc.clone();
        let tracker = self.tracker.clone();
        tokio::spawn(async move { tracker.wait(&submission, rpc.as_ref(), cancel).await })
    }

    /// Track `submission` on a separate task and join it.
    pub async fn wait_for_confirmation(
        &self,
        submission: SubmissionReceipt,
        cancel: ShutdownSignal,
    ) -> BlockchainResult<ConfirmationResult> {
        confirmation_of(self.spawn_confirmation(submission, cancel).await)
    }
}

/// Unwrap a joined confirmation task. A task cancelled by the runtime
/// reports `Cancelled`; a panic is resumed.
fn confirmation_of(
    joined: Result<BlockchainResult<ConfirmationResult>, JoinError>,
) -> BlockchainResult<ConfirmationResult> {
    match joined {
        Ok(result) => result,
        Err(join_error) => match join_error.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(_) => Ok(ConfirmationResult::Cancelled),
        },
    }
}

impl std::fmt::Debug for Faucet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Faucet")
            .field("address", &self.address())
            .field("strategy", &self.tracker.strategy())
            .field("fee_mode", &self.builder.fees().mode())
            .finish()
    }
}
