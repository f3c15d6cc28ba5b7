//! Confirmation tracking for submitted transactions.
//!
//! # Strategies
//! - Receipt: poll for the receipt by hash; "not found" means not yet mined
//! - Nonce delta: poll the submitter's confirmed nonce until it passes
//!   the nonce the transaction was signed with
//!
//! Polling runs on a fixed interval with no implicit deadline. The
//! cancellation signal is observed before each poll, during each poll and
//! during each interval sleep.
//!
//! # Limitations
//! The nonce-delta strategy only learns that *some* transaction from the
//! submitter was included. Callers must serialize submissions per address
//! when using it, or accept that ambiguity.

use std::time::Duration;
use tokio::time::sleep;

use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationResult, ConfirmationStrategy,
    SubmissionReceipt,
};
use crate::config::schema::ConfirmationConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Polls the ledger until a submission is confirmed or the wait is cancelled.
#[derive(Debug, Clone)]
pub struct ConfirmationTracker {
    strategy: ConfirmationStrategy,
    poll_interval: Duration,
    /// 0 means unbounded.
    max_attempts: u32,
}

impl ConfirmationTracker {
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            strategy: config.strategy,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts,
        }
    }

    pub fn strategy(&self) -> ConfirmationStrategy {
        self.strategy
    }

    /// Wait for `submission` to be included.
    ///
    /// Returns `Cancelled` once `cancel` fires. Query failures abort the
    /// wait with the failing stage's error.
    pub async fn wait<R: LedgerRpc + ?Sized>(
        &self,
        submission: &SubmissionReceipt,
        rpc: &R,
        mut cancel: ShutdownSignal,
    ) -> BlockchainResult<ConfirmationResult> {
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(submission, attempts));
            }

            attempts += 1;
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.cancelled(submission, attempts)),
                polled = self.poll_once(submission, rpc) => polled?,
            };

            if let Some(block_number) = polled {
                tracing::info!(
                    tx_hash = %submission.tx_hash,
                    block_number = ?block_number,
                    strategy = ?self.strategy,
                    attempts,
                    "Transaction confirmed"
                );
                metrics::record_tx_confirmed(self.strategy.as_str());
                return Ok(ConfirmationResult::Confirmed { block_number });
            }

            if self.max_attempts > 0 && attempts >= self.max_attempts {
                return Err(BlockchainError::ConfirmationTimeout(attempts));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.cancelled(submission, attempts)),
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    /// One poll. `Some(block)` once confirmed; the block is unknown for
    /// nonce-delta tracking.
    async fn poll_once<R: LedgerRpc + ?Sized>(
        &self,
        submission: &SubmissionReceipt,
        rpc: &R,
    ) -> BlockchainResult<Option<Option<u64>>> {
        match self.strategy {
            ConfirmationStrategy::Receipt => {
                tracing::debug!(tx_hash = %submission.tx_hash, "Fetching receipt");
                match rpc
                    .get_receipt(submission.tx_hash)
                    .await
                    .map_err(BlockchainError::Receipt)?
                {
                    Some(receipt) => {
                        if !receipt.success {
                            tracing::warn!(tx_hash = %submission.tx_hash, "Transaction reverted");
                        }
                        Ok(Some(receipt.block_number))
                    }
                    None => {
                        log_latest_block(rpc).await;
                        Ok(None)
                    }
                }
            }
            ConfirmationStrategy::NonceDelta => {
                let current = rpc
                    .get_nonce(submission.submitter)
                    .await
                    .map_err(BlockchainError::NonceFetch)?;
                tracing::debug!(
                    address = %submission.submitter,
                    recorded = submission.submitted_nonce,
                    current,
                    "Polled nonce"
                );
                // Confirmed once the slot we signed for is consumed. A
                // confirmed nonce behind it means earlier transfers are
                // still pending.
                Ok((current > submission.submitted_nonce).then_some(None))
            }
        }
    }

    fn cancelled(&self, submission: &SubmissionReceipt, attempts: u32) -> ConfirmationResult {
        tracing::info!(
            tx_hash = %submission.tx_hash,
            attempts,
            "Confirmation wait cancelled"
        );
        ConfirmationResult::Cancelled
    }
}

/// Diagnostic only; failures are logged and ignored.
async fn log_latest_block<R: LedgerRpc + ?Sized>(rpc: &R) {
    match rpc.get_latest_block().await {
        Ok(block) => tracing::debug!(
            block_number = block.number,
            transactions = block.transaction_count,
            "Transaction pending"
        ),
        Err(e) => tracing::debug!(error = %e, "Could not fetch latest block"),
    }
}
