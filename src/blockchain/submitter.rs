//! Broadcast of signed transactions.

use std::time::SystemTime;

use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SubmissionReceipt};
use crate::observability::metrics;

/// Send `signed` to the node once.
///
/// There is no retry here; whether to rebuild and resubmit is the
/// caller's decision.
pub async fn submit<R: LedgerRpc + ?Sized>(
    signed: &SignedTransaction,
    rpc: &R,
) -> BlockchainResult<SubmissionReceipt> {
    let tx_hash = signed.hash();

    if let Err(e) = rpc.broadcast_transaction(signed.raw()).await {
        let err = BlockchainError::broadcast(e);
        if let BlockchainError::Broadcast { reason, .. } = &err {
            metrics::record_broadcast_failure(reason.as_str());
        }
        tracing::warn!(tx_hash = %tx_hash, nonce = signed.nonce(), error = %err, "Broadcast rejected");
        return Err(err);
    }

    metrics::record_tx_submitted();
    tracing::info!(
        tx_hash = %tx_hash,
        nonce = signed.nonce(),
        from = %signed.from(),
        "Transaction sent"
    );

    Ok(SubmissionReceipt {
        tx_hash,
        submitted_nonce: signed.nonce(),
        submitter: signed.from(),
        submitted_at: SystemTime::now(),
    })
}
