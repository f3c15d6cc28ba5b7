//! Metrics collection.
//!
//! # Metrics
//! - `faucet_transactions_submitted_total` (counter)
//! - `faucet_broadcast_failures_total` (counter): by rejection reason
//! - `faucet_transactions_confirmed_total` (counter): by strategy
//! - `faucet_race_outcomes_total` (counter): by operation, outcome
//!
//! No recorder is installed by this crate; without one these are no-ops.

use metrics::counter;

pub fn record_tx_submitted() {
    counter!("faucet_transactions_submitted_total").increment(1);
}

pub fn record_broadcast_failure(reason: &'static str) {
    counter!("faucet_broadcast_failures_total", "reason" => reason).increment(1);
}

pub fn record_tx_confirmed(strategy: &'static str) {
    counter!("faucet_transactions_confirmed_total", "strategy" => strategy).increment(1);
}

pub fn record_race_outcome(operation: &'static str, outcome: &'static str) {
    counter!("faucet_race_outcomes_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}
