//! Time-boxed execution of a single unit of work.
//!
//! # Responsibilities
//! - Run the work on its own task
//! - Race it against a timeout and a cancellation signal
//! - Report exactly one outcome
//!
//! The losing work task is detached, not aborted: it runs to completion on
//! its own and its result is dropped. At most one such task is left behind
//! per call.

use std::future::Future;
use std::panic;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::sleep;

use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Which path of a race resolved first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome<T, E> {
    Completed(T),
    Failed(E),
    TimedOut,
    Cancelled,
}

impl<T, E> RaceOutcome<T, E> {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceOutcome::Completed(_) => "completed",
            RaceOutcome::Failed(_) => "failed",
            RaceOutcome::TimedOut => "timed_out",
            RaceOutcome::Cancelled => "cancelled",
        }
    }

    /// `Ok(Some)` on completion, `Ok(None)` on timeout or cancellation.
    pub fn into_result(self) -> Result<Option<T>, E> {
        match self {
            RaceOutcome::Completed(value) => Ok(Some(value)),
            RaceOutcome::Failed(e) => Err(e),
            RaceOutcome::TimedOut | RaceOutcome::Cancelled => Ok(None),
        }
    }
}

/// Map a joined work task to its outcome. A task cancelled by the runtime
/// (during shutdown) counts as cancelled; a panic is resumed.
fn outcome_of<T, E>(joined: Result<Result<T, E>, JoinError>) -> RaceOutcome<T, E> {
    match joined {
        Ok(Ok(value)) => RaceOutcome::Completed(value),
        Ok(Err(e)) => RaceOutcome::Failed(e),
        Err(join_error) => match join_error.try_into_panic() {
            Ok(payload) => panic::resume_unwind(payload),
            Err(_) => RaceOutcome::Cancelled,
        },
    }
}

/// Run `work` against `timeout` and `cancel`.
///
/// Cancellation wins ties, then the work, then the timeout. A panic in
/// the work is resumed on the caller.
pub async fn race<F, T, E>(
    operation: &'static str,
    work: F,
    timeout: Duration,
    mut cancel: ShutdownSignal,
) -> RaceOutcome<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let mut handle = tokio::spawn(work);

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => RaceOutcome::Cancelled,
        joined = &mut handle => outcome_of(joined),
        _ = sleep(timeout) => RaceOutcome::TimedOut,
    };

    match &outcome {
        RaceOutcome::TimedOut => {
            tracing::warn!(operation, timeout_ms = timeout.as_millis() as u64, "Timed out")
        }
        RaceOutcome::Cancelled => tracing::info!(operation, "Cancelled"),
        _ => tracing::debug!(operation, outcome = outcome.as_str(), "Race resolved"),
    }
    metrics::record_race_outcome(operation, outcome.as_str());

    outcome
}
