// crates/armada-remote/src/poll.rs
// ============================================================================
// Module: Bounded Polling
// Description: Retry-until-ready loop with a hard overall budget.
// Purpose: Wait for remote state changes without unbounded spinning.
// Dependencies: thiserror, tokio
// ============================================================================

//! ## Overview
//! Deployment convergence is observed, not awaited: checks probe remote
//! state repeatedly until it matches, the probe reports a hard failure, or
//! the budget runs out. [`poll_until`] is the single polling primitive the
//! whole suite uses, so every wait carries a description, an interval, and
//! a budget that appear verbatim in timeout diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a poll loop ends without the condition holding.
#[derive(Debug, Error)]
pub enum PollError<E: std::error::Error> {
    /// The budget elapsed with the condition still pending.
    #[error("timed out after {attempts} attempts over {waited:?} waiting for {description}")]
    Timeout {
        /// Description of the awaited condition.
        description: String,
        /// Time spent polling before giving up.
        waited: Duration,
        /// Number of probe attempts made.
        attempts: u32,
    },
    /// The probe reported a failure that polling cannot recover from.
    #[error(transparent)]
    Aborted(E),
}

// ============================================================================
// SECTION: Polling
// ============================================================================

/// Polls `probe` until it yields a value, aborts, or the budget elapses.
///
/// The probe returns `Ok(Some(value))` when the condition holds,
/// `Ok(None)` to keep waiting, and `Err` to abort immediately, so terminal
/// divergence (a plan that failed while we waited for success) surfaces at
/// once instead of burning the rest of the budget.
///
/// The first probe runs immediately; subsequent probes are spaced by
/// `interval`. The loop gives up once the next sleep would cross `budget`.
///
/// # Errors
/// Returns [`PollError::Timeout`] when the budget elapses and
/// [`PollError::Aborted`] when the probe fails hard.
pub async fn poll_until<T, E, F, Fut>(
    description: &str,
    interval: Duration,
    budget: Duration,
    mut probe: F,
) -> Result<T, PollError<E>>
where
    E: std::error::Error,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let mut attempts = 0_u32;
    loop {
        attempts = attempts.saturating_add(1);
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => return Err(PollError::Aborted(err)),
        }
        if started.elapsed().saturating_add(interval) >= budget {
            return Err(PollError::Timeout {
                description: description.to_string(),
                waited: started.elapsed(),
                attempts,
            });
        }
        tokio::time::sleep(interval).await;
    }
}
