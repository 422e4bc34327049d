// crates/armada-client/src/wait.rs
// ============================================================================
// Module: Convergence Waits
// Description: Bounded polling helpers over the query client.
// Purpose: Wait for plan and item state transitions with hard deadlines.
// Dependencies: armada-model, armada-remote
// ============================================================================

//! ## Overview
//! Scenario steps rarely assert on a single observation; they wait for the
//! system to converge. These helpers wrap [`poll_until`] with the query
//! client and translate its poll errors into [`ClientError`] so callers see
//! one error type.
//!
//! [`wait_for_plan_state`] fails fast when the plan lands in a terminal
//! state other than the wanted one. Waiting out a full budget on a plan
//! that already failed would only hide the failure, so divergence aborts
//! the wait immediately with the observed state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use armada_model::ItemState;
use armada_model::ModelPath;
use armada_model::PlanDocument;
use armada_model::PlanState;
use armada_remote::PollError;
use armada_remote::poll_until;

use crate::error::ClientError;
use crate::query::QueryClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default pause between poll probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Waits
// ============================================================================

/// Polls until the plan reaches the wanted state.
///
/// Returns the plan document observed at the wanted state.
///
/// # Errors
/// Returns [`ClientError::PlanDiverged`] when the plan reaches a different
/// terminal state, [`ClientError::WaitTimeout`] when the budget runs out,
/// and query errors as they occur.
pub async fn wait_for_plan_state(
    query: &QueryClient,
    wanted: PlanState,
    interval: Duration,
    budget: Duration,
) -> Result<PlanDocument, ClientError> {
    let description = format!("plan state {wanted}");
    let outcome = poll_until(&description, interval, budget, move || async move {
        let plan = query.plan().await?;
        if plan.state == wanted {
            return Ok(Some(plan));
        }
        if plan.state.is_terminal() {
            return Err(ClientError::PlanDiverged {
                wanted,
                got: plan.state,
            });
        }
        Ok(None)
    })
    .await;
    flatten(outcome)
}

/// Polls until the item at a path reports the wanted state.
///
/// A missing item counts as "not yet" rather than an error, so this also
/// covers waiting for an item to first appear in the wanted state.
///
/// # Errors
/// Returns [`ClientError::WaitTimeout`] when the budget runs out and query
/// errors as they occur.
pub async fn wait_for_item_state(
    query: &QueryClient,
    path: &ModelPath,
    wanted: ItemState,
    interval: Duration,
    budget: Duration,
) -> Result<(), ClientError> {
    let description = format!("item {path} in state {wanted}");
    let outcome = poll_until(&description, interval, budget, move || async move {
        match query.get_item(path).await {
            Ok(item) => Ok((item.state == wanted).then_some(())),
            Err(ClientError::InvalidLocation { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    })
    .await;
    flatten(outcome)
}

/// Polls until no item exists at a path.
///
/// # Errors
/// Returns [`ClientError::WaitTimeout`] when the budget runs out and query
/// errors as they occur.
pub async fn wait_for_absence(
    query: &QueryClient,
    path: &ModelPath,
    interval: Duration,
    budget: Duration,
) -> Result<(), ClientError> {
    let description = format!("removal of item {path}");
    let outcome = poll_until(&description, interval, budget, move || async move {
        let present = query.exists(path).await?;
        Ok((!present).then_some(()))
    })
    .await;
    flatten(outcome)
}

// ============================================================================
// SECTION: Error Translation
// ============================================================================

/// Collapses a poll outcome into the crate error type.
fn flatten<T>(outcome: Result<T, PollError<ClientError>>) -> Result<T, ClientError> {
    outcome.map_err(|err| match err {
        PollError::Timeout {
            description,
            waited,
            attempts,
        } => ClientError::WaitTimeout {
            description,
            waited,
            attempts,
        },
        PollError::Aborted(inner) => inner,
    })
}
