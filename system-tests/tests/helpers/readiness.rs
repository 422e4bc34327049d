// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Gates
// Description: Bounded readiness polling for shells and query endpoints.
// Purpose: Hold suites at a known-good starting line before asserting.
// Dependencies: armada-client, armada-model, armada-remote
// ============================================================================

//! ## Overview
//! Readiness probes never hard-fail; every error is treated as "not yet"
//! and only the budget ends the wait. Suites call these gates once after
//! fixture setup so later assertions observe a reachable cluster instead
//! of a still-booting one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::time::Duration;

use armada_client::QueryClient;
use armada_model::ModelPath;
use armada_remote::CommandRunner;
use armada_remote::CommandSpec;
use armada_remote::SshRunner;
use armada_remote::poll_until;

// ============================================================================
// SECTION: Gates
// ============================================================================

/// Interval between readiness probe attempts.
pub const READINESS_INTERVAL: Duration = Duration::from_millis(500);

/// Waits until a runner can execute a trivial command successfully.
///
/// # Errors
///
/// Returns an error when the budget elapses first.
pub async fn wait_for_shell_ready<R: CommandRunner + Sync>(
    runner: &R,
    budget: Duration,
) -> Result<(), String> {
    let description = format!("{} shell ready", runner.label());
    let probe = move || async move {
        match runner.run(&CommandSpec::new(["true"])).await {
            Ok(output) if output.success() => Ok::<Option<()>, Infallible>(Some(())),
            Ok(_) | Err(_) => Ok(None),
        }
    };
    poll_until(&description, READINESS_INTERVAL, budget, probe)
        .await
        .map_err(|err| err.to_string())?;
    Ok(())
}

/// Waits until the query service answers a root item fetch.
///
/// # Errors
///
/// Returns an error when the budget elapses first.
pub async fn wait_for_query_ready(query: &QueryClient, budget: Duration) -> Result<(), String> {
    let probe = move || async move {
        match query.item_document(&ModelPath::root()).await {
            Ok(_) => Ok::<Option<()>, Infallible>(Some(())),
            Err(_) => Ok(None),
        }
    };
    poll_until("query service ready", READINESS_INTERVAL, budget, probe)
        .await
        .map_err(|err| err.to_string())?;
    Ok(())
}

/// Waits until every node runner can execute a trivial command.
///
/// # Errors
///
/// Returns an error naming the first node whose budget elapsed.
pub async fn wait_for_nodes_ready(runners: &[SshRunner], budget: Duration) -> Result<(), String> {
    for runner in runners {
        wait_for_shell_ready(runner, budget).await?;
    }
    Ok(())
}
