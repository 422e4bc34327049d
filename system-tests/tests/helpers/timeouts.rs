// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: Test Timeouts
// Description: Budget constants and timeout resolution for system tests.
// Purpose: Keep polling budgets uniform and overridable per deployment.
// Dependencies: system-tests
// ============================================================================

//! ## Overview
//! Budgets are per-wait ceilings, not per-test ceilings. An environment
//! override acts as a floor so slow labs can raise every budget at once
//! without editing suites; it never shortens a budget below what a suite
//! requested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestEnv;
use system_tests::config::parse_timeout_seconds;
use system_tests::config::read_env_strict;

// ============================================================================
// SECTION: Budgets
// ============================================================================

/// Ceiling for one plan execution to reach a terminal state.
pub const PLAN_BUDGET: Duration = Duration::from_secs(900);

/// Ceiling for endpoints to accept connections after setup.
pub const READY_BUDGET: Duration = Duration::from_secs(120);

/// Ceiling for a remote observable to converge after a plan succeeds.
pub const PROBE_BUDGET: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a requested budget against the environment override.
///
/// # Errors
///
/// Returns an error when the override is set but not a positive integer.
pub fn resolve_timeout(requested: Duration) -> Result<Duration, String> {
    let name = SystemTestEnv::TimeoutSeconds.as_str();
    match read_env_strict(name)? {
        Some(raw) => Ok(requested.max(parse_timeout_seconds(name, &raw)?)),
        None => Ok(requested),
    }
}
