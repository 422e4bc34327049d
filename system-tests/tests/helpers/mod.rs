// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Armada system test suites.
// Purpose: Provide artifacts, fixtures, stubs, and assertions for suites.
// Dependencies: armada-client, armada-model, armada-remote
// ============================================================================

//! ## Overview
//! Helper modules shared by every suite: artifact reporting, cluster
//! fixtures, model fixtures, the hermetic query stub, readiness gates, and
//! remote-state assertions.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

/// Artifact directories and test summary reporting.
pub mod artifacts;
/// Readiness gates for shell and query endpoints.
pub mod readiness;
/// Budget constants and timeout resolution.
pub mod timeouts;
