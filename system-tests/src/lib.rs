// system-tests/src/lib.rs
// ============================================================================
// Module: Armada System Tests Library
// Description: Shared configuration for the Armada acceptance suites.
// Purpose: Provide common utilities for the system-test binaries.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! This crate hosts the shared configuration used by the Armada acceptance
//! suite binaries in `system-tests/tests`. The suites drive a real cluster
//! when one is configured through the environment and fall back to recorded
//! skips when none is, so the same binaries are safe to run anywhere.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
