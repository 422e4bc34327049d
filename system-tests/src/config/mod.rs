// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for Armada system tests.
// Purpose: Provide typed access to cluster topology and suite settings.
// Dependencies: crate::config::env
// ============================================================================

//! ## Overview
//! System-test configuration is read from `ARMADA_SYSTEM_TEST_*` environment
//! variables, optionally layered over a TOML topology file describing the
//! cluster under test. Environment values always win field by field, so a
//! checked-in lab topology can be overridden per run without editing files.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::NodeEntry;
pub use env::QueryScheme;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::parse_timeout_seconds;
pub use env::read_env_strict;
