// crates/armada-client/src/lib.rs
// ============================================================================
// Module: Armada Client Library
// Description: Public API surface for driving an Armada deployment manager.
// Purpose: Expose the CLI driver, query client, waits, and host probes.
// Dependencies: crate::{cli, error, plan_report, probes, query, wait}
// ============================================================================

//! ## Overview
//! Armada Client drives a deployment manager the way an operator does: model
//! mutations and plan control go through the `armada` CLI over a command
//! runner, while state observation goes through the read-only model query
//! service. The crate adds the two readings acceptance tests live on:
//! parsing the `show_plan` text report and polling the query service until
//! plans and items reach expected states. Host probes round it out with
//! command builders and output parsers for the facts checks assert against.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cli;
pub mod error;
pub mod plan_report;
pub mod probes;
pub mod query;
pub mod wait;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cli::ArmadaCli;
pub use cli::CliErrorKind;
pub use cli::CliFailure;
pub use cli::DEFAULT_CLI_TIMEOUT;
pub use error::ClientError;
pub use plan_report::PlanReport;
pub use plan_report::PlanReportError;
pub use plan_report::ReportPhase;
pub use plan_report::ReportTask;
pub use plan_report::TaskCounts;
pub use probes::AddrFact;
pub use probes::InstanceMeta;
pub use probes::LinkFact;
pub use probes::MetaInterface;
pub use probes::ProbeError;
pub use query::QueryClient;
pub use query::QueryConfig;
pub use query::QueryRecord;
pub use wait::DEFAULT_POLL_INTERVAL;
pub use wait::wait_for_absence;
pub use wait::wait_for_item_state;
pub use wait::wait_for_plan_state;
