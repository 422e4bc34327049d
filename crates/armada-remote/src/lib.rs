// crates/armada-remote/src/lib.rs
// ============================================================================
// Module: Armada Remote Library
// Description: Public API surface for remote command execution.
// Purpose: Expose host targets, command runners, and polling helpers.
// Dependencies: crate::{command, error, exec, local, poll, runner, ssh, target}
// ============================================================================

//! ## Overview
//! Armada Remote runs commands on the hosts of a deployment under test and
//! captures their outcomes. The management server and managed nodes are
//! reached over the system OpenSSH client in batch mode; a local runner with
//! the same interface backs hermetic tests. Every executed command lands in
//! a transcript so failed acceptance runs can be reconstructed offline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod command;
pub mod error;
mod exec;
pub mod local;
pub mod poll;
pub mod runner;
pub mod ssh;
pub mod target;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use command::CommandOutput;
pub use command::CommandRecord;
pub use command::CommandSpec;
pub use command::DEFAULT_COMMAND_TIMEOUT;
pub use error::RemoteError;
pub use local::LocalRunner;
pub use poll::PollError;
pub use poll::poll_until;
pub use runner::CommandRunner;
pub use runner::Transcript;
pub use ssh::SshRunner;
pub use ssh::quote_for_shell;
pub use target::HostTarget;
