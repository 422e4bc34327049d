// crates/armada-remote/src/error.rs
// ============================================================================
// Module: Remote Execution Errors
// Description: Error type for spawning, running, and decoding commands.
// Purpose: Give callers one failure vocabulary across SSH and local runners.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Remote execution distinguishes transport failures (cannot spawn, timed
//! out) from command failures (ran, exited nonzero). Runners return
//! transport failures as errors and successful captures as values; callers
//! opt in to treating a nonzero exit as an error through
//! [`require_success`](crate::command::CommandOutput::require_success).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Error raised while executing a command through a runner.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The command specification had no program to run.
    #[error("command specification is empty")]
    EmptyCommand,
    /// The process could not be spawned at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An I/O error occurred while waiting for the process.
    #[error("i/o error while running {command}: {source}")]
    Io {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The process exceeded its time limit and was killed.
    #[error("command timed out after {limit:?}: {command}")]
    Timeout {
        /// Rendered command line.
        command: String,
        /// Configured time limit.
        limit: Duration,
    },
    /// The process was terminated by a signal before exiting.
    #[error("command terminated by signal: {command}")]
    Signalled {
        /// Rendered command line.
        command: String,
    },
    /// A captured stream was not valid UTF-8.
    #[error("command produced non-utf8 {stream}: {command}")]
    NonUtf8 {
        /// Stream name, `stdout` or `stderr`.
        stream: &'static str,
        /// Rendered command line.
        command: String,
    },
    /// The command ran but exited nonzero where success was required.
    #[error("command exited with status {exit_code}: {command}\nstderr: {stderr}")]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Captured exit code.
        exit_code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}
