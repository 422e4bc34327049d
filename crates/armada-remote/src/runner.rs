// crates/armada-remote/src/runner.rs
// ============================================================================
// Module: Command Runner Interface
// Description: The execution seam between checks and transports.
// Purpose: Let acceptance logic run commands without naming the transport.
// Dependencies: crate::{command, error}, async-trait
// ============================================================================

//! ## Overview
//! Everything that executes commands implements [`CommandRunner`]: the SSH
//! runner against real hosts and the local runner for hermetic tests. The
//! trait carries a transcript so a failed run can show every command that
//! was attempted, in order, regardless of which transport ran it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::CommandOutput;
use crate::command::CommandRecord;
use crate::command::CommandSpec;
use crate::error::RemoteError;

// ============================================================================
// SECTION: Runner Interface
// ============================================================================

/// Executes commands against one target and records a transcript.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion within its time limit.
    ///
    /// A nonzero exit is a successful capture, not an error; use
    /// [`run_checked`](CommandRunner::run_checked) to require exit zero.
    ///
    /// # Errors
    /// Returns [`RemoteError`] when the process cannot be spawned, times
    /// out, dies on a signal, or emits non-UTF-8 output.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError>;

    /// Returns the label recorded for this runner's target.
    fn label(&self) -> String;

    /// Returns a snapshot of the transcript in execution order.
    fn transcript(&self) -> Vec<CommandRecord>;

    /// Runs the command and requires a zero exit code.
    ///
    /// # Errors
    /// Returns [`RemoteError`] for transport failures or a nonzero exit.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError> {
        let output = self.run(spec).await?;
        output.require_success()?;
        Ok(output)
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// Shared, ordered record of executed commands.
///
/// Cloning shares the underlying storage, so a runner and its clones append
/// to one transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Entries in execution order.
    entries: Arc<Mutex<Vec<CommandRecord>>>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed execution.
    pub fn record_exit(
        &self,
        target: &str,
        command: &str,
        exit_code: i32,
        duration: Duration,
    ) {
        self.push(target, command, Some(exit_code), duration, None);
    }

    /// Appends an attempt that produced no exit code.
    pub fn record_failure(
        &self,
        target: &str,
        command: &str,
        duration: Duration,
        error: &RemoteError,
    ) {
        self.push(target, command, None, duration, Some(error.to_string()));
    }

    /// Returns a snapshot of all entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CommandRecord> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Appends one record, assigning the next sequence number.
    fn push(
        &self,
        target: &str,
        command: &str,
        exit_code: Option<i32>,
        duration: Duration,
        error: Option<String>,
    ) {
        if let Ok(mut entries) = self.entries.lock() {
            let sequence = entries.len();
            entries.push(CommandRecord {
                sequence,
                target: target.to_string(),
                command: command.to_string(),
                exit_code,
                duration_ms: duration.as_millis(),
                error,
            });
        }
    }
}
