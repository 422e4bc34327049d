// crates/armada-remote/src/command.rs
// ============================================================================
// Module: Command Specifications and Outputs
// Description: What to run, what came back, and the transcript record form.
// Purpose: Provide runner-independent command values with bounded execution.
// Dependencies: crate::error, serde
// ============================================================================

//! ## Overview
//! A [`CommandSpec`] names a program and its arguments plus a hard time
//! limit; every execution is bounded so a wedged host cannot hang an
//! acceptance run. A [`CommandOutput`] captures the exit code and decoded
//! streams without judging them, and [`CommandRecord`] is the serializable
//! transcript entry runners append for every completed or timed-out attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

use crate::error::RemoteError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-command wall clock limit.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Command Specification
// ============================================================================

/// One command to execute, with its time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Wall clock limit for the whole execution.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Builds a specification from a program and arguments.
    #[must_use]
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Replaces the time limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Renders the command line for messages and transcripts.
    ///
    /// Arguments containing whitespace are single-quoted for readability;
    /// this form is never handed to a shell.
    #[must_use]
    pub fn display_line(&self) -> String {
        let rendered: Vec<String> = self
            .argv
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                    format!("'{arg}'")
                } else {
                    arg.clone()
                }
            })
            .collect();
        rendered.join(" ")
    }
}

// ============================================================================
// SECTION: Command Output
// ============================================================================

/// Captured result of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Rendered command line that produced this output.
    pub command: String,
    /// Process exit code.
    pub exit_code: i32,
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
    /// Wall clock duration of the execution.
    pub duration: Duration,
}

impl CommandOutput {
    /// Returns true when the command exited zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Converts a nonzero exit into [`RemoteError::CommandFailed`].
    ///
    /// # Errors
    /// Returns [`RemoteError::CommandFailed`] carrying the trimmed stderr
    /// when the exit code is nonzero.
    pub fn require_success(&self) -> Result<(), RemoteError> {
        if self.success() {
            Ok(())
        } else {
            Err(RemoteError::CommandFailed {
                command: self.command.clone(),
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }

    /// Returns stdout with surrounding whitespace removed.
    #[must_use]
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Returns true when stdout contains the needle.
    #[must_use]
    pub fn stdout_contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Returns trimmed, non-empty stdout lines.
    #[must_use]
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
    }
}

// ============================================================================
// SECTION: Transcript Records
// ============================================================================

/// One transcript entry describing a completed or failed execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// Position of this entry in the runner transcript, starting at zero.
    pub sequence: usize,
    /// Label of the runner target, such as the node name.
    pub target: String,
    /// Rendered command line.
    pub command: String,
    /// Exit code when the process exited; `None` for timeouts and signals.
    pub exit_code: Option<i32>,
    /// Execution duration in milliseconds.
    pub duration_ms: u128,
    /// Transport error text when the attempt did not produce an exit code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
