// crates/armada-remote/src/ssh.rs
// ============================================================================
// Module: SSH Command Runner
// Description: Batch-mode OpenSSH execution against one remote host.
// Purpose: Run commands on managed hosts through the system ssh client.
// Dependencies: crate::{command, error, exec, runner, target}, async-trait
// ============================================================================

//! ## Overview
//! Remote hosts are reached through the system OpenSSH client rather than
//! an in-process SSH implementation, so host keys, agents, and jump
//! configuration behave exactly as they do for an operator at a terminal.
//! Batch mode keeps runs non-interactive: a host that would prompt fails
//! fast instead of hanging. Connection multiplexing is on by default so a
//! suite issuing dozens of short probes pays the handshake once per host.
//!
//! Remote commands are passed as a single shell word sequence quoted by
//! [`quote_for_shell`], because the remote sshd hands the command line to
//! the login shell for splitting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;

use crate::command::CommandOutput;
use crate::command::CommandRecord;
use crate::command::CommandSpec;
use crate::error::RemoteError;
use crate::exec;
use crate::runner::CommandRunner;
use crate::runner::Transcript;
use crate::target::HostTarget;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default TCP connect budget for one SSH session.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a multiplexed master connection lingers after its last use.
const CONTROL_PERSIST_SECS: u64 = 60;

// ============================================================================
// SECTION: Shell Quoting
// ============================================================================

/// Quotes one argument for the remote login shell.
///
/// Arguments made of conservative characters pass through unchanged;
/// everything else is single-quoted with embedded single quotes escaped.
#[must_use]
pub fn quote_for_shell(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_plain_shell_char) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Returns true for characters that never need shell quoting.
const fn is_plain_shell_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '_' | '-' | '.' | '/' | '=' | ':' | ',' | '@' | '+' | '%'
        )
}

/// Joins an argv into one quoted remote command line.
fn remote_command_line(argv: &[String]) -> String {
    let quoted: Vec<String> = argv.iter().map(|arg| quote_for_shell(arg)).collect();
    quoted.join(" ")
}

// ============================================================================
// SECTION: SSH Runner
// ============================================================================

/// Batch-mode SSH runner bound to one host.
///
/// Cloning shares the transcript, so per-suite clones of a node runner
/// still produce a single ordered record.
#[derive(Debug, Clone)]
pub struct SshRunner {
    /// Host this runner connects to.
    target: HostTarget,
    /// TCP connect budget passed to the ssh client.
    connect_timeout: Duration,
    /// Whether to reuse a multiplexed master connection.
    multiplex: bool,
    /// Shared transcript of executed commands.
    transcript: Transcript,
}

impl SshRunner {
    /// Builds a runner for a host with default connect behavior.
    #[must_use]
    pub fn new(target: HostTarget) -> Self {
        Self {
            target,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            multiplex: true,
            transcript: Transcript::new(),
        }
    }

    /// Replaces the TCP connect budget.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Disables connection multiplexing.
    ///
    /// Useful against hosts whose sshd forbids control sockets.
    #[must_use]
    pub fn without_multiplexing(mut self) -> Self {
        self.multiplex = false;
        self
    }

    /// Returns the target this runner connects to.
    #[must_use]
    pub const fn target(&self) -> &HostTarget {
        &self.target
    }

    /// Renders the full ssh invocation for one command.
    ///
    /// Exposed so callers can inspect exactly what would be executed; the
    /// first element is always `ssh`.
    #[must_use]
    pub fn ssh_argv(&self, spec: &CommandSpec) -> Vec<String> {
        let mut argv = vec![
            "ssh".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ];
        if self.multiplex {
            let control_path = std::env::temp_dir().join("armada-cm-%C");
            argv.push("-o".to_string());
            argv.push("ControlMaster=auto".to_string());
            argv.push("-o".to_string());
            argv.push(format!("ControlPath={}", control_path.display()));
            argv.push("-o".to_string());
            argv.push(format!("ControlPersist={CONTROL_PERSIST_SECS}"));
        }
        if let Some(port) = self.target.port {
            argv.push("-p".to_string());
            argv.push(port.to_string());
        }
        if let Some(identity) = &self.target.identity_file {
            argv.push("-i".to_string());
            argv.push(identity.display().to_string());
            argv.push("-o".to_string());
            argv.push("IdentitiesOnly=yes".to_string());
        }
        argv.push("--".to_string());
        argv.push(self.target.destination());
        argv.push(remote_command_line(&spec.argv));
        argv
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError> {
        if spec.argv.is_empty() {
            return Err(RemoteError::EmptyCommand);
        }
        let rendered = spec.display_line();
        let ssh_argv = self.ssh_argv(spec);
        // The ssh process budget covers the remote command plus connection
        // establishment, so a slow handshake does not eat the command limit.
        let limit = spec.timeout.saturating_add(self.connect_timeout);

        let started = Instant::now();
        let result = exec::run_argv(&rendered, &ssh_argv, limit).await;
        match &result {
            Ok(output) => {
                self.transcript.record_exit(
                    &self.target.name,
                    &rendered,
                    output.exit_code,
                    output.duration,
                );
            }
            Err(err) => {
                self.transcript
                    .record_failure(&self.target.name, &rendered, started.elapsed(), err);
            }
        }
        result
    }

    fn label(&self) -> String {
        self.target.name.clone()
    }

    fn transcript(&self) -> Vec<CommandRecord> {
        self.transcript.snapshot()
    }
}
