// crates/armada-remote/src/exec.rs
// ============================================================================
// Module: Bounded Process Execution
// Description: Shared spawn-and-wait loop used by every runner.
// Purpose: Run one argv to completion under a hard wall clock limit.
// Dependencies: crate::{command, error}, tokio
// ============================================================================

//! ## Overview
//! Both runners funnel through one execution path: spawn with piped
//! streams, wait under a timeout, and decode the capture strictly. The
//! child is configured to be killed when its handle is dropped, so a
//! timeout cannot leak a lingering process on the test host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use tokio::process::Command;

use crate::command::CommandOutput;
use crate::error::RemoteError;

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs `argv` to completion within `limit`, capturing both streams.
///
/// `rendered` is the human-readable command line used in errors; for SSH it
/// names the remote command rather than the transport invocation.
pub(crate) async fn run_argv(
    rendered: &str,
    argv: &[String],
    limit: Duration,
) -> Result<CommandOutput, RemoteError> {
    let (program, args) = argv.split_first().ok_or(RemoteError::EmptyCommand)?;

    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    let started = Instant::now();
    let child = command.spawn().map_err(|source| RemoteError::Spawn {
        program: program.clone(),
        source,
    })?;

    let waited = tokio::time::timeout(limit, child.wait_with_output()).await;
    let output = match waited {
        Ok(result) => result.map_err(|source| RemoteError::Io {
            command: rendered.to_string(),
            source,
        })?,
        Err(_elapsed) => {
            return Err(RemoteError::Timeout {
                command: rendered.to_string(),
                limit,
            });
        }
    };
    let duration = started.elapsed();

    let exit_code = output.status.code().ok_or_else(|| RemoteError::Signalled {
        command: rendered.to_string(),
    })?;
    let stdout = String::from_utf8(output.stdout).map_err(|_| RemoteError::NonUtf8 {
        stream: "stdout",
        command: rendered.to_string(),
    })?;
    let stderr = String::from_utf8(output.stderr).map_err(|_| RemoteError::NonUtf8 {
        stream: "stderr",
        command: rendered.to_string(),
    })?;

    Ok(CommandOutput {
        command: rendered.to_string(),
        exit_code,
        stdout,
        stderr,
        duration,
    })
}
