// crates/armada-remote/src/local.rs
// ============================================================================
// Module: Local Command Runner
// Description: In-process execution with the runner interface.
// Purpose: Back hermetic tests and same-host probes without SSH.
// Dependencies: crate::{command, error, exec, runner}, async-trait
// ============================================================================

//! ## Overview
//! The local runner executes commands on the test host itself through the
//! same bounded execution path as the SSH runner. Hermetic suites use it to
//! exercise capture, timeout, and transcript behavior without any remote
//! dependency, and it doubles as the transport when the product CLI is
//! installed on the host running the tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use async_trait::async_trait;

use crate::command::CommandOutput;
use crate::command::CommandRecord;
use crate::command::CommandSpec;
use crate::error::RemoteError;
use crate::exec;
use crate::runner::CommandRunner;
use crate::runner::Transcript;

// ============================================================================
// SECTION: Local Runner
// ============================================================================

/// Runner that executes commands on the test host.
#[derive(Debug, Clone, Default)]
pub struct LocalRunner {
    /// Shared transcript of executed commands.
    transcript: Transcript,
}

impl LocalRunner {
    /// Creates a local runner with an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError> {
        let rendered = spec.display_line();
        let started = Instant::now();
        let result = exec::run_argv(&rendered, &spec.argv, spec.timeout).await;
        match &result {
            Ok(output) => {
                self.transcript
                    .record_exit("local", &rendered, output.exit_code, output.duration);
            }
            Err(err) => {
                self.transcript
                    .record_failure("local", &rendered, started.elapsed(), err);
            }
        }
        result
    }

    fn label(&self) -> String {
        "local".to_string()
    }

    fn transcript(&self) -> Vec<CommandRecord> {
        self.transcript.snapshot()
    }
}
