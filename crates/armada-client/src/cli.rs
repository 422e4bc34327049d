// crates/armada-client/src/cli.rs
// ============================================================================
// Module: Armada CLI Driver
// Description: Typed front end for the `armada` command line interface.
// Purpose: Issue model mutations and plan control the way an operator does.
// Dependencies: armada-model, armada-remote, crate::{error, plan_report}
// ============================================================================

//! ## Overview
//! All writes to a deployment go through the product CLI; there is no
//! private mutation API to lean on. [`ArmadaCli`] renders each operation to
//! the exact argument list an operator would type and hands it to a command
//! runner, so the same driver works over SSH against a management server or
//! locally in hermetic tests. Failures reported by the CLI follow a stable
//! convention: the first stderr line starts with an error token such as
//! `ValidationError`, which [`CliFailure`] parses so negative tests can
//! assert on the kind rather than on message text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use armada_model::ItemType;
use armada_model::ModelPath;
use armada_model::Properties;
use armada_remote::CommandOutput;
use armada_remote::CommandRunner;
use armada_remote::CommandSpec;
use thiserror::Error;

use crate::error::ClientError;
use crate::plan_report::PlanReport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default wall clock limit for one CLI invocation.
///
/// Generous because `create_plan` compiles the whole model; plan execution
/// itself is asynchronous and never holds a CLI call open.
pub const DEFAULT_CLI_TIMEOUT: Duration = Duration::from_secs(120);

/// Default name of the product binary on the management server path.
const DEFAULT_BINARY: &str = "armada";

// ============================================================================
// SECTION: CLI Failures
// ============================================================================

/// Classification of an error token reported on CLI stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorKind {
    /// `InvalidLocationError`: the addressed path does not exist.
    InvalidLocation,
    /// `ItemExistsError`: an item already occupies the path.
    ItemExists,
    /// `ValidationError`: the model change violates a constraint.
    Validation,
    /// `NoOpPlanError`: no outstanding changes to plan.
    NoOpPlan,
    /// `PlanStateError`: the operation is illegal in the current plan state.
    PlanState,
    /// `InternalServerError`: the product failed internally.
    InternalServer,
    /// A token ending in `Error` that this driver does not know.
    Other(String),
    /// Stderr carried no recognizable error token.
    Unrecognized,
}

impl CliErrorKind {
    /// Classifies a stderr token.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "InvalidLocationError" => Self::InvalidLocation,
            "ItemExistsError" => Self::ItemExists,
            "ValidationError" => Self::Validation,
            "NoOpPlanError" => Self::NoOpPlan,
            "PlanStateError" => Self::PlanState,
            "InternalServerError" => Self::InternalServer,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the stderr token form of this kind.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::InvalidLocation => "InvalidLocationError",
            Self::ItemExists => "ItemExistsError",
            Self::Validation => "ValidationError",
            Self::NoOpPlan => "NoOpPlanError",
            Self::PlanState => "PlanStateError",
            Self::InternalServer => "InternalServerError",
            Self::Other(token) => token,
            Self::Unrecognized => "UnrecognizedError",
        }
    }
}

impl fmt::Display for CliErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A CLI invocation that ran and reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} (exit {exit_code})")]
pub struct CliFailure {
    /// Parsed error token kind.
    pub kind: CliErrorKind,
    /// Message text following the token on the first stderr line.
    pub message: String,
    /// Process exit code.
    pub exit_code: i32,
}

impl CliFailure {
    /// Parses a failure from a captured nonzero-exit CLI run.
    #[must_use]
    pub fn from_output(output: &CommandOutput) -> Self {
        let first_line = output
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        let token = first_line.split_whitespace().next().unwrap_or_default();
        if token.ends_with("Error") {
            let message = first_line[token.len() ..].trim();
            Self {
                kind: CliErrorKind::from_token(token),
                message: if message.is_empty() {
                    token.to_string()
                } else {
                    message.to_string()
                },
                exit_code: output.exit_code,
            }
        } else {
            Self {
                kind: CliErrorKind::Unrecognized,
                message: if first_line.is_empty() {
                    "no stderr output".to_string()
                } else {
                    first_line.to_string()
                },
                exit_code: output.exit_code,
            }
        }
    }
}

// ============================================================================
// SECTION: CLI Driver
// ============================================================================

/// Typed driver for the product CLI over a command runner.
#[derive(Debug, Clone)]
pub struct ArmadaCli<R> {
    /// Transport executing the CLI on the management server.
    runner: R,
    /// Binary name or path to invoke.
    binary: String,
    /// Wall clock limit per invocation.
    command_timeout: Duration,
}

impl<R: CommandRunner> ArmadaCli<R> {
    /// Builds a driver invoking the default `armada` binary.
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            binary: DEFAULT_BINARY.to_string(),
            command_timeout: DEFAULT_CLI_TIMEOUT,
        }
    }

    /// Replaces the binary name or path.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Replaces the per-invocation time limit.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Returns the underlying runner, for transcript access.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Creates a model item.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::ItemExists`] when
    /// the path is occupied and [`CliErrorKind::InvalidLocation`] when the
    /// parent path does not exist.
    pub async fn create(
        &self,
        item_type: &ItemType,
        path: &ModelPath,
        props: &Properties,
    ) -> Result<(), ClientError> {
        let mut args = vec![
            "create".to_string(),
            "-t".to_string(),
            item_type.to_string(),
            "-p".to_string(),
            path.to_string(),
        ];
        push_property_options(&mut args, props);
        self.invoke(args).await.map(|_| ())
    }

    /// Updates item properties, optionally deleting some by name.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] when the path is missing or the change
    /// fails validation.
    pub async fn update(
        &self,
        path: &ModelPath,
        props: &Properties,
        delete: &[&str],
    ) -> Result<(), ClientError> {
        let mut args = vec!["update".to_string(), "-p".to_string(), path.to_string()];
        push_property_options(&mut args, props);
        for name in delete {
            args.push("-d".to_string());
            args.push((*name).to_string());
        }
        self.invoke(args).await.map(|_| ())
    }

    /// Marks an item for removal.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::InvalidLocation`]
    /// when the path does not exist.
    pub async fn remove(&self, path: &ModelPath) -> Result<(), ClientError> {
        let args = vec!["remove".to_string(), "-p".to_string(), path.to_string()];
        self.invoke(args).await.map(|_| ())
    }

    /// Creates an inherited item referencing a source item.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] when either path is invalid or the
    /// overridden properties fail validation.
    pub async fn inherit(
        &self,
        path: &ModelPath,
        source: &ModelPath,
        props: &Properties,
    ) -> Result<(), ClientError> {
        let mut args = vec![
            "inherit".to_string(),
            "-p".to_string(),
            path.to_string(),
            "-s".to_string(),
            source.to_string(),
        ];
        push_property_options(&mut args, props);
        self.invoke(args).await.map(|_| ())
    }

    /// Discards all uncommitted model changes.
    ///
    /// # Errors
    /// Returns [`ClientError`] when the CLI fails or is unreachable.
    pub async fn restore_model(&self) -> Result<(), ClientError> {
        self.invoke(vec!["restore_model".to_string()])
            .await
            .map(|_| ())
    }

    /// Shows the item summary text for a path.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::InvalidLocation`]
    /// when the path does not exist.
    pub async fn show(&self, path: &ModelPath) -> Result<String, ClientError> {
        let args = vec!["show".to_string(), "-p".to_string(), path.to_string()];
        let output = self.invoke(args).await?;
        Ok(output.stdout)
    }

    /// Shows one property value for a path.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] when the path or property is missing.
    pub async fn show_property(
        &self,
        path: &ModelPath,
        name: &str,
    ) -> Result<String, ClientError> {
        let args = vec![
            "show".to_string(),
            "-p".to_string(),
            path.to_string(),
            "-o".to_string(),
            name.to_string(),
        ];
        let output = self.invoke(args).await?;
        Ok(output.stdout_trimmed().to_string())
    }

    /// Compiles outstanding changes into a plan with node lock phases.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::NoOpPlan`] when the
    /// model carries no deployable changes and [`CliErrorKind::Validation`]
    /// when the model is inconsistent.
    pub async fn create_plan(&self) -> Result<(), ClientError> {
        self.invoke(vec!["create_plan".to_string()])
            .await
            .map(|_| ())
    }

    /// Compiles a plan without node lock phases.
    ///
    /// # Errors
    /// Same failure modes as [`create_plan`](ArmadaCli::create_plan).
    pub async fn create_plan_without_lock_tasks(&self) -> Result<(), ClientError> {
        self.invoke(vec![
            "create_plan".to_string(),
            "--no-lock-tasks".to_string(),
        ])
        .await
        .map(|_| ())
    }

    /// Starts executing the current plan.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::PlanState`] when no
    /// runnable plan exists.
    pub async fn run_plan(&self) -> Result<(), ClientError> {
        self.invoke(vec!["run_plan".to_string()]).await.map(|_| ())
    }

    /// Requests a stop of the running plan at the next phase boundary.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::PlanState`] when no
    /// plan is running.
    pub async fn stop_plan(&self) -> Result<(), ClientError> {
        self.invoke(vec!["stop_plan".to_string()]).await.map(|_| ())
    }

    /// Discards the current plan.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::PlanState`] when
    /// the plan is running.
    pub async fn remove_plan(&self) -> Result<(), ClientError> {
        self.invoke(vec!["remove_plan".to_string()])
            .await
            .map(|_| ())
    }

    /// Fetches and parses the plan report text.
    ///
    /// # Errors
    /// Returns [`ClientError::Cli`] with [`CliErrorKind::PlanState`] when no
    /// plan exists, and [`ClientError::PlanReport`] when the report text
    /// does not parse.
    pub async fn show_plan(&self) -> Result<PlanReport, ClientError> {
        let output = self.invoke(vec!["show_plan".to_string()]).await?;
        Ok(PlanReport::parse(&output.stdout)?)
    }

    /// Runs one CLI invocation and classifies a nonzero exit.
    async fn invoke(&self, args: Vec<String>) -> Result<CommandOutput, ClientError> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.binary.clone());
        argv.extend(args);
        let spec = CommandSpec::new(argv).with_timeout(self.command_timeout);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(ClientError::Cli(CliFailure::from_output(&output)))
        }
    }
}

/// Appends `-o name=value ...` when any properties are set.
fn push_property_options(args: &mut Vec<String>, props: &Properties) {
    if !props.is_empty() {
        args.push("-o".to_string());
        args.extend(props.cli_pairs());
    }
}
