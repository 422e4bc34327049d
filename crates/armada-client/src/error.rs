// crates/armada-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error type for CLI driving and model query access.
// Purpose: Separate product-reported failures from transport failures.
// Dependencies: armada-model, armada-remote, crate::{cli, plan_report}
// ============================================================================

//! ## Overview
//! Acceptance checks care about the difference between "the product said
//! no" and "the test could not ask": a `ValidationError` on stderr is often
//! the expected outcome of a negative test, while a connection failure
//! never is. [`ClientError`] keeps product-reported failures
//! ([`Cli`](ClientError::Cli), [`InvalidLocation`](ClientError::InvalidLocation),
//! [`PlanNotFound`](ClientError::PlanNotFound)) structurally distinct from
//! transport and decoding failures so tests can match on exactly the
//! failure they provoked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use armada_model::ModelPath;
use armada_model::PlanState;
use armada_remote::RemoteError;
use thiserror::Error;

use crate::cli::CliErrorKind;
use crate::cli::CliFailure;
use crate::plan_report::PlanReportError;

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Error raised while driving the product or querying its model.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The command transport failed before the CLI could answer.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// The CLI ran and reported a failure on stderr.
    #[error(transparent)]
    Cli(#[from] CliFailure),
    /// The `show_plan` report text did not parse.
    #[error(transparent)]
    PlanReport(#[from] PlanReportError),
    /// The query client could not be constructed.
    #[error("query client setup failed: {message}")]
    Setup {
        /// Human-readable cause.
        message: String,
    },
    /// An HTTP request failed at the transport level.
    #[error("query request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// A response body was not the JSON document it should have been.
    #[error("query response from {url} did not decode: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Human-readable decode failure.
        message: String,
    },
    /// The query service answered with an unexpected HTTP status.
    #[error("query request to {url} returned status {status}: {body}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for diagnostics.
        body: String,
    },
    /// The addressed model item does not exist.
    #[error("model path not found: {path}")]
    InvalidLocation {
        /// Path that failed to resolve.
        path: ModelPath,
    },
    /// The addressed item exists but lacks the requested property.
    #[error("property {name:?} not found at {path}")]
    PropertyNotFound {
        /// Item path.
        path: ModelPath,
        /// Requested property name.
        name: String,
    },
    /// No execution plan currently exists.
    #[error("no plan exists")]
    PlanNotFound,
    /// The plan reached a terminal state other than the awaited one.
    #[error("plan reached terminal state {got} while waiting for {wanted}")]
    PlanDiverged {
        /// State the caller was waiting for.
        wanted: PlanState,
        /// Terminal state the plan actually reached.
        got: PlanState,
    },
    /// A bounded wait elapsed without the condition holding.
    #[error("timed out after {attempts} attempts over {waited:?} waiting for {description}")]
    WaitTimeout {
        /// Description of the awaited condition.
        description: String,
        /// Time spent polling.
        waited: Duration,
        /// Number of probe attempts.
        attempts: u32,
    },
}

impl ClientError {
    /// Returns the CLI failure kind when the product rejected a command.
    #[must_use]
    pub const fn cli_kind(&self) -> Option<&CliErrorKind> {
        match self {
            Self::Cli(failure) => Some(&failure.kind),
            _ => None,
        }
    }
}
