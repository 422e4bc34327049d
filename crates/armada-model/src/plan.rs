// crates/armada-model/src/plan.rs
// ============================================================================
// Module: Armada Plan Documents
// Description: Plan and task states plus the query-service plan document.
// Purpose: Mirror the execution plan wire form for polling and assertions.
// Dependencies: crate::path, serde, thiserror
// ============================================================================

//! ## Overview
//! Creating a plan compiles outstanding model changes into ordered phases of
//! tasks; running it executes the phases in sequence. The query service
//! exposes the whole structure as one JSON document, which acceptance tests
//! poll until the plan reaches a terminal state. Plan states use the
//! lowercase wire spelling (`successful`), task states the capitalized one
//! (`Success`); both spellings are fixed by the product and preserved here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::path::ModelPath;

// ============================================================================
// SECTION: Plan States
// ============================================================================

/// Error raised when a plan state string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized plan state: {0}")]
pub struct PlanStateParseError(pub String);

/// Lifecycle state of the execution plan as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanState {
    /// Compiled but not yet run.
    Initial,
    /// Phases are executing.
    Running,
    /// A stop was requested and in-flight tasks are draining.
    Stopping,
    /// Stopped before completion at a phase boundary.
    Stopped,
    /// At least one task failed and execution halted.
    Failed,
    /// Every task completed successfully.
    Successful,
}

impl PlanState {
    /// Returns the wire spelling used by the CLI and query service.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Successful => "successful",
        }
    }

    /// Returns true when the plan can no longer make progress on its own.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed | Self::Successful)
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for PlanState {
    type Err = PlanStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "running" => Ok(Self::Running),
            "stopping" => Ok(Self::Stopping),
            "stopped" => Ok(Self::Stopped),
            "failed" => Ok(Self::Failed),
            "successful" => Ok(Self::Successful),
            other => Err(PlanStateParseError(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Task States
// ============================================================================

/// Error raised when a task state string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized task state: {0}")]
pub struct TaskStateParseError(pub String);

/// Lifecycle state of a single plan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Not yet started.
    Initial,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Success,
    /// Completed with an error.
    Failed,
    /// Abandoned because the plan was stopped.
    Stopped,
}

impl TaskState {
    /// Returns the wire spelling used by the CLI and query service.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Running => "Running",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Stopped => "Stopped",
        }
    }

    /// Returns true when the task has finished one way or another.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Stopped)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for TaskState {
    type Err = TaskStateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initial" => Ok(Self::Initial),
            "Running" => Ok(Self::Running),
            "Success" => Ok(Self::Success),
            "Failed" => Ok(Self::Failed),
            "Stopped" => Ok(Self::Stopped),
            other => Err(TaskStateParseError(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Plan Documents
// ============================================================================

/// One task within a plan phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    /// Opaque task identifier.
    pub id: String,
    /// Current task state.
    pub state: TaskState,
    /// Human-readable description of the work.
    pub description: String,
    /// Model item this task operates on.
    #[serde(rename = "model-item")]
    pub model_item: ModelPath,
}

/// One ordered phase of tasks.
///
/// Phases run strictly in sequence; tasks within a phase may run together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPhase {
    /// Tasks belonging to this phase.
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
}

/// The execution plan document served by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Overall plan state.
    pub state: PlanState,
    /// Ordered phases; empty only for a degenerate plan.
    #[serde(default)]
    pub phases: Vec<PlanPhase>,
}

impl PlanDocument {
    /// Iterates over every task in phase order.
    pub fn tasks(&self) -> impl Iterator<Item = &PlanTask> {
        self.phases.iter().flat_map(|phase| phase.tasks.iter())
    }

    /// Returns the tasks operating on the given item or its descendants.
    #[must_use]
    pub fn tasks_under(&self, path: &ModelPath) -> Vec<&PlanTask> {
        self.tasks()
            .filter(|task| task.model_item.is_under(path))
            .collect()
    }

    /// Returns true when every task reached [`TaskState::Success`].
    #[must_use]
    pub fn all_tasks_succeeded(&self) -> bool {
        self.tasks().all(|task| task.state == TaskState::Success)
    }

    /// Counts the tasks currently in the given state.
    #[must_use]
    pub fn task_count_by_state(&self, state: TaskState) -> usize {
        self.tasks().filter(|task| task.state == state).count()
    }
}
