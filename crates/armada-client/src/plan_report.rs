// crates/armada-client/src/plan_report.rs
// ============================================================================
// Module: Plan Report Parser
// Description: Parser for the `show_plan` phase and task table.
// Purpose: Give tests a structured view of the operator-facing plan text.
// Dependencies: armada-model, thiserror
// ============================================================================

//! ## Overview
//! `show_plan` is the only surface that shows phase boundaries and the
//! lock/unlock bracketing around per-node work, so the suite parses its
//! text rather than inventing a private API. The format is line oriented:
//!
//! ```text
//! Phase 1
//!   Initial  /deployments/site/clusters/c1/nodes/n1
//!            Lock node "n1"
//!   Initial  /deployments/site/clusters/c1/services/cs1/applications/web
//!            Deploy VM service "web" on node "n1"
//!
//! Tasks: 2 | Initial: 2 | Running: 0 | Success: 0 | Failed: 0 | Stopped: 0
//! Plan Status: initial
//! ```
//!
//! A task row is a state token followed by a model path; any following
//! indented lines up to the next row are its description. The parser is
//! whitespace tolerant but strict about vocabulary: unknown states or
//! malformed rows are errors, because silently skipping rows would turn
//! ordering assertions into false positives.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use armada_model::ModelPath;
use armada_model::PlanState;
use armada_model::TaskState;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when `show_plan` text does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanReportError {
    /// A phase header did not carry a number.
    #[error("malformed phase header: {0}")]
    MalformedPhase(String),
    /// A task row had the wrong shape or vocabulary.
    #[error("malformed task row: {0}")]
    MalformedTask(String),
    /// A description line appeared before any task row.
    #[error("description without a task row: {0}")]
    OrphanDescription(String),
    /// A task row appeared before any phase header.
    #[error("task row outside a phase: {0}")]
    TaskOutsidePhase(String),
    /// The counts footer was missing or malformed.
    #[error("missing or malformed task counts footer")]
    MissingCounts,
    /// A counts footer entry used an unknown label.
    #[error("unknown task count label: {0}")]
    UnknownCountLabel(String),
    /// The plan status footer was missing or malformed.
    #[error("missing or malformed plan status footer")]
    MissingStatus,
}

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// One task row of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTask {
    /// Task state shown in the row.
    pub state: TaskState,
    /// Model item the task operates on.
    pub path: ModelPath,
    /// Description text, continuation lines joined with single spaces.
    pub description: String,
}

/// One numbered phase of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPhase {
    /// Phase number as printed, starting at one.
    pub number: u32,
    /// Task rows in print order.
    pub tasks: Vec<ReportTask>,
}

/// Task totals from the report footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Total number of tasks.
    pub total: u32,
    /// Tasks not yet started.
    pub initial: u32,
    /// Tasks currently executing.
    pub running: u32,
    /// Tasks completed successfully.
    pub success: u32,
    /// Tasks completed with an error.
    pub failed: u32,
    /// Tasks abandoned by a stop.
    pub stopped: u32,
}

/// Parsed `show_plan` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    /// Plan state from the status footer.
    pub state: PlanState,
    /// Phases in print order.
    pub phases: Vec<ReportPhase>,
    /// Task totals from the counts footer.
    pub counts: TaskCounts,
}

impl PlanReport {
    /// Parses the full report text.
    ///
    /// # Errors
    /// Returns [`PlanReportError`] when rows, footers, or vocabulary do not
    /// match the report format.
    pub fn parse(text: &str) -> Result<Self, PlanReportError> {
        let mut phases: Vec<ReportPhase> = Vec::new();
        let mut counts: Option<TaskCounts> = None;
        let mut state: Option<PlanState> = None;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("Phase ") {
                let number = rest
                    .trim()
                    .parse()
                    .map_err(|_| PlanReportError::MalformedPhase(line.to_string()))?;
                phases.push(ReportPhase {
                    number,
                    tasks: Vec::new(),
                });
            } else if let Some(rest) = line.strip_prefix("Tasks:") {
                counts = Some(parse_counts(rest)?);
            } else if let Some(rest) = line.strip_prefix("Plan Status:") {
                state = Some(
                    PlanState::from_str(rest.trim())
                        .map_err(|_| PlanReportError::MissingStatus)?,
                );
            } else if let Some(task) = parse_task_row(line)? {
                let phase = phases
                    .last_mut()
                    .ok_or_else(|| PlanReportError::TaskOutsidePhase(line.to_string()))?;
                phase.tasks.push(task);
            } else {
                // Description continuation for the most recent task row.
                let task = phases
                    .last_mut()
                    .and_then(|phase| phase.tasks.last_mut())
                    .ok_or_else(|| PlanReportError::OrphanDescription(line.to_string()))?;
                if task.description.is_empty() {
                    task.description = line.to_string();
                } else {
                    task.description.push(' ');
                    task.description.push_str(line);
                }
            }
        }

        Ok(Self {
            state: state.ok_or(PlanReportError::MissingStatus)?,
            phases,
            counts: counts.ok_or(PlanReportError::MissingCounts)?,
        })
    }

    /// Returns the number of phases.
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Iterates over all task rows in phase order.
    pub fn tasks(&self) -> impl Iterator<Item = &ReportTask> {
        self.phases.iter().flat_map(|phase| phase.tasks.iter())
    }

    /// Returns the lock tasks for a node, with their phase indexes.
    #[must_use]
    pub fn lock_tasks_for(&self, node: &str) -> Vec<(usize, &ReportTask)> {
        self.tasks_matching(&lock_description(node))
    }

    /// Returns the unlock tasks for a node, with their phase indexes.
    #[must_use]
    pub fn unlock_tasks_for(&self, node: &str) -> Vec<(usize, &ReportTask)> {
        self.tasks_matching(&unlock_description(node))
    }

    /// Returns the first phase index holding a lock task for a node.
    #[must_use]
    pub fn lock_phase_for(&self, node: &str) -> Option<usize> {
        self.lock_tasks_for(node).first().map(|(idx, _)| *idx)
    }

    /// Returns the last phase index holding an unlock task for a node.
    #[must_use]
    pub fn unlock_phase_for(&self, node: &str) -> Option<usize> {
        self.unlock_tasks_for(node).last().map(|(idx, _)| *idx)
    }

    /// Returns phase indexes with non-lock work tied to a node by its
    /// `on node "<name>"` description suffix.
    #[must_use]
    pub fn work_phases_for(&self, node: &str) -> Vec<usize> {
        let marker = format!("on node \"{node}\"");
        let lock = lock_description(node);
        let unlock = unlock_description(node);
        let mut indexes: Vec<usize> = Vec::new();
        for (idx, phase) in self.phases.iter().enumerate() {
            let has_work = phase.tasks.iter().any(|task| {
                task.description.contains(&marker)
                    && !task.description.starts_with(&lock)
                    && !task.description.starts_with(&unlock)
            });
            if has_work {
                indexes.push(idx);
            }
        }
        indexes
    }

    /// Returns the tasks operating on the given item or its descendants.
    #[must_use]
    pub fn tasks_under(&self, path: &ModelPath) -> Vec<&ReportTask> {
        self.tasks().filter(|task| task.path.is_under(path)).collect()
    }

    /// Collects tasks whose description starts with `needle`.
    fn tasks_matching(&self, needle: &str) -> Vec<(usize, &ReportTask)> {
        let mut matches: Vec<(usize, &ReportTask)> = Vec::new();
        for (idx, phase) in self.phases.iter().enumerate() {
            for task in &phase.tasks {
                if task.description.starts_with(needle) {
                    matches.push((idx, task));
                }
            }
        }
        matches
    }
}

/// Renders the lock task description prefix for a node.
fn lock_description(node: &str) -> String {
    format!("Lock node \"{node}\"")
}

/// Renders the unlock task description prefix for a node.
fn unlock_description(node: &str) -> String {
    format!("Unlock node \"{node}\"")
}

/// Parses a `State /model/path` task row; returns `None` for other lines.
fn parse_task_row(line: &str) -> Result<Option<ReportTask>, PlanReportError> {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let Ok(state) = TaskState::from_str(first) else {
        return Ok(None);
    };
    // From here the line claims to be a task row, so malformed shapes are
    // errors rather than description text.
    let Some(second) = tokens.next() else {
        return Err(PlanReportError::MalformedTask(line.to_string()));
    };
    if tokens.next().is_some() {
        return Err(PlanReportError::MalformedTask(line.to_string()));
    }
    let path = ModelPath::parse(second)
        .map_err(|_| PlanReportError::MalformedTask(line.to_string()))?;
    Ok(Some(ReportTask {
        state,
        path,
        description: String::new(),
    }))
}

/// Parses the counts footer after the `Tasks:` prefix.
fn parse_counts(rest: &str) -> Result<TaskCounts, PlanReportError> {
    let mut counts = TaskCounts::default();
    let mut pieces = rest.split('|');
    let total_text = pieces.next().ok_or(PlanReportError::MissingCounts)?;
    counts.total = total_text
        .trim()
        .parse()
        .map_err(|_| PlanReportError::MissingCounts)?;
    for piece in pieces {
        let (label, value) = piece
            .split_once(':')
            .ok_or(PlanReportError::MissingCounts)?;
        let parsed: u32 = value
            .trim()
            .parse()
            .map_err(|_| PlanReportError::MissingCounts)?;
        match label.trim() {
            "Initial" => counts.initial = parsed,
            "Running" => counts.running = parsed,
            "Success" => counts.success = parsed,
            "Failed" => counts.failed = parsed,
            "Stopped" => counts.stopped = parsed,
            other => {
                return Err(PlanReportError::UnknownCountLabel(other.to_string()));
            }
        }
    }
    Ok(counts)
}
