//! Execution result types and the job state machine

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::trigger::RepoEvent;

/// Lifecycle of a single job: `pending → running → {succeeded, failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// A job's contribution to the aggregate run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// The job succeeded
    Pass,
    /// A blocking job failed; the run fails
    Fail,
    /// An advisory job failed; reported but never gates the run
    Advisory,
}

/// Result of a single step within a cell
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set when the tool could not be spawned at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one matrix cell (the only cell, for jobs without a matrix)
#[derive(Debug, Clone, Serialize)]
pub struct CellResult {
    pub label: String,
    pub success: bool,
    pub steps: Vec<StepResult>,
    pub duration_ms: u64,
}

/// Result of a job execution across all of its matrix cells
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub advisory: bool,
    pub state: JobState,
    pub cells: Vec<CellResult>,
}

impl JobResult {
    pub fn success(&self) -> bool {
        self.state == JobState::Succeeded
    }

    /// Remap the terminal state through the gating policy: advisory
    /// failures are reported but contribute "pass" to the aggregate.
    pub fn gate_outcome(&self) -> GateOutcome {
        match (self.state, self.advisory) {
            (JobState::Failed, false) => GateOutcome::Fail,
            (JobState::Failed, true) => GateOutcome::Advisory,
            _ => GateOutcome::Pass,
        }
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub run_id: String,
    pub pipeline: String,
    pub event: RepoEvent,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs: HashMap<String, JobResult>,
}

impl PipelineResult {
    /// Names of blocking jobs that failed, in stable order.
    pub fn gating_failures(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .jobs
            .iter()
            .filter(|(_, r)| r.gate_outcome() == GateOutcome::Fail)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Names of advisory jobs that failed, in stable order.
    pub fn advisory_findings(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .jobs
            .iter()
            .filter(|(_, r)| r.gate_outcome() == GateOutcome::Advisory)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(state: JobState, advisory: bool) -> JobResult {
        JobResult {
            advisory,
            state,
            cells: vec![],
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn test_blocking_failure_gates() {
        assert_eq!(
            job(JobState::Failed, false).gate_outcome(),
            GateOutcome::Fail
        );
    }

    #[test]
    fn test_advisory_failure_is_remapped() {
        assert_eq!(
            job(JobState::Failed, true).gate_outcome(),
            GateOutcome::Advisory
        );
    }

    #[test]
    fn test_success_passes_either_way() {
        assert_eq!(
            job(JobState::Succeeded, false).gate_outcome(),
            GateOutcome::Pass
        );
        assert_eq!(
            job(JobState::Succeeded, true).gate_outcome(),
            GateOutcome::Pass
        );
    }
}
