//! Pipeline, Job, and Step definitions
//!
//! This module contains the core definition types that mirror CI manifest
//! concepts: a pipeline is a named set of independent jobs, each job a
//! sequence of shell steps with an optional matrix and a gating flag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::matrix::Matrix;
use super::trigger::Triggers;

// ============================================================================
// Pipeline
// ============================================================================

/// A complete pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name (required)
    pub name: String,

    /// Repository events that start a run
    #[serde(default)]
    pub on: Triggers,

    /// Environment variables available to all jobs
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Default working directory for all jobs
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Jobs to execute. Jobs are independent: no ordering, no shared state.
    #[serde(default)]
    pub jobs: HashMap<String, Job>,
}

/// Manifest-level validation failures
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Job '{0}' has no steps")]
    EmptyJob(String),

    #[error("Job '{job}' matrix axis '{axis}' has no values")]
    EmptyMatrixAxis { job: String, axis: String },
}

impl Pipeline {
    /// Check structural invariants the manifest format cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, job) in &self.jobs {
            if job.steps.is_empty() {
                return Err(ValidationError::EmptyJob(name.clone()));
            }
            for (axis, values) in &job.matrix.axes {
                if values.is_empty() {
                    return Err(ValidationError::EmptyMatrixAxis {
                        job: name.clone(),
                        axis: axis.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Job names in stable (sorted) order, for deterministic scheduling
    /// and reporting.
    pub fn job_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.jobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// Job
// ============================================================================

/// A job contains a sequence of steps, optionally expanded over a matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Human-readable name
    pub name: Option<String>,

    /// Report failures without gating the run. An advisory job's failure is
    /// surfaced in the run report but contributes "pass" to the aggregate.
    #[serde(default)]
    pub advisory: bool,

    /// Axes this job is parameterized over; each cell runs independently
    #[serde(default)]
    pub matrix: Matrix,

    /// Job-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Override working directory for this job
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Steps to execute, in order. The first failing step fails the cell.
    pub steps: Vec<Step>,
}

// ============================================================================
// Step
// ============================================================================

/// A single step in a job: one external tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step name (for logging)
    pub name: Option<String>,

    /// Shell command to execute
    pub run: String,

    /// Step-level environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Override working directory for this specific step
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Step {
    /// Display name: explicit name, or the command itself.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::trigger::RepoEvent;

    #[test]
    fn test_pipeline_deserialize() {
        let yaml = r#"
name: quality
on:
  push:
    branches: [main]
jobs:
  lint:
    advisory: true
    steps:
      - name: Ruff
        run: ruff check src tests
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pipeline.name, "quality");
        assert!(pipeline.jobs.contains_key("lint"));

        let lint = &pipeline.jobs["lint"];
        assert!(lint.advisory);
        assert_eq!(lint.steps[0].display_name(), "Ruff");
    }

    #[test]
    fn test_jobs_default_to_blocking() {
        let yaml = r#"
name: quality
jobs:
  test:
    steps:
      - run: pytest tests/ -v
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        assert!(!pipeline.jobs["test"].advisory);
    }

    #[test]
    fn test_matrix_job_deserialize() {
        let yaml = r#"
name: quality
jobs:
  test:
    matrix:
      python: ["3.11", "3.12", "3.13"]
    steps:
      - run: pytest tests/ -v --cov=transform_myd_minimal
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        let test = &pipeline.jobs["test"];
        assert_eq!(test.matrix.axes["python"].len(), 3);
        assert_eq!(test.matrix.cells().len(), 3);
    }

    #[test]
    fn test_missing_on_block_accepts_manual_only() {
        let yaml = r#"
name: quality
jobs: {}
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        assert!(pipeline.on.fires_on(&RepoEvent::Manual));
        assert!(!pipeline.on.fires_on(&RepoEvent::Push {
            branch: "main".to_string()
        }));
    }

    #[test]
    fn test_validate_rejects_empty_job() {
        let yaml = r#"
name: quality
jobs:
  broken:
    steps: []
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        let err = pipeline.validate().unwrap_err();
        assert!(matches!(err, ValidationError::EmptyJob(ref j) if j == "broken"));
    }

    #[test]
    fn test_validate_rejects_empty_matrix_axis() {
        let yaml = r#"
name: quality
jobs:
  test:
    matrix:
      python: []
    steps:
      - run: pytest
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        let err = pipeline.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::EmptyMatrixAxis { ref axis, .. } if axis == "python"
        ));
    }

    #[test]
    fn test_job_names_sorted() {
        let yaml = r#"
name: quality
jobs:
  typecheck:
    steps: [{ run: mypy src }]
  lint:
    steps: [{ run: ruff check src tests }]
  format:
    steps: [{ run: black --check src tests }]
"#;

        let pipeline: Pipeline = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pipeline.job_names(), vec!["format", "lint", "typecheck"]);
    }
}
