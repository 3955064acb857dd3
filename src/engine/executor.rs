//! Pipeline Executor - Runs pipelines and aggregates gating results
//!
//! This is the main engine that:
//! 1. Checks the trigger policy against the repository event
//! 2. Expands each job's matrix into independent cells
//! 3. Evaluates expressions and layers environments per cell
//! 4. Schedules all cells concurrently under a bounded semaphore
//! 5. Folds cell results into job results and the aggregate run status,
//!    remapping advisory failures to non-gating outcomes

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use crate::engine::command::{CommandRunner, Invocation, ShellRunner};
use crate::engine::error::ExecutorError;
use crate::engine::result::{
    CellResult, GateOutcome, JobResult, JobState, PipelineResult, StepResult,
};
use crate::pipeline::expressions::{evaluate, evaluate_env};
use crate::pipeline::{Pipeline, RepoEvent, RunContext};

/// One schedulable unit of work: a single matrix cell of a job
struct ExecUnit {
    job: String,
    cell_label: String,
    invocations: Vec<(String, Invocation)>,
}

/// The gating-aware pipeline executor
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
    max_concurrent: usize,
    base_env: HashMap<String, String>,
}

impl Executor {
    /// Create an executor that runs steps through the host shell
    pub fn new() -> Self {
        Self::with_runner(Arc::new(ShellRunner))
    }

    /// Create an executor with a custom command runner (for testing/embedding)
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            max_concurrent: 4,
            base_env: HashMap::new(),
        }
    }

    /// Maximum number of cells executing at once
    pub fn parallel(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Set an environment variable visible to every job
    pub fn set_env(&mut self, key: &str, value: &str) {
        self.base_env.insert(key.to_string(), value.to_string());
    }

    /// Run a pipeline from a YAML string via manual dispatch
    #[instrument(skip(self, yaml))]
    pub async fn run_yaml(&self, yaml: &str) -> Result<PipelineResult, ExecutorError> {
        let pipeline: Pipeline = serde_yaml::from_str(yaml)?;
        self.run(&pipeline).await
    }

    /// Run a pipeline via manual dispatch (always fires)
    pub async fn run(&self, pipeline: &Pipeline) -> Result<PipelineResult, ExecutorError> {
        self.execute(pipeline, RepoEvent::Manual).await
    }

    /// Run a pipeline for a repository event.
    ///
    /// Returns `None` when the event does not trigger the pipeline: no run
    /// is created and nothing executes.
    pub async fn run_for_event(
        &self,
        pipeline: &Pipeline,
        event: &RepoEvent,
    ) -> Result<Option<PipelineResult>, ExecutorError> {
        if !pipeline.on.fires_on(event) {
            info!(
                "Pipeline {} not triggered by {} - no run created",
                pipeline.name, event
            );
            return Ok(None);
        }
        Ok(Some(self.execute(pipeline, event.clone()).await?))
    }

    #[instrument(skip(self, pipeline, event), fields(pipeline_name = %pipeline.name))]
    async fn execute(
        &self,
        pipeline: &Pipeline,
        event: RepoEvent,
    ) -> Result<PipelineResult, ExecutorError> {
        pipeline.validate()?;

        let started_at = Utc::now();
        let mut ctx = RunContext::new();
        ctx.merge_env(&self.base_env);
        let pipeline_env = evaluate_env(&pipeline.env, &ctx)?;
        ctx.merge_env(&pipeline_env);

        info!(
            "Starting pipeline: {} ({}, run {})",
            pipeline.name, event, ctx.run_id
        );

        let mut states: HashMap<String, JobState> = HashMap::new();
        let mut advisory_flags: HashMap<String, bool> = HashMap::new();
        let mut units = Vec::new();

        // Expansion phase: resolve every cell's invocations up front so
        // misconfiguration surfaces before anything runs.
        for job_name in pipeline.job_names() {
            let job = &pipeline.jobs[job_name];
            transition(&mut states, job_name, JobState::Pending);
            advisory_flags.insert(job_name.to_string(), job.advisory);

            for cell in job.matrix.cells() {
                let mut cell_ctx = ctx.for_cell(job_name, &cell);
                let job_env = evaluate_env(&job.env, &cell_ctx)?;
                cell_ctx.merge_env(&job_env);

                let mut invocations = Vec::with_capacity(job.steps.len());
                for step in &job.steps {
                    let command = evaluate(&step.run, &cell_ctx)?;
                    let step_env = evaluate_env(&step.env, &cell_ctx)?;

                    let mut env = cell_ctx.env.clone();
                    env.extend(step_env);

                    let working_dir = step
                        .working_dir
                        .clone()
                        .or_else(|| job.working_dir.clone())
                        .or_else(|| pipeline.working_dir.clone());

                    invocations.push((
                        step.display_name().to_string(),
                        Invocation {
                            command,
                            env,
                            working_dir,
                        },
                    ));
                }

                units.push(ExecUnit {
                    job: job_name.to_string(),
                    cell_label: cell.label(),
                    invocations,
                });
            }
        }

        // Scheduling phase: jobs share no state and have no ordering, so
        // every cell is an independent unit bounded only by the semaphore.
        for job_name in pipeline.job_names() {
            transition(&mut states, job_name, JobState::Running);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let futures: Vec<_> = units
            .into_iter()
            .map(|unit| {
                let sem = semaphore.clone();
                let runner = self.runner.clone();
                async move {
                    let _permit = sem.acquire().await.unwrap();
                    run_cell(runner.as_ref(), unit).await
                }
            })
            .collect();

        let mut cells_by_job: HashMap<String, Vec<CellResult>> = HashMap::new();
        for (job, cell) in join_all(futures).await {
            cells_by_job.entry(job).or_default().push(cell);
        }

        // Aggregation phase: a job is the AND of its cells; the run fails
        // iff a blocking job failed.
        let mut jobs = HashMap::new();
        let mut all_success = true;

        for (job_name, cells) in cells_by_job {
            let job_success = cells.iter().all(|c| c.success);
            let state = if job_success {
                JobState::Succeeded
            } else {
                JobState::Failed
            };
            transition(&mut states, &job_name, state);

            let result = JobResult {
                advisory: advisory_flags[&job_name],
                state,
                cells,
            };

            match result.gate_outcome() {
                GateOutcome::Fail => {
                    error!(job = %job_name, "Blocking job failed");
                    all_success = false;
                }
                GateOutcome::Advisory => {
                    warn!(job = %job_name, "Advisory job reported findings (non-gating)");
                }
                GateOutcome::Pass => {
                    info!(job = %job_name, "Job succeeded");
                }
            }

            jobs.insert(job_name, result);
        }

        info!(
            "Pipeline {} finished: {}",
            pipeline.name,
            if all_success { "succeeded" } else { "failed" }
        );

        Ok(PipelineResult {
            success: all_success,
            run_id: ctx.run_id,
            pipeline: pipeline.name.clone(),
            event,
            started_at,
            finished_at: Utc::now(),
            jobs,
        })
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn transition(states: &mut HashMap<String, JobState>, job: &str, next: JobState) {
    let prev = states.insert(job.to_string(), next);
    debug!(job, from = ?prev, to = ?next, "Job state transition");
}

/// Run one cell: steps execute in order, the first failure stops the cell.
async fn run_cell(runner: &dyn CommandRunner, unit: ExecUnit) -> (String, CellResult) {
    let started = Instant::now();
    let mut steps = Vec::with_capacity(unit.invocations.len());
    let mut success = true;

    debug!(job = %unit.job, cell = %unit.cell_label, "Cell started");

    for (name, invocation) in &unit.invocations {
        match runner.run(invocation).await {
            Ok(output) => {
                let ok = output.success();
                if !ok {
                    warn!(
                        job = %unit.job,
                        cell = %unit.cell_label,
                        step = %name,
                        exit_code = output.exit_code,
                        "Step failed"
                    );
                }
                steps.push(StepResult {
                    name: name.clone(),
                    success: ok,
                    exit_code: output.exit_code,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    error: None,
                });
                if !ok {
                    success = false;
                    break;
                }
            }
            Err(e) => {
                error!(
                    job = %unit.job,
                    cell = %unit.cell_label,
                    step = %name,
                    "Failed to start step: {}", e
                );
                steps.push(StepResult {
                    name: name.clone(),
                    success: false,
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: String::new(),
                    error: Some(e.to_string()),
                });
                success = false;
                break;
            }
        }
    }

    let cell = CellResult {
        label: unit.cell_label,
        success,
        steps,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    (unit.job, cell)
}
