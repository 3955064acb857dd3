//! # Quality Gate
//!
//! A GitHub Actions-style CI pipeline runner with blocking and advisory
//! quality jobs.
//!
//! ## Features
//!
//! - **Declarative YAML pipelines** - Define quality gates like CI manifests
//! - **Blocking vs advisory jobs** - Verification jobs gate the run; quality
//!   jobs report findings without failing it
//! - **Matrix expansion** - Parameterize a job over interpreter versions or
//!   any other axes; every cell runs independently
//! - **Trigger policy** - Push and pull-request branch filters, manual
//!   dispatch always available
//! - **Parallel execution** - All cells run concurrently under a bounded
//!   semaphore
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quality_gate::Executor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline_yaml = r#"
//! name: quality
//! on:
//!   push:
//!     branches: [main]
//! jobs:
//!   lint:
//!     advisory: true
//!     steps:
//!       - run: ruff check src tests
//!   test:
//!     matrix:
//!       python: ["3.11", "3.12", "3.13"]
//!     steps:
//!       - run: pytest tests/ -v
//! "#;
//!
//!     let executor = Executor::new();
//!     let result = executor.run_yaml(pipeline_yaml).await?;
//!
//!     println!("Pipeline completed: success={}", result.success);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod pipeline;

// Re-export main types
pub use engine::{
    CellResult, CommandError, CommandOutput, CommandRunner, Executor, ExecutorError, GateOutcome,
    Invocation, JobResult, JobState, PipelineResult, ShellRunner, StepResult,
};
pub use pipeline::{
    BranchFilter, Job, LoadError, Matrix, MatrixCell, Pipeline, PipelineLoader, RepoEvent,
    RunContext, Step, Triggers, ValidationError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{
        CommandRunner, Executor, ExecutorError, GateOutcome, JobState, PipelineResult, ShellRunner,
    };
    pub use crate::pipeline::{
        LoadError, Matrix, Pipeline, PipelineLoader, RepoEvent, Step, Triggers,
    };
}
