//! Pipeline execution engine module
//!
//! This module contains:
//! - `executor` - The main pipeline executor
//! - `command` - The command runner seam and shell implementation
//! - `error` - Executor error types
//! - `result` - Step, cell, job, and pipeline result types

pub mod command;
pub mod error;
pub mod executor;
pub mod result;

pub use command::{CommandError, CommandOutput, CommandRunner, Invocation, ShellRunner};
pub use error::ExecutorError;
pub use executor::Executor;
pub use result::{CellResult, GateOutcome, JobResult, JobState, PipelineResult, StepResult};
