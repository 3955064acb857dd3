//! Executor error types

use crate::pipeline::expressions::ExpressionError;
use crate::pipeline::job::ValidationError;

/// Errors that can occur during pipeline execution
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Expression error: {0}")]
    ExpressionError(#[from] ExpressionError),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(#[from] ValidationError),
}
