//! Expression evaluation for GitHub Actions-style ${{ }} syntax
//!
//! Supports:
//! - ${{ env.VAR_NAME }}
//! - ${{ matrix.AXIS_NAME }}
//! - ${{ run.id }} / ${{ run.job }}

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::context::RunContext;

static EXPRESSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\{\s*([^}]+)\s*\}\}").unwrap());

/// Errors that can occur during expression evaluation
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Invalid expression syntax: {0}")]
    InvalidSyntax(String),

    #[error("Missing context: {0}")]
    MissingContext(String),
}

/// Evaluate all expressions in a string
pub fn evaluate(input: &str, ctx: &RunContext) -> Result<String, ExpressionError> {
    let mut result = input.to_string();

    for cap in EXPRESSION_REGEX.captures_iter(input) {
        let full_match = cap.get(0).unwrap().as_str();
        let expr = cap.get(1).unwrap().as_str().trim();

        let value = evaluate_single(expr, ctx)?;
        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Evaluate a single expression (without the ${{ }} wrapper)
fn evaluate_single(expr: &str, ctx: &RunContext) -> Result<String, ExpressionError> {
    let parts: Vec<&str> = expr.split('.').collect();

    if parts.is_empty() {
        return Err(ExpressionError::InvalidSyntax(expr.to_string()));
    }

    match parts[0] {
        "env" => {
            if parts.len() != 2 {
                return Err(ExpressionError::InvalidSyntax(format!(
                    "env expressions must be env.VAR_NAME, got: {}",
                    expr
                )));
            }
            ctx.env
                .get(parts[1])
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownVariable(format!("env.{}", parts[1])))
        }

        "matrix" => {
            if parts.len() != 2 {
                return Err(ExpressionError::InvalidSyntax(format!(
                    "matrix expressions must be matrix.AXIS_NAME, got: {}",
                    expr
                )));
            }
            ctx.matrix
                .get(parts[1])
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownVariable(format!("matrix.{}", parts[1])))
        }

        "run" => match parts.get(1).copied() {
            Some("id") => Ok(ctx.run_id.clone()),
            Some("job") => ctx
                .current_job
                .clone()
                .ok_or_else(|| ExpressionError::MissingContext("current job".to_string())),
            _ => Err(ExpressionError::UnknownVariable(expr.to_string())),
        },

        _ => Err(ExpressionError::UnknownVariable(expr.to_string())),
    }
}

/// Evaluate every value of an environment layer
pub fn evaluate_env(
    env: &HashMap<String, String>,
    ctx: &RunContext,
) -> Result<HashMap<String, String>, ExpressionError> {
    let mut result = HashMap::new();

    for (key, value) in env {
        result.insert(key.clone(), evaluate(value, ctx)?);
    }

    Ok(result)
}
