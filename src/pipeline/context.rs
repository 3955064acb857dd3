//! Run context
//!
//! Runtime state visible to expression evaluation: the layered environment,
//! the current cell's matrix bindings, and run metadata.

use std::collections::{BTreeMap, HashMap};

use super::matrix::MatrixCell;

/// Runtime context for expression evaluation
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Environment variables, merged outermost-first
    pub env: HashMap<String, String>,

    /// Matrix bindings for the current cell
    pub matrix: BTreeMap<String, String>,

    /// Current job name
    pub current_job: Option<String>,

    /// Run ID
    pub run_id: String,
}

impl RunContext {
    /// Create a new run context with a generated run ID
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }

    pub fn get_env(&self, key: &str) -> Option<&String> {
        self.env.get(key)
    }

    pub fn set_env(&mut self, key: &str, value: String) {
        self.env.insert(key.to_string(), value);
    }

    /// Merge environment variables from an outer layer; later layers win.
    pub fn merge_env(&mut self, env: &HashMap<String, String>) {
        for (key, value) in env {
            self.env.insert(key.clone(), value.clone());
        }
    }

    /// Derive the context for one matrix cell of a job.
    pub fn for_cell(&self, job: &str, cell: &MatrixCell) -> Self {
        let mut ctx = self.clone();
        ctx.current_job = Some(job.to_string());
        ctx.matrix = cell.values.clone();
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_run_id() {
        let ctx = RunContext::new();
        assert!(!ctx.run_id.is_empty());
    }

    #[test]
    fn test_merge_env_overwrites() {
        let mut ctx = RunContext::new();
        ctx.set_env("EXISTING", "value1".to_string());

        let mut layer = HashMap::new();
        layer.insert("NEW_VAR".to_string(), "value2".to_string());
        layer.insert("EXISTING".to_string(), "overwritten".to_string());

        ctx.merge_env(&layer);

        assert_eq!(ctx.get_env("NEW_VAR"), Some(&"value2".to_string()));
        assert_eq!(ctx.get_env("EXISTING"), Some(&"overwritten".to_string()));
    }

    #[test]
    fn test_for_cell_binds_matrix() {
        let mut base = RunContext::new();
        base.set_env("SHARED", "yes".to_string());

        let mut cell = MatrixCell::default();
        cell.values.insert("python".to_string(), "3.12".to_string());

        let ctx = base.for_cell("test", &cell);
        assert_eq!(ctx.current_job.as_deref(), Some("test"));
        assert_eq!(ctx.matrix.get("python"), Some(&"3.12".to_string()));
        assert_eq!(ctx.get_env("SHARED"), Some(&"yes".to_string()));

        // The base context is untouched.
        assert!(base.matrix.is_empty());
    }
}
