//! Matrix expansion
//!
//! A job may be parameterized over one or more axes (e.g. interpreter
//! versions). The cartesian product of the axes yields the job's cells;
//! each cell is an independent execution with its own variable bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Matrix axes: axis name to the list of values it takes.
///
/// Backed by a `BTreeMap` so cell expansion order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix {
    pub axes: BTreeMap<String, Vec<String>>,
}

/// One concrete assignment of every matrix axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub values: BTreeMap<String, String>,
}

impl MatrixCell {
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values.get(axis).map(String::as_str)
    }

    /// Human-readable cell label, e.g. `python=3.12`.
    pub fn label(&self) -> String {
        if self.values.is_empty() {
            return "default".to_string();
        }
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Matrix {
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Expand the axes into their cartesian product.
    ///
    /// A job without a matrix expands to a single unlabeled cell. An axis
    /// with no values yields zero cells; validation rejects that upstream.
    pub fn cells(&self) -> Vec<MatrixCell> {
        let mut cells = vec![MatrixCell::default()];

        for (axis, values) in &self.axes {
            let mut expanded = Vec::with_capacity(cells.len() * values.len());
            for cell in &cells {
                for value in values {
                    let mut next = cell.clone();
                    next.values.insert(axis.clone(), value.clone());
                    expanded.push(next);
                }
            }
            cells = expanded;
        }

        cells
    }
}
