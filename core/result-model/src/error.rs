//! FILENAME: core/result-model/src/error.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed input from the query service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResultError {
    #[error("query result has no columns")]
    NoColumns,

    #[error("query result has no rows")]
    NoRows,

    #[error("row {row} has {actual} cells, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid query result payload: {0}")]
    InvalidJson(String),
}

/// Pipeline stage a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Column,
    Axis,
    Table,
    Filter,
    Pivot,
    Drilldown,
    Display,
}

/// A suppressed error, reported alongside a degraded-but-valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Diagnostic {
            stage,
            message: message.into(),
        }
    }
}
