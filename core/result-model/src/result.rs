//! FILENAME: core/result-model/src/result.rs
//! PURPOSE: The input contract received from the query service.

use serde::{Deserialize, Serialize};

use crate::axis::AxisConfig;
use crate::cell::Row;
use crate::column::Column;
use crate::error::ResultError;

/// A completed, flat query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub rows: Vec<Row>,

    /// Index of the column the query service considers the headline amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_amount_column: Option<usize>,

    /// Axis configuration from the previous fetch of the same query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_axis_config: Option<AxisConfig>,
}

impl QueryResult {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        QueryResult {
            columns,
            rows,
            default_amount_column: None,
            previous_axis_config: None,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, ResultError> {
        serde_json::from_str(payload).map_err(|e| ResultError::InvalidJson(e.to_string()))
    }

    /// Checks the row shape invariant: every row has exactly one cell per column.
    pub fn validate(&self) -> Result<(), ResultError> {
        if self.columns.is_empty() {
            return Err(ResultError::NoColumns);
        }
        if self.rows.is_empty() {
            return Err(ResultError::NoRows);
        }
        let expected = self.columns.len();
        if let Some((row, cells)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(ResultError::RowLengthMismatch {
                row,
                expected,
                actual: cells.len(),
            });
        }
        Ok(())
    }

    pub fn is_single_value(&self) -> bool {
        self.columns.len() == 1 && self.rows.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn parses_network_payload() {
        let payload = r#"{
            "columns": [
                {"name": "region", "type": "STRING", "groupable": true},
                {"name": "sales", "type": "DOLLAR_AMT"}
            ],
            "rows": [["North", 10], ["South", null]],
            "defaultAmountColumn": 1
        }"#;
        let result = QueryResult::from_json(payload).unwrap();
        assert_eq!(result.columns.len(), 2);
        assert_eq!(result.rows[1][1], CellValue::Null);
        assert_eq!(result.default_amount_column, Some(1));
        assert!(result.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(QueryResult::default().validate(), Err(ResultError::NoColumns));

        let columns = vec![Column::new("a", crate::column::ColumnType::String)];
        let empty = QueryResult::new(columns.clone(), Vec::new());
        assert_eq!(empty.validate(), Err(ResultError::NoRows));

        let ragged = QueryResult::new(columns, vec![vec![CellValue::text("x"), CellValue::Null]]);
        assert_eq!(
            ragged.validate(),
            Err(ResultError::RowLengthMismatch { row: 0, expected: 1, actual: 2 })
        );
    }

    #[test]
    fn invalid_json_is_an_error_not_a_panic() {
        assert!(matches!(
            QueryResult::from_json("{\"columns\": 5}"),
            Err(ResultError::InvalidJson(_))
        ));
    }
}
