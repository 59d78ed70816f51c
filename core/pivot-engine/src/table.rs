//! FILENAME: core/pivot-engine/src/table.rs
//! Table assembly - the flat, filtered, sorted row set.
//!
//! The assembled table is the single upstream input for direct table
//! rendering and for the pivot engine.

use serde::Serialize;

use result_model::{
    log_debug, sort_rows_by_column, AxisConfig, Column, QueryResult, ResultError, Row, SortDirection,
};

use crate::axis::{select_axes, AxisHints};

/// The table as handed to the presentation layer and the pivot engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub axis_config: AxisConfig,
    /// Rows removed because their category cell was null.
    pub dropped_null_rows: usize,
}

impl FlatTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn category_column(&self) -> Option<&Column> {
        self.axis_config
            .string_column_index
            .and_then(|i| self.columns.get(i))
    }
}

/// Assembles the flat table for a query result.
///
/// `axis_config` is reused when it is still valid for the result's columns;
/// otherwise axes are selected afresh, honouring the result's previous
/// configuration and default amount column.
pub fn assemble_table(
    result: &QueryResult,
    axis_config: Option<&AxisConfig>,
    direction: SortDirection,
) -> Result<FlatTable, ResultError> {
    result.validate()?;

    let axis_config = match axis_config.filter(|config| config.is_valid_for(&result.columns)) {
        Some(config) => config.clone(),
        None => {
            let hints = AxisHints {
                preferred: result.previous_axis_config.as_ref(),
                excluded: &[],
                default_amount_column: result.default_amount_column,
            };
            select_axes(&result.columns, &result.rows, &hints)
        }
    };

    let mut rows = result.rows.clone();
    let mut dropped_null_rows = 0;

    if let Some(category) = axis_config.string_column_index {
        let before = rows.len();
        rows.retain(|row| row.get(category).map_or(false, |cell| !cell.is_null()));
        dropped_null_rows = before - rows.len();

        if result.columns[category].is_date_kind() {
            sort_rows_by_column(&mut rows, category, direction);
            log_debug!("TABLE", "sorted {} rows by date column {}", rows.len(), category);
        }
    }

    log_debug!(
        "TABLE",
        "assembled {} rows ({} dropped with null category)",
        rows.len(),
        dropped_null_rows
    );

    Ok(FlatTable {
        columns: result.columns.clone(),
        rows,
        axis_config,
        dropped_null_rows,
    })
}
