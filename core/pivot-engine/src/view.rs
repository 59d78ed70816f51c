//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot View - Renderable output for the presentation layer.
//!
//! Column 0 of every pivot is the frozen category axis. Columns 1..N carry the
//! aggregated values, one per distinct legend value, year or series. Missing
//! cells are `CellValue::Null`, never zero.

use std::collections::BTreeMap;

use serde::Serialize;

use result_model::{CellValue, Column, Row};

/// Which algorithm produced a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PivotKind {
    /// Category x legend -> summed value.
    Generic,
    /// Month x year -> summed value.
    Calendar,
    /// Category -> one summed slot per series category.
    MultiSeries,
}

/// A derived cross-tabulation. Always rebuilt, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    pub kind: PivotKind,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,

    /// The source value each pivot column stands for (legend value, year or
    /// series label). `None` for the frozen category column.
    pub column_values: Vec<Option<CellValue>>,

    /// The source numeric column being aggregated.
    pub orig_column: Column,
    pub orig_column_index: usize,

    /// Source column behind the frozen category axis (the date column for
    /// calendar pivots).
    pub category_column_index: usize,
    pub legend_column_index: Option<usize>,

    /// year -> month -> first source date cell that landed in that bucket.
    /// Only populated for calendar pivots.
    pub original_column_data: BTreeMap<i32, BTreeMap<u32, CellValue>>,

    /// Source value columns summed into each pivot column (multi-series only;
    /// empty for column 0).
    pub series_slots: Vec<Vec<usize>>,

    /// Source rows that could not be placed (null axis or unparseable date).
    pub skipped_rows: usize,

    /// Non-null value cells that could not be read as numbers.
    pub uncoercible_values: usize,
}

impl PivotTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of value columns (excludes the frozen category column).
    pub fn value_column_count(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    pub fn row_label(&self, row: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.first())
    }

    /// Aggregated value at a pivot position. `None` for missing cells and for
    /// the category column.
    pub fn value_at(&self, row: usize, column: usize) -> Option<f64> {
        if column == 0 {
            return None;
        }
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(CellValue::as_number)
    }

    /// The year a calendar pivot column represents.
    pub fn year_of_column(&self, column: usize) -> Option<i32> {
        if self.kind != PivotKind::Calendar {
            return None;
        }
        self.column_values
            .get(column)?
            .as_ref()?
            .as_number()
            .map(|y| y as i32)
    }

    pub fn original_date(&self, year: i32, month: u32) -> Option<&CellValue> {
        self.original_column_data.get(&year)?.get(&month)
    }

    /// Per-column sums over present cells; `None` where a column has no cells.
    pub fn column_totals(&self) -> Vec<Option<f64>> {
        (1..self.columns.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col).and_then(CellValue::as_number))
                    .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))
            })
            .collect()
    }

    /// Sum of every present cell, or `None` for an all-empty pivot.
    pub fn grand_total(&self) -> Option<f64> {
        self.column_totals()
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))
    }
}
