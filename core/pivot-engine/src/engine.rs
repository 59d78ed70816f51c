//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns the flat table into a pivot.
//!
//! This module takes a FlatTable (rows plus resolved axes) and PivotOptions
//! and produces a PivotTable ready for rendering.
//!
//! Algorithm, by column shape:
//! 1. Calendar: exactly one date column and one number column. Rows are
//!    bucketed by (year, month); twelve month rows, one column per year.
//! 2. Multi-series: two or more series-tagged number columns. Rows are grouped
//!    by category and each series is summed into its own slot.
//! 3. Generic: category x legend. One row per distinct category, one column
//!    per distinct legend value, in order of first occurrence.
//!
//! Cells with no contributing row stay empty; an aggregated zero is a value.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use result_model::date::year_month;
use result_model::{
    cell_to_datetime, compare_dates, log_debug, log_warn, month_label, CellValue, Column, ColumnType, Row,
    SortDirection,
};

use crate::cache::{DistinctValues, ValueId};
use crate::definition::PivotOptions;
use crate::error::PivotError;
use crate::table::FlatTable;
use crate::view::{PivotKind, PivotTable};

// ============================================================================
// SHAPE DETECTION
// ============================================================================

/// Returns (date column, number column) when the columns form a two-column
/// time series.
pub fn calendar_shape(columns: &[Column]) -> Option<(usize, usize)> {
    if columns.len() != 2 {
        return None;
    }
    match (columns[0].is_date_kind(), columns[1].is_date_kind()) {
        (true, false) if columns[1].is_number_kind() => Some((0, 1)),
        (false, true) if columns[0].is_number_kind() => Some((1, 0)),
        _ => None,
    }
}

/// Summable number columns that carry a series category, in column order.
pub fn series_columns(columns: &[Column]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_summable() && c.series_category.is_some())
        .map(|(i, _)| i)
        .collect()
}

/// Whether any pivot algorithm applies to the table's shape.
pub fn supports_pivot(table: &FlatTable) -> bool {
    calendar_shape(&table.columns).is_some()
        || (table.axis_config.has_category() && series_columns(&table.columns).len() >= 2)
        || (table.axis_config.has_category() && table.axis_config.has_legend())
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// Builds one pivot from one flat table.
pub struct PivotCalculator<'a> {
    table: &'a FlatTable,
    options: PivotOptions,
    skipped_rows: usize,
    uncoercible_values: usize,
}

impl<'a> PivotCalculator<'a> {
    pub fn new(table: &'a FlatTable, options: PivotOptions) -> Self {
        PivotCalculator {
            table,
            options,
            skipped_rows: 0,
            uncoercible_values: 0,
        }
    }

    /// Picks the algorithm for the table's shape and runs it.
    pub fn calculate(&mut self) -> Result<PivotTable, PivotError> {
        self.skipped_rows = 0;
        self.uncoercible_values = 0;

        let pivot = if let Some((date, number)) = calendar_shape(&self.table.columns) {
            self.calendar(date, number)?
        } else if self.table.axis_config.has_category() && series_columns(&self.table.columns).len() >= 2 {
            self.multi_series()?
        } else if self.table.axis_config.has_legend() {
            self.generic()?
        } else {
            return Err(PivotError::UnsupportedShape);
        };

        if pivot.skipped_rows > 0 {
            log_warn!(
                "PIVOT",
                "{} source rows could not be placed in the {:?} pivot",
                pivot.skipped_rows,
                pivot.kind
            );
        }
        if pivot.uncoercible_values > 0 {
            log_warn!(
                "PIVOT",
                "{} value cells were not numeric and were left out of the {:?} pivot",
                pivot.uncoercible_values,
                pivot.kind
            );
        }
        log_debug!(
            "PIVOT",
            "built {:?} pivot: {} rows x {} value columns",
            pivot.kind,
            pivot.row_count(),
            pivot.value_column_count()
        );
        Ok(pivot)
    }

    fn column(&self, index: usize) -> Result<&'a Column, PivotError> {
        self.table
            .columns
            .get(index)
            .ok_or(PivotError::IndexOutOfBounds(index))
    }

    /// Reads a value cell. Nulls do not contribute; unparseable text is a
    /// coercion failure, counted and left out.
    fn numeric(&mut self, cell: Option<&CellValue>) -> Option<f64> {
        let cell = cell?;
        if cell.is_null() {
            return None;
        }
        let value = cell.as_formatted_number();
        if value.is_none() {
            self.uncoercible_values += 1;
            log_debug!("PIVOT", "value {:?} is not numeric, treated as empty", cell);
        }
        value
    }

    fn check_limit(axis: &'static str, actual: usize, limit: usize) -> Result<(), PivotError> {
        if actual > limit {
            Err(PivotError::TooManyRows { axis, actual, limit })
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // GENERIC
    // ------------------------------------------------------------------------

    fn generic(&mut self) -> Result<PivotTable, PivotError> {
        let table = self.table;
        let axis = &table.axis_config;
        let category = axis.string_column_index.ok_or(PivotError::MissingCategoryAxis)?;
        let legend = axis.legend_column_index.ok_or(PivotError::MissingLegendAxis)?;
        let value = axis.number_column_index.ok_or(PivotError::MissingNumberAxis)?;

        let category_column = self.column(category)?;
        self.column(legend)?;
        let value_column = self.column(value)?;

        let mut categories = DistinctValues::new();
        let mut legends = DistinctValues::new();
        let mut sums: FxHashMap<(ValueId, ValueId), f64> = FxHashMap::default();

        for row in &table.rows {
            let (cat_cell, leg_cell) = match (row.get(category), row.get(legend)) {
                (Some(c), Some(l)) if !c.is_null() && !l.is_null() => (c, l),
                _ => {
                    self.skipped_rows += 1;
                    continue;
                }
            };

            let cat_id = categories.intern(cat_cell);
            let leg_id = legends.intern(leg_cell);
            Self::check_limit("rows", categories.len(), self.options.max_pivot_rows)?;
            Self::check_limit("columns", legends.len(), self.options.max_pivot_columns)?;

            if let Some(v) = self.numeric(row.get(value)) {
                *sums.entry((cat_id, leg_id)).or_insert(0.0) += v;
            }
        }

        let legend_values = legends.into_values();
        let mut columns = Vec::with_capacity(legend_values.len() + 1);
        let mut column_values = Vec::with_capacity(legend_values.len() + 1);
        columns.push(category_column.clone());
        column_values.push(None);
        for legend_value in &legend_values {
            columns.push(value_column_for(&legend_value.display_value(), value_column));
            column_values.push(Some(legend_value.clone()));
        }

        let rows = categories
            .values()
            .iter()
            .enumerate()
            .map(|(cat_id, cat_value)| {
                let mut row = Vec::with_capacity(legend_values.len() + 1);
                row.push(cat_value.clone());
                row.extend((0..legend_values.len()).map(|leg_id| {
                    sums.get(&(cat_id, leg_id))
                        .map_or(CellValue::Null, |&v| CellValue::Number(v))
                }));
                row
            })
            .collect();

        Ok(PivotTable {
            kind: PivotKind::Generic,
            columns,
            rows,
            column_values,
            orig_column: value_column.clone(),
            orig_column_index: value,
            category_column_index: category,
            legend_column_index: Some(legend),
            original_column_data: BTreeMap::new(),
            series_slots: Vec::new(),
            skipped_rows: self.skipped_rows,
            uncoercible_values: self.uncoercible_values,
        })
    }

    // ------------------------------------------------------------------------
    // CALENDAR
    // ------------------------------------------------------------------------

    fn calendar(&mut self, date: usize, number: usize) -> Result<PivotTable, PivotError> {
        let table = self.table;
        let date_column = self.column(date)?;
        let value_column = self.column(number)?;
        let repr = date_column
            .date_repr()
            .ok_or_else(|| PivotError::DateColumnExpected(date_column.name.clone()))?;

        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut sums: FxHashMap<(i32, u32), f64> = FxHashMap::default();
        let mut original_column_data: BTreeMap<i32, BTreeMap<u32, CellValue>> = BTreeMap::new();

        for row in &table.rows {
            let Some(cell) = row.get(date) else {
                self.skipped_rows += 1;
                continue;
            };
            let Some(instant) = cell_to_datetime(cell, repr) else {
                self.skipped_rows += 1;
                continue;
            };
            let (year, month) = year_month(instant);

            // The year gets a column even when its values are empty.
            years.insert(year);
            Self::check_limit("columns", years.len(), self.options.max_pivot_columns)?;
            // Keep the earliest source cell of each bucket so the mapping does
            // not depend on the table's sort direction.
            let bucket = original_column_data.entry(year).or_default();
            match bucket.get(&month) {
                Some(existing) if compare_dates(cell, existing, SortDirection::Ascending) != Ordering::Less => {}
                _ => {
                    bucket.insert(month, cell.clone());
                }
            }

            if let Some(v) = self.numeric(row.get(number)) {
                *sums.entry((year, month)).or_insert(0.0) += v;
            }
        }

        let mut columns = Vec::with_capacity(years.len() + 1);
        let mut column_values = Vec::with_capacity(years.len() + 1);
        columns.push(Column::new("Month", ColumnType::String));
        column_values.push(None);
        for year in &years {
            columns.push(value_column_for(&year.to_string(), value_column));
            column_values.push(Some(CellValue::Number(*year as f64)));
        }

        let rows = (1..=12u32)
            .map(|month| {
                let label = month_label(month, self.options.month_label_style).unwrap_or_default();
                let mut row: Row = Vec::with_capacity(years.len() + 1);
                row.push(CellValue::text(label));
                row.extend(years.iter().map(|year| {
                    sums.get(&(*year, month))
                        .map_or(CellValue::Null, |&v| CellValue::Number(v))
                }));
                row
            })
            .collect();

        Ok(PivotTable {
            kind: PivotKind::Calendar,
            columns,
            rows,
            column_values,
            orig_column: value_column.clone(),
            orig_column_index: number,
            category_column_index: date,
            legend_column_index: None,
            original_column_data,
            series_slots: Vec::new(),
            skipped_rows: self.skipped_rows,
            uncoercible_values: self.uncoercible_values,
        })
    }

    // ------------------------------------------------------------------------
    // MULTI-SERIES
    // ------------------------------------------------------------------------

    fn multi_series(&mut self) -> Result<PivotTable, PivotError> {
        let table = self.table;
        let category = table
            .axis_config
            .string_column_index
            .ok_or(PivotError::MissingCategoryAxis)?;
        let category_column = self.column(category)?;

        // Series labels in first-occurrence order; columns sharing a label
        // share a slot.
        let mut slots: Vec<(String, Vec<usize>)> = Vec::new();
        for index in series_columns(&table.columns) {
            let label = table.columns[index]
                .series_category
                .clone()
                .unwrap_or_default();
            match slots.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, members)) => members.push(index),
                None => slots.push((label, vec![index])),
            }
        }
        let first_series = slots
            .first()
            .and_then(|(_, members)| members.first().copied())
            .ok_or(PivotError::MissingNumberAxis)?;
        let orig_column_index = table
            .axis_config
            .number_column_index
            .filter(|i| slots.iter().any(|(_, members)| members.contains(i)))
            .unwrap_or(first_series);

        let mut categories = DistinctValues::new();
        let mut grid: Vec<Vec<Option<f64>>> = Vec::new();

        for row in &table.rows {
            let cat_cell = match row.get(category) {
                Some(c) if !c.is_null() => c,
                _ => {
                    self.skipped_rows += 1;
                    continue;
                }
            };
            let cat_id = categories.intern(cat_cell);
            Self::check_limit("rows", categories.len(), self.options.max_pivot_rows)?;
            if cat_id == grid.len() {
                grid.push(vec![None; slots.len()]);
            }

            for (slot, (_, members)) in slots.iter().enumerate() {
                for &member in members {
                    if let Some(v) = self.numeric(row.get(member)) {
                        let cell = &mut grid[cat_id][slot];
                        *cell = Some(cell.unwrap_or(0.0) + v);
                    }
                }
            }
        }

        let mut columns = Vec::with_capacity(slots.len() + 1);
        let mut column_values = Vec::with_capacity(slots.len() + 1);
        let mut series_slots = Vec::with_capacity(slots.len() + 1);
        columns.push(category_column.clone());
        column_values.push(None);
        series_slots.push(Vec::new());
        for (label, members) in &slots {
            let source = &table.columns[members[0]];
            columns.push(value_column_for(label, source).with_series(label.clone()));
            column_values.push(Some(CellValue::text(label.clone())));
            series_slots.push(members.clone());
        }

        let rows = categories
            .values()
            .iter()
            .zip(grid)
            .map(|(cat_value, cells)| {
                let mut row = Vec::with_capacity(cells.len() + 1);
                row.push(cat_value.clone());
                row.extend(cells.into_iter().map(|c| c.map_or(CellValue::Null, CellValue::Number)));
                row
            })
            .collect();

        Ok(PivotTable {
            kind: PivotKind::MultiSeries,
            columns,
            rows,
            column_values,
            orig_column: table.columns[orig_column_index].clone(),
            orig_column_index,
            category_column_index: category,
            legend_column_index: None,
            original_column_data: BTreeMap::new(),
            series_slots,
            skipped_rows: self.skipped_rows,
            uncoercible_values: self.uncoercible_values,
        })
    }
}

/// A pivot value column labelled `label`, typed like the aggregated source.
fn value_column_for(label: &str, source: &Column) -> Column {
    let mut column = Column::new(label, source.column_type.clone());
    column.display_name = label.to_string();
    column.summable = source.summable;
    column
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds the pivot for a flat table. The caller decides the fallback when
/// this fails; the flat table itself is never affected.
pub fn build_pivot(table: &FlatTable, options: PivotOptions) -> Result<PivotTable, PivotError> {
    PivotCalculator::new(table, options).calculate()
}
