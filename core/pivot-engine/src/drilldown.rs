//! FILENAME: core/pivot-engine/src/drilldown.rs
//! Drilldown - maps a clicked cell or chart datum back to query dimensions.
//!
//! The result is expressed in the original (pre-pivot) query terms: each
//! dimension names a source column and the value the clicked slice has in it.
//! When every dimension is a groupable column the request can be sent to the
//! query service; otherwise a local row predicate over the flat table is
//! returned instead.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use result_model::date::year_month;
use result_model::{cell_to_datetime, log_debug, CellValue, Column, DateRepr, Row};

use crate::error::DrilldownError;
use crate::table::FlatTable;
use crate::view::{PivotKind, PivotTable};

/// What the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrilldownTarget {
    /// A cell of the flat table.
    TableCell { row: usize, column: usize },
    /// A cell of the pivot table (column 0 is the frozen category column).
    PivotCell { row: usize, column: usize },
    /// A chart point. `series` indexes the pivot's value columns when the
    /// chart is pivot-backed, otherwise the primary value column list.
    ChartDatum { row: usize, series: usize },
}

/// One `(dimension, value)` pair of a drilldown request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub name: String,
    pub value: CellValue,
}

/// Follow-up query descriptor for the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownRequest {
    pub group_bys: SmallVec<[GroupBy; 4]>,
    pub supported_by_api: bool,
}

/// A single column condition of a local drilldown filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RowCondition {
    /// Same value, compared loosely.
    Equals { column_index: usize, value: CellValue },
    /// Any date falling in the calendar month.
    InMonth {
        column_index: usize,
        year: i32,
        month: u32,
        repr: DateRepr,
    },
}

impl RowCondition {
    pub fn column_index(&self) -> usize {
        match self {
            RowCondition::Equals { column_index, .. } | RowCondition::InMonth { column_index, .. } => *column_index,
        }
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            RowCondition::Equals { value, .. } => cell.loosely_equals(value),
            RowCondition::InMonth { year, month, repr, .. } => {
                cell_to_datetime(cell, *repr).map(year_month) == Some((*year, *month))
            }
        }
    }
}

/// Row match over the flat table, used when the query service cannot serve
/// the drilldown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowPredicate {
    pub conditions: Vec<RowCondition>,
}

impl RowPredicate {
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|condition| {
            row.get(condition.column_index())
                .map_or(false, |cell| condition.matches(cell))
        })
    }

    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// The outcome of a drilldown: the request, plus the local fallback when the
/// request cannot be served remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrilldownResolution {
    pub request: DrilldownRequest,
    pub local_filter: Option<RowPredicate>,
}

/// One source column of the clicked slice. `month` is set when the slice is
/// a calendar bucket and `value` is only its representative date.
#[derive(Debug, Clone)]
struct Dimension {
    column_index: usize,
    value: CellValue,
    month: Option<(i32, u32)>,
}

impl Dimension {
    fn exact(column_index: usize, value: CellValue) -> Self {
        Dimension {
            column_index,
            value,
            month: None,
        }
    }
}

type Dimensions = SmallVec<[Dimension; 4]>;

/// Resolves a drilldown target against the flat table and, for pivot cells,
/// the pivot it was taken from.
pub fn drilldown(
    table: &FlatTable,
    pivot: Option<&PivotTable>,
    target: DrilldownTarget,
) -> Result<DrilldownResolution, DrilldownError> {
    let dims = match target {
        DrilldownTarget::TableCell { row, column } => table_cell_dimensions(table, row, column)?,
        DrilldownTarget::PivotCell { row, column } => {
            let pivot = pivot.ok_or(DrilldownError::NotDrillable)?;
            pivot_cell_dimensions(pivot, row, column)?
        }
        DrilldownTarget::ChartDatum { row, series } => match pivot {
            Some(pivot) => {
                let column = series
                    .checked_add(1)
                    .ok_or(DrilldownError::ColumnOutOfRange(series))?;
                pivot_cell_dimensions(pivot, row, column)?
            }
            None => {
                let axis = &table.axis_config;
                let column = axis
                    .number_column_indices
                    .get(series)
                    .copied()
                    .or(axis.number_column_index)
                    .ok_or(DrilldownError::ColumnOutOfRange(series))?;
                table_cell_dimensions(table, row, column)?
            }
        },
    };

    if dims.is_empty() {
        return Err(DrilldownError::NotDrillable);
    }
    Ok(resolve(&table.columns, dims))
}

fn table_cell_dimensions(table: &FlatTable, row: usize, column: usize) -> Result<Dimensions, DrilldownError> {
    let cells = table.rows.get(row).ok_or(DrilldownError::RowOutOfRange(row))?;
    let clicked = table
        .columns
        .get(column)
        .ok_or(DrilldownError::ColumnOutOfRange(column))?;

    let mut dims = Dimensions::new();
    let mut push = |index: usize| {
        if let Some(cell) = cells.get(index) {
            if !dims.iter().any(|dim| dim.column_index == index) {
                dims.push(Dimension::exact(index, cell.clone()));
            }
        }
    };

    if let Some(category) = table.axis_config.string_column_index {
        push(category);
    }
    if let Some(legend) = table.axis_config.legend_column_index {
        push(legend);
    }
    if clicked.is_axis_candidate() {
        push(column);
    }
    Ok(dims)
}

fn pivot_cell_dimensions(pivot: &PivotTable, row: usize, column: usize) -> Result<Dimensions, DrilldownError> {
    let label = pivot.row_label(row).ok_or(DrilldownError::RowOutOfRange(row))?;
    if column >= pivot.columns.len() {
        return Err(DrilldownError::ColumnOutOfRange(column));
    }
    if column == 0 {
        return Err(DrilldownError::NotDrillable);
    }

    let mut dims = Dimensions::new();
    match pivot.kind {
        PivotKind::Generic => {
            let legend_value = pivot
                .column_values
                .get(column)
                .cloned()
                .flatten()
                .ok_or(DrilldownError::NotDrillable)?;
            let legend = pivot.legend_column_index.ok_or(DrilldownError::NotDrillable)?;
            dims.push(Dimension::exact(pivot.category_column_index, label.clone()));
            dims.push(Dimension::exact(legend, legend_value));
        }
        PivotKind::Calendar => {
            let year = pivot
                .year_of_column(column)
                .ok_or(DrilldownError::UnknownYear(column))?;
            let month = row as u32 + 1;
            let original = pivot
                .original_date(year, month)
                .ok_or(DrilldownError::EmptyBucket { year, month })?;
            log_debug!("DRILLDOWN", "calendar cell {}/{} maps to {:?}", month, year, original);
            dims.push(Dimension {
                column_index: pivot.category_column_index,
                value: original.clone(),
                month: Some((year, month)),
            });
        }
        PivotKind::MultiSeries => {
            dims.push(Dimension::exact(pivot.category_column_index, label.clone()));
        }
    }
    Ok(dims)
}

fn resolve(columns: &[Column], dims: Dimensions) -> DrilldownResolution {
    let supported_by_api = dims
        .iter()
        .all(|dim| columns.get(dim.column_index).map_or(false, |c| c.groupable));

    let group_bys = dims
        .iter()
        .map(|dim| GroupBy {
            name: columns
                .get(dim.column_index)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            value: dim.value.clone(),
        })
        .collect();

    let local_filter = if supported_by_api {
        None
    } else {
        log_debug!("DRILLDOWN", "dimensions not groupable, using local row filter");
        Some(RowPredicate {
            conditions: dims
                .into_iter()
                .map(|dim| {
                    let repr = columns.get(dim.column_index).and_then(Column::date_repr);
                    match (dim.month, repr) {
                        (Some((year, month)), Some(repr)) => RowCondition::InMonth {
                            column_index: dim.column_index,
                            year,
                            month,
                            repr,
                        },
                        _ => RowCondition::Equals {
                            column_index: dim.column_index,
                            value: dim.value,
                        },
                    }
                })
                .collect(),
        })
    };

    DrilldownResolution {
        request: DrilldownRequest {
            group_bys,
            supported_by_api,
        },
        local_filter,
    }
}
