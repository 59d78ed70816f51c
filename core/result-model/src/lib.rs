//! FILENAME: core/result-model/src/lib.rs
//! PURPOSE: Shared value types for the query-result visualization core.
//! CONTEXT: Re-exports public types and modules for use by the filter and
//! pivot crates. Nothing in this crate performs I/O.

#[macro_use]
pub mod logging;

pub mod axis;
pub mod cell;
pub mod column;
pub mod date;
pub mod error;
pub mod result;
pub mod sort;
pub mod text;

// Re-export commonly used types at the crate root
pub use axis::AxisConfig;
pub use cell::{parse_formatted_number, CellValue, Row};
pub use column::{classify_columns, Column, ColumnKind, ColumnType, DatePrecision, DateRepr, NumberKind};
pub use date::{cell_to_datetime, end_of, month_label, start_of, MonthLabelStyle};
pub use error::{Diagnostic, ResultError, Stage};
pub use result::QueryResult;
pub use sort::{compare_dates, compare_dates_desc, sort_rows_by_column, DateSortKey, SortDirection};
pub use text::{normalize_label, to_title_case};
