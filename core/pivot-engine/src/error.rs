//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    #[error("no category axis is configured")]
    MissingCategoryAxis,

    #[error("no legend axis is configured")]
    MissingLegendAxis,

    #[error("no value axis is configured")]
    MissingNumberAxis,

    #[error("column {0} is out of bounds")]
    IndexOutOfBounds(usize),

    #[error("column '{0}' is not a date column")]
    DateColumnExpected(String),

    #[error("the column combination does not support a pivot table")]
    UnsupportedShape,

    #[error("pivot would have {actual} {axis}, limit is {limit}")]
    TooManyRows {
        axis: &'static str,
        actual: usize,
        limit: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrilldownError {
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),

    #[error("column {0} is out of range")]
    ColumnOutOfRange(usize),

    #[error("the selected cell does not identify a drillable slice")]
    NotDrillable,

    #[error("no source row contributed to {month}/{year}")]
    EmptyBucket { year: i32, month: u32 },

    #[error("pivot column {0} does not carry a year")]
    UnknownYear(usize),
}
