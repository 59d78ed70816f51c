//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for pipeline integration tests.

#![allow(dead_code)]

use pivot_engine::{transform, PipelineOptions, TransformOutcome, Visualization};
use filter_engine::FilterSpec;
use result_model::{CellValue, Column, ColumnType, QueryResult, Row};

// ============================================================================
// FIXTURES
// ============================================================================

pub struct SalesFixture;

impl SalesFixture {
    pub fn columns() -> Vec<Column> {
        vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("product", ColumnType::String).groupable(),
            Column::new("sales", ColumnType::DollarAmt),
            Column::new("quantity", ColumnType::Quantity),
        ]
    }

    pub fn data() -> Vec<(&'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", 10000.0, 100.0),
            ("North", "Gadget", 8000.0, 80.0),
            ("North", "Gizmo", 500.0, 5.0),
            ("South", "Widget", 15000.0, 150.0),
            ("South", "Gadget", 11000.0, 110.0),
            ("South", "Doohickey", 1200.0, 12.0),
            ("North", "Widget", 2000.0, 20.0),
            ("South", "Sprocket", 700.0, 7.0),
        ]
    }

    pub fn result() -> QueryResult {
        let rows = Self::data()
            .into_iter()
            .map(|(region, product, sales, quantity)| {
                vec![
                    CellValue::text(region),
                    CellValue::text(product),
                    CellValue::Number(sales),
                    CellValue::Number(quantity),
                ]
            })
            .collect();
        QueryResult::new(Self::columns(), rows)
    }
}

/// Two-column monthly time series as calendar text.
pub struct MonthlyFixture;

impl MonthlyFixture {
    pub fn result() -> QueryResult {
        let rows: Vec<Row> = [
            ("2021-02-15", 5.0),
            ("2021-02-20", 1.5),
            ("2021-04-01", 3.0),
            ("2020-11-30", 9.0),
            ("2022-01-05", 4.0),
        ]
        .iter()
        .map(|(date, value)| vec![CellValue::text(*date), CellValue::Number(*value)])
        .collect();
        QueryResult::new(
            vec![
                Column::new("order_date", ColumnType::DateString).groupable(),
                Column::new("sales", ColumnType::DollarAmt),
            ],
            rows,
        )
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn render(result: &QueryResult, filters: &[FilterSpec]) -> Visualization {
    render_with(result, filters, &PipelineOptions::default())
}

pub fn render_with(result: &QueryResult, filters: &[FilterSpec], options: &PipelineOptions) -> Visualization {
    match transform(result, filters, options) {
        TransformOutcome::Rendered(visualization) => visualization,
        TransformOutcome::NoData { reason } => panic!("expected a visualization, got no data: {}", reason),
    }
}

/// Assert that a pivot cell holds an expected number.
pub fn assert_pivot_number(visualization: &Visualization, row: usize, col: usize, expected: f64) {
    let pivot = visualization.pivot_table.as_ref().expect("pivot table");
    match pivot.value_at(row, col) {
        Some(actual) => assert!(
            (actual - expected).abs() < 1e-9,
            "pivot[{}][{}]: expected {}, got {}",
            row,
            col,
            expected,
            actual
        ),
        None => panic!("pivot[{}][{}]: expected {}, got empty", row, col, expected),
    }
}

pub fn assert_pivot_empty(visualization: &Visualization, row: usize, col: usize) {
    let pivot = visualization.pivot_table.as_ref().expect("pivot table");
    assert_eq!(pivot.rows[row][col], CellValue::Null, "pivot[{}][{}] should be empty", row, col);
}
