//! FILENAME: core/filter-engine/src/tests.rs
//! PURPOSE: Consolidated unit tests for the filter crate.

use result_model::{CellValue, Column, ColumnType, DatePrecision, Row};

use crate::definition::{ColumnRef, FilterOperator, FilterOptions, FilterSpec, FilterValue};
use crate::engine::{apply_filters, resolve_column, FilterPlan};

fn sales_columns() -> Vec<Column> {
    let mut sales = Column::new("sales", ColumnType::DollarAmt);
    sales.id = Some("col-sales".to_string());
    let mut region = Column::new("region", ColumnType::String).groupable();
    region.display_name = "Sales Region".to_string();
    vec![
        region,
        sales,
        Column::new("order_date", ColumnType::DateString)
            .groupable()
            .with_precision(DatePrecision::Month),
    ]
}

fn sales_rows() -> Vec<Row> {
    vec![
        vec![CellValue::text("North"), CellValue::text("$1,200.00"), CellValue::text("2021-02-15")],
        vec![CellValue::text("South"), CellValue::text("$500.00"), CellValue::text("2021-04-01")],
        vec![CellValue::text("Northwest"), CellValue::Number(900.0), CellValue::Null],
        vec![CellValue::Null, CellValue::text("n/a"), CellValue::text("2020-12-31")],
    ]
}

fn opts() -> FilterOptions {
    FilterOptions::default()
}

// ========================================
// COLUMN RESOLUTION
// ========================================

#[test]
fn test_resolves_by_id_name_label_and_field() {
    let columns = sales_columns();
    assert_eq!(resolve_column(&columns, &ColumnRef::from("col-sales")).map(|r| r.0), Some(1));
    assert_eq!(resolve_column(&columns, &ColumnRef::from("order_date")).map(|r| r.0), Some(2));
    assert_eq!(resolve_column(&columns, &ColumnRef::from("sales region")).map(|r| r.0), Some(0));
    assert_eq!(resolve_column(&columns, &ColumnRef::from("2")).map(|r| r.0), Some(2));
    assert_eq!(resolve_column(&columns, &ColumnRef::Index(1)).map(|r| r.0), Some(1));
    assert!(resolve_column(&columns, &ColumnRef::from("profit")).is_none());
    assert!(resolve_column(&columns, &ColumnRef::Index(9)).is_none());
}

// ========================================
// NUMERIC FILTERS
// ========================================

#[test]
fn test_relational_prefix_overrides_operator() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![FilterSpec::new("sales", FilterOperator::Equals, ">=1000")];
    let out = apply_filters(&columns, &rows[..2], &filters, &opts());
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0][0], CellValue::text("North"));
}

#[test]
fn test_numeric_quick_filter_strips_formatting_on_both_sides() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![FilterSpec::quick("sales", "< $1,000")];
    let out = apply_filters(&columns, &rows, &filters, &opts());
    let regions: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
    assert_eq!(regions, vec![CellValue::text("South"), CellValue::text("Northwest")]);
    // "n/a" could not be read as a number
    assert_eq!(out.diagnostics.len(), 1);
}

#[test]
fn test_numeric_between_accepts_pairs_and_separator_strings() {
    let columns = sales_columns();
    let rows = sales_rows();
    let pair = FilterSpec::new("sales", FilterOperator::Between, FilterValue::range("800", "1000"));
    let joined = FilterSpec::new("sales", FilterOperator::Between, "1000 to 800");
    for filter in [pair, joined] {
        let out = apply_filters(&columns, &rows, &[filter], &opts());
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0][1], CellValue::Number(900.0));
    }
}

// ========================================
// DATE FILTERS
// ========================================

#[test]
fn test_month_precision_between_expands_bucket_bounds() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![FilterSpec::new("order_date", FilterOperator::Between, "Jan 2021 to Mar 2021")];
    let out = apply_filters(&columns, &rows, &filters, &opts());
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0][2], CellValue::text("2021-02-15"));
}

#[test]
fn test_date_equality_matches_whole_bucket() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![FilterSpec::new("order_date", FilterOperator::Equals, "2021-02-01")];
    let out = apply_filters(&columns, &rows, &filters, &opts());
    assert_eq!(out.rows.len(), 1);

    let after = vec![FilterSpec::new("order_date", FilterOperator::GreaterThan, "Feb 2021")];
    let out = apply_filters(&columns, &rows, &after, &opts());
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0][2], CellValue::text("2021-04-01"));
}

#[test]
fn test_epoch_date_columns_compare_by_instant() {
    let columns = vec![Column::new("created", ColumnType::Date).with_precision(DatePrecision::Year)];
    let rows: Vec<Row> = vec![
        vec![CellValue::Number(1_613_347_200.0)], // 2021-02-15
        vec![CellValue::Number(1_577_836_800.0)], // 2020-01-01
    ];
    let filters = vec![FilterSpec::new("created", FilterOperator::Equals, "2021")];
    let out = apply_filters(&columns, &rows, &filters, &opts());
    assert_eq!(out.rows, vec![rows[0].clone()]);
}

// ========================================
// NULL SENTINELS & STRINGS
// ========================================

#[test]
fn test_is_null_bypasses_type_coercion() {
    let columns = sales_columns();
    let rows = sales_rows();
    let nulls = vec![FilterSpec::new("order_date", FilterOperator::Is, "NULL")];
    assert_eq!(apply_filters(&columns, &rows, &nulls, &opts()).rows.len(), 1);

    let not_nulls = vec![FilterSpec::new("region", FilterOperator::Is, "not null")];
    assert_eq!(apply_filters(&columns, &rows, &not_nulls, &opts()).rows.len(), 3);
}

#[test]
fn test_strings_default_to_case_insensitive_containment() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![FilterSpec::quick("region", "NORTH")];
    let out = apply_filters(&columns, &rows, &filters, &opts());
    assert_eq!(out.rows.len(), 2);

    let exact = vec![FilterSpec::new("region", FilterOperator::Equals, "north")];
    assert_eq!(apply_filters(&columns, &rows, &exact, &opts()).rows.len(), 1);
}

// ========================================
// BATCH POLICY
// ========================================

#[test]
fn test_unknown_column_policy_is_batch_wide() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![
        FilterSpec::quick("region", "north"),
        FilterSpec::quick("profit", "> 5"),
    ];

    let skipped = apply_filters(&columns, &rows, &filters, &opts());
    assert_eq!(skipped.rows.len(), 2);
    assert_eq!(skipped.diagnostics.len(), 1);

    let strict = FilterOptions {
        fail_on_unknown_column: true,
        ..FilterOptions::default()
    };
    let excluded = apply_filters(&columns, &rows, &filters, &strict);
    assert!(excluded.rows.is_empty());
    assert!(FilterPlan::compile(&columns, &filters, &strict).reject_all);
}

#[test]
fn test_filters_are_idempotent() {
    let columns = sales_columns();
    let rows = sales_rows();
    let filters = vec![
        FilterSpec::quick("sales", ">=500"),
        FilterSpec::new("order_date", FilterOperator::Between, FilterValue::range("2020-01", "2021-12")),
    ];
    let once = apply_filters(&columns, &rows, &filters, &opts()).rows;
    let twice = apply_filters(&columns, &once, &filters, &opts()).rows;
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
}

#[test]
fn test_deserializes_heterogeneous_descriptors() {
    let filters: Vec<FilterSpec> = serde_json::from_str(
        r#"[
            {"columnRef": "sales", "operator": "gte", "value": 1000},
            {"id": 2, "operator": "between", "value": ["Jan 2021", "Mar 2021"]},
            {"name": "region", "value": "north"}
        ]"#,
    )
    .unwrap();
    assert_eq!(filters[0].operator, Some(FilterOperator::GreaterThanOrEqual));
    assert_eq!(filters[0].value, FilterValue::Single("1000".to_string()));
    assert_eq!(filters[1].column_ref, ColumnRef::Index(2));
    assert_eq!(filters[1].value, FilterValue::range("Jan 2021", "Mar 2021"));
    assert_eq!(filters[2].operator, None);

    let bad: Result<FilterSpec, _> =
        serde_json::from_str(r#"{"columnRef": "sales", "operator": "approximately", "value": "1"}"#);
    assert!(bad.is_err());
}

#[test]
fn test_range_separator_is_found_case_insensitively() {
    let value = FilterValue::Single("Jan 2021 TO Mar 2021".to_string());
    assert_eq!(
        value.split_range(" to "),
        Some(("Jan 2021".to_string(), "Mar 2021".to_string()))
    );

    // Lowercasing "İ" changes its byte length; the split must not shift.
    let dotted = FilterValue::Single("İstanbul to İzmir".to_string());
    assert_eq!(
        dotted.split_range(" to "),
        Some(("İstanbul".to_string(), "İzmir".to_string()))
    );

    assert_eq!(FilterValue::Single("a+b".to_string()).split_range("+"), Some(("a".to_string(), "b".to_string())));
    assert_eq!(FilterValue::Single("to Mar 2021".to_string()).split_range(" to "), None);
    assert_eq!(FilterValue::Single("2021".to_string()).split_range(""), None);
}
