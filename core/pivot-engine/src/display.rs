//! FILENAME: core/pivot-engine/src/display.rs
//! Display kinds supported by a given column combination.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use result_model::{log_debug, AxisConfig, Column, Row};

use crate::axis::value_candidates;
use crate::cache::distinct_count;
use crate::definition::PipelineOptions;
use crate::view::PivotTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    Table,
    PivotTable,
    SingleValue,
    Bar,
    Column,
    Line,
    Pie,
    StackedBar,
    StackedColumn,
    StackedLine,
    Heatmap,
    Bubble,
    ColumnLine,
    Scatterplot,
    Histogram,
}

impl DisplayKind {
    /// Table-like kinds that stay available for any row count.
    pub fn is_tabular(self) -> bool {
        matches!(self, DisplayKind::Table | DisplayKind::PivotTable | DisplayKind::SingleValue)
    }

    pub fn is_chart(self) -> bool {
        !self.is_tabular()
    }
}

/// Every display kind the current columns, axes and pivot can render.
pub fn supported_display_kinds(
    columns: &[Column],
    rows: &[Row],
    axis: &AxisConfig,
    pivot: Option<&PivotTable>,
    options: &PipelineOptions,
) -> BTreeSet<DisplayKind> {
    let mut kinds = BTreeSet::new();
    kinds.insert(DisplayKind::Table);

    if columns.len() == 1 && rows.len() == 1 {
        kinds.insert(DisplayKind::SingleValue);
        return kinds;
    }

    if let (Some(category), Some(_)) = (axis.string_column_index, axis.number_column_index) {
        kinds.extend([DisplayKind::Bar, DisplayKind::Column, DisplayKind::Line]);

        if axis.has_legend() {
            kinds.extend([
                DisplayKind::StackedBar,
                DisplayKind::StackedColumn,
                DisplayKind::StackedLine,
                DisplayKind::Heatmap,
                DisplayKind::Bubble,
            ]);
        } else {
            let categories = distinct_count(rows, category);
            if (2..=options.pie_max_categories).contains(&categories) {
                kinds.insert(DisplayKind::Pie);
            }
            if axis.number_column_index2.is_some() {
                kinds.insert(DisplayKind::ColumnLine);
            }
            if value_candidates(columns, &[]).len() >= 2 {
                kinds.insert(DisplayKind::Scatterplot);
            }
            kinds.insert(DisplayKind::Histogram);
        }
    }

    if pivot.is_some() {
        kinds.insert(DisplayKind::PivotTable);
    }

    if rows.len() > options.max_chart_rows {
        log_debug!(
            "PIPELINE",
            "{} rows exceed the chart limit of {}, offering tables only",
            rows.len(),
            options.max_chart_rows
        );
        kinds.retain(|kind| kind.is_tabular());
    }
    kinds
}

/// The requested kind when supported, otherwise the flat table.
pub fn recommend_display_kind(requested: DisplayKind, supported: &BTreeSet<DisplayKind>) -> DisplayKind {
    if supported.contains(&requested) {
        requested
    } else {
        DisplayKind::Table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use result_model::{CellValue, ColumnType};

    fn columns() -> Vec<Column> {
        vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("sales", ColumnType::DollarAmt),
            Column::new("units", ColumnType::Quantity),
        ]
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| {
                vec![
                    CellValue::text(format!("r{}", i)),
                    CellValue::Number(i as f64),
                    CellValue::Number(1.0),
                ]
            })
            .collect()
    }

    fn axis() -> AxisConfig {
        AxisConfig {
            string_column_index: Some(0),
            number_column_index: Some(1),
            number_column_index2: Some(2),
            ..AxisConfig::default()
        }
    }

    #[test]
    fn single_value_results() {
        let cols = vec![Column::new("total", ColumnType::DollarAmt)];
        let kinds = supported_display_kinds(
            &cols,
            &[vec![CellValue::Number(5.0)]],
            &AxisConfig::default(),
            None,
            &PipelineOptions::default(),
        );
        assert_eq!(kinds.into_iter().collect::<Vec<_>>(), vec![DisplayKind::Table, DisplayKind::SingleValue]);
    }

    #[test]
    fn category_and_value_charts() {
        let kinds = supported_display_kinds(&columns(), &rows(3), &axis(), None, &PipelineOptions::default());
        for kind in [
            DisplayKind::Bar,
            DisplayKind::Pie,
            DisplayKind::ColumnLine,
            DisplayKind::Scatterplot,
            DisplayKind::Histogram,
        ] {
            assert!(kinds.contains(&kind), "missing {:?}", kind);
        }
        assert!(!kinds.contains(&DisplayKind::StackedBar));
        assert!(!kinds.contains(&DisplayKind::PivotTable));

        let many = supported_display_kinds(&columns(), &rows(11), &axis(), None, &PipelineOptions::default());
        assert!(!many.contains(&DisplayKind::Pie));
    }

    #[test]
    fn large_results_offer_only_tables() {
        let options = PipelineOptions {
            max_chart_rows: 2,
            ..PipelineOptions::default()
        };
        let kinds = supported_display_kinds(&columns(), &rows(3), &axis(), None, &options);
        assert_eq!(kinds.into_iter().collect::<Vec<_>>(), vec![DisplayKind::Table]);
    }

    #[test]
    fn unsupported_requests_fall_back_to_table() {
        let kinds = supported_display_kinds(&columns(), &rows(3), &AxisConfig::default(), None, &PipelineOptions::default());
        assert_eq!(recommend_display_kind(DisplayKind::Pie, &kinds), DisplayKind::Table);
        assert_eq!(recommend_display_kind(DisplayKind::Table, &kinds), DisplayKind::Table);
    }
}
