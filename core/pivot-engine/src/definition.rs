//! FILENAME: core/pivot-engine/src/definition.rs
//! Pipeline Definition - The serializable configuration.
//!
//! This module contains the options that shape a transform run. They are:
//! - Serializable (hosts load them from JSON alongside the query payload)
//! - Defaulted field by field, so partial documents are valid
//! - Immutable for the duration of a run

use serde::{Deserialize, Serialize};

use filter_engine::FilterOptions;
use result_model::{MonthLabelStyle, SortDirection};

fn default_between_separator() -> String {
    " to ".to_string()
}

fn default_pie_max_categories() -> usize {
    10
}

fn default_max_pivot_rows() -> usize {
    10_000
}

fn default_max_pivot_columns() -> usize {
    500
}

fn default_max_chart_rows() -> usize {
    5_000
}

/// Options for one run of the result-to-visualization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Order applied to the flat table when the category axis is a date.
    #[serde(default)]
    pub date_sort_direction: SortDirection,

    /// Unknown filter columns exclude every row instead of being skipped.
    #[serde(default)]
    pub fail_on_unknown_column: bool,

    /// Token separating start and end in single-string `between` filters.
    #[serde(default = "default_between_separator")]
    pub between_separator: String,

    /// Most distinct categories a pie chart may show.
    #[serde(default = "default_pie_max_categories")]
    pub pie_max_categories: usize,

    /// Most distinct category values a pivot table may have.
    #[serde(default = "default_max_pivot_rows")]
    pub max_pivot_rows: usize,

    /// Most distinct legend values a pivot table may have.
    #[serde(default = "default_max_pivot_columns")]
    pub max_pivot_columns: usize,

    /// Above this many rows only tabular display kinds are offered.
    #[serde(default = "default_max_chart_rows")]
    pub max_chart_rows: usize,

    #[serde(default)]
    pub month_label_style: MonthLabelStyle,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            date_sort_direction: SortDirection::default(),
            fail_on_unknown_column: false,
            between_separator: default_between_separator(),
            pie_max_categories: default_pie_max_categories(),
            max_pivot_rows: default_max_pivot_rows(),
            max_pivot_columns: default_max_pivot_columns(),
            max_chart_rows: default_max_chart_rows(),
            month_label_style: MonthLabelStyle::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn pivot_options(&self) -> PivotOptions {
        PivotOptions {
            max_pivot_rows: self.max_pivot_rows,
            max_pivot_columns: self.max_pivot_columns,
            month_label_style: self.month_label_style,
        }
    }

    /// The subset of options the filter engine consumes.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            fail_on_unknown_column: self.fail_on_unknown_column,
            between_separator: self.between_separator.clone(),
        }
    }
}

/// Limits and labels for pivot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotOptions {
    pub max_pivot_rows: usize,
    pub max_pivot_columns: usize,
    pub month_label_style: MonthLabelStyle,
}

impl Default for PivotOptions {
    fn default() -> Self {
        PipelineOptions::default().pivot_options()
    }
}
