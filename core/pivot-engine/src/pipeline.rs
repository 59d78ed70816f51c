//! FILENAME: core/pivot-engine/src/pipeline.rs
//! The result-to-visualization pipeline.
//!
//! classify -> validate -> select axes -> assemble table -> filter -> pivot
//! -> display kinds. Nothing here returns an error: malformed input becomes
//! `TransformOutcome::NoData` and every suppressed failure is reported as a
//! diagnostic next to a still-renderable result.

use std::collections::BTreeSet;

use serde::Serialize;

use filter_engine::{apply_filters, FilterSpec};
use result_model::{
    classify_columns, log_debug, log_info, log_warn, ColumnKind, ColumnType, Diagnostic, QueryResult, Stage,
};

use crate::definition::PipelineOptions;
use crate::display::{recommend_display_kind, supported_display_kinds, DisplayKind};
use crate::drilldown::{drilldown, DrilldownResolution, DrilldownTarget};
use crate::engine::{build_pivot, supports_pivot};
use crate::error::DrilldownError;
use crate::table::{assemble_table, FlatTable};
use crate::view::PivotTable;

/// Everything the presentation layer needs to render one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub table: FlatTable,
    pub pivot_table: Option<PivotTable>,
    pub supported_display_kinds: BTreeSet<DisplayKind>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Visualization {
    /// Maps a click on this visualization back to query dimensions.
    pub fn drilldown(&self, target: DrilldownTarget) -> Result<DrilldownResolution, DrilldownError> {
        drilldown(&self.table, self.pivot_table.as_ref(), target)
    }

    pub fn display_kind_for(&self, requested: DisplayKind) -> DisplayKind {
        recommend_display_kind(requested, &self.supported_display_kinds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransformOutcome {
    Rendered(Visualization),
    NoData { reason: String },
}

impl TransformOutcome {
    pub fn visualization(&self) -> Option<&Visualization> {
        match self {
            TransformOutcome::Rendered(v) => Some(v),
            TransformOutcome::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, TransformOutcome::NoData { .. })
    }
}

/// Runs the full pipeline over one query result.
pub fn transform(input: &QueryResult, filters: &[FilterSpec], options: &PipelineOptions) -> TransformOutcome {
    let kinds = classify_columns(&input.columns);
    log_debug!(
        "PIPELINE",
        "classified {} columns: {} numeric, {} date",
        kinds.len(),
        kinds.iter().filter(|k| matches!(k, ColumnKind::Number(_))).count(),
        kinds.iter().filter(|k| matches!(k, ColumnKind::Date(_))).count()
    );
    let mut diagnostics: Vec<Diagnostic> = input
        .columns
        .iter()
        .filter_map(|column| match &column.column_type {
            ColumnType::Unknown(tag) => Some(Diagnostic::new(
                Stage::Column,
                format!("column '{}' has unknown type '{}' and is treated as text", column.name, tag),
            )),
            _ => None,
        })
        .collect();

    let mut table = match assemble_table(input, None, options.date_sort_direction) {
        Ok(table) => table,
        Err(e) => {
            log_warn!("PIPELINE", "no renderable data: {}", e);
            return TransformOutcome::NoData { reason: e.to_string() };
        }
    };

    if table.dropped_null_rows > 0 {
        diagnostics.push(Diagnostic::new(
            Stage::Table,
            format!("{} rows with an empty category were hidden", table.dropped_null_rows),
        ));
    }

    if !filters.is_empty() {
        let outcome = apply_filters(&table.columns, &table.rows, filters, &options.filter_options());
        log_debug!(
            "PIPELINE",
            "filters kept {} of {} rows",
            outcome.rows.len(),
            table.rows.len()
        );
        table.rows = outcome.rows;
        diagnostics.extend(outcome.diagnostics);
    }

    let pivot_table = if supports_pivot(&table) {
        match build_pivot(&table, options.pivot_options()) {
            Ok(pivot) => {
                if pivot.uncoercible_values > 0 {
                    diagnostics.push(Diagnostic::new(
                        Stage::Pivot,
                        format!(
                            "{} value cells were not numeric and were left out of the pivot",
                            pivot.uncoercible_values
                        ),
                    ));
                }
                Some(pivot)
            }
            Err(e) => {
                log_warn!("PIPELINE", "pivot generation failed, showing flat table: {}", e);
                diagnostics.push(Diagnostic::new(Stage::Pivot, e.to_string()));
                None
            }
        }
    } else {
        None
    };

    let supported_display_kinds = supported_display_kinds(
        &table.columns,
        &table.rows,
        &table.axis_config,
        pivot_table.as_ref(),
        options,
    );

    log_info!(
        "PIPELINE",
        "transformed {} rows, pivot={}, {} display kinds",
        table.rows.len(),
        pivot_table.is_some(),
        supported_display_kinds.len()
    );

    TransformOutcome::Rendered(Visualization {
        table,
        pivot_table,
        supported_display_kinds,
        diagnostics,
    })
}
