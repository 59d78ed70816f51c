//! FILENAME: core/pivot-engine/src/axis.rs
//! Axis selection - chooses the category, legend and value columns.
//!
//! Selection is a pure function of (columns, rows, excluded, preferred):
//! running it twice on unchanged input yields the same configuration, and a
//! previously chosen index that is still eligible is kept.

use result_model::{log_debug, AxisConfig, Column, Row};

use crate::cache::distinct_count;

/// Caller-supplied hints for axis selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisHints<'a> {
    /// A previous configuration whose still-valid indices should be kept.
    pub preferred: Option<&'a AxisConfig>,
    /// Column indices that may not be chosen for any role.
    pub excluded: &'a [usize],
    /// The query result's own "headline amount" column.
    pub default_amount_column: Option<usize>,
}

/// Chooses every axis for the given columns and rows.
pub fn select_axes(columns: &[Column], rows: &[Row], hints: &AxisHints) -> AxisConfig {
    let (category, legend, category_candidates) = select_category_axes(columns, rows, hints);
    let (primary, secondary) = select_value_axes(columns, hints);

    let string_column_indices = category
        .into_iter()
        .chain(
            category_candidates
                .iter()
                .copied()
                .filter(|&i| Some(i) != category && Some(i) != legend),
        )
        .collect();

    let value_candidates = value_candidates(columns, hints.excluded);
    let primary_kind = primary.and_then(|i| columns[i].number_kind());
    let number_column_indices: Vec<usize> = primary
        .into_iter()
        .chain(value_candidates.iter().copied().filter(|&i| {
            Some(i) != primary && Some(i) != secondary && columns[i].number_kind() == primary_kind
        }))
        .collect();
    let number_column_indices2 = secondary
        .into_iter()
        .chain(value_candidates.iter().copied().filter(|&i| {
            Some(i) != secondary && !number_column_indices.contains(&i)
        }))
        .collect();

    let config = AxisConfig {
        string_column_index: category,
        string_column_indices,
        legend_column_index: legend,
        number_column_index: primary,
        number_column_indices,
        number_column_index2: secondary,
        number_column_indices2,
    };
    log_debug!(
        "AXIS",
        "selected category={:?} legend={:?} value={:?} value2={:?}",
        config.string_column_index,
        config.legend_column_index,
        config.number_column_index,
        config.number_column_index2
    );
    config
}

// ============================================================================
// CATEGORY & LEGEND
// ============================================================================

fn is_excluded(excluded: &[usize], index: usize) -> bool {
    excluded.contains(&index)
}

/// Groupable string-kind or date-kind columns, in column order.
pub fn category_candidates(columns: &[Column], excluded: &[usize]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(i, c)| c.groupable && c.is_axis_candidate() && !is_excluded(excluded, *i))
        .map(|(i, _)| i)
        .collect()
}

fn select_category_axes(
    columns: &[Column],
    rows: &[Row],
    hints: &AxisHints,
) -> (Option<usize>, Option<usize>, Vec<usize>) {
    let candidates = category_candidates(columns, hints.excluded);

    if candidates.is_empty() {
        // Ungrouped results still need a row label for display; such a column
        // can never carry a legend.
        let fallback = columns
            .iter()
            .enumerate()
            .position(|(i, c)| c.visible && c.is_axis_candidate() && !is_excluded(hints.excluded, i));
        return (fallback, None, fallback.into_iter().collect());
    }

    let preferred_category = hints
        .preferred
        .and_then(|p| p.string_column_index)
        .filter(|i| candidates.contains(i));

    if let Some(category) = preferred_category {
        let preferred_legend = hints
            .preferred
            .and_then(|p| p.legend_column_index)
            .filter(|i| *i != category && candidates.contains(i));
        let legend = preferred_legend.or_else(|| candidates.iter().copied().find(|&i| i != category));
        return (Some(category), legend, candidates);
    }

    let category = candidates[0];
    match candidates.get(1).copied() {
        Some(legend) => {
            let (category, legend) = apply_swap_heuristic(columns, rows, category, legend);
            (Some(category), Some(legend), candidates)
        }
        None => (Some(category), None, candidates),
    }
}

/// Decides which of two groupable columns becomes the category axis.
///
/// A date-kind column always takes the category axis. Otherwise the legend
/// candidate takes it when it has strictly more distinct values.
pub fn apply_swap_heuristic(columns: &[Column], rows: &[Row], category: usize, legend: usize) -> (usize, usize) {
    let is_date = |i: usize| columns.get(i).map_or(false, Column::is_date_kind);

    if is_date(category) {
        return (category, legend);
    }
    if is_date(legend) {
        log_debug!("AXIS", "swapping axes: column {} is a date", legend);
        return (legend, category);
    }

    let category_count = distinct_count(rows, category);
    let legend_count = distinct_count(rows, legend);
    if legend_count > category_count {
        log_debug!(
            "AXIS",
            "swapping axes: legend has {} distinct values, category has {}",
            legend_count,
            category_count
        );
        (legend, category)
    } else {
        (category, legend)
    }
}

// ============================================================================
// VALUE AXES
// ============================================================================

/// Visible, summable number-kind columns, in column order.
pub fn value_candidates(columns: &[Column], excluded: &[usize]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(i, c)| c.is_value_candidate() && !is_excluded(excluded, *i))
        .map(|(i, _)| i)
        .collect()
}

fn select_value_axes(columns: &[Column], hints: &AxisHints) -> (Option<usize>, Option<usize>) {
    let candidates = value_candidates(columns, hints.excluded);
    let eligible = |i: &usize| candidates.contains(i);

    let primary = hints
        .preferred
        .and_then(|p| p.number_column_index)
        .filter(eligible)
        .or_else(|| hints.default_amount_column.filter(eligible))
        .or_else(|| candidates.first().copied());

    let secondary = select_secondary_value_axis(
        columns,
        primary,
        hints.excluded,
        hints.preferred.and_then(|p| p.number_column_index2),
    );

    (primary, secondary)
}

/// Picks the secondary value axis for dual-metric charts.
///
/// Keeps `previous` when it is still eligible; otherwise the first eligible
/// column that is neither the primary axis nor excluded. `None` when no such
/// column exists, which turns a dual-axis chart into a single-axis one.
pub fn select_secondary_value_axis(
    columns: &[Column],
    primary: Option<usize>,
    excluded: &[usize],
    previous: Option<usize>,
) -> Option<usize> {
    let eligible = |i: usize| {
        Some(i) != primary
            && !is_excluded(excluded, i)
            && columns.get(i).map_or(false, Column::is_value_candidate)
    };

    if let Some(previous) = previous.filter(|&i| eligible(i)) {
        return Some(previous);
    }
    (0..columns.len()).find(|&i| eligible(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use result_model::{CellValue, ColumnType};

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    /// region has 2 distinct values, product has 5.
    fn region_product_rows() -> Vec<Row> {
        let products = ["apples", "pears", "plums", "figs", "kiwis"];
        products
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let region = if i % 2 == 0 { "North" } else { "South" };
                vec![text(region), text(p), CellValue::Number(i as f64)]
            })
            .collect()
    }

    fn region_product_columns() -> Vec<Column> {
        vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("product", ColumnType::String).groupable(),
            Column::new("sales", ColumnType::DollarAmt),
        ]
    }

    #[test]
    fn higher_cardinality_legend_becomes_category() {
        let columns = region_product_columns();
        let rows = region_product_rows();
        let config = select_axes(&columns, &rows, &AxisHints::default());
        assert_eq!(config.string_column_index, Some(1));
        assert_eq!(config.legend_column_index, Some(0));
        assert_eq!(config.number_column_index, Some(2));
    }

    #[test]
    fn date_category_is_never_swapped() {
        let mut columns = region_product_columns();
        columns[0] = Column::new("month", ColumnType::DateString).groupable();
        let rows = region_product_rows();
        let config = select_axes(&columns, &rows, &AxisHints::default());
        assert_eq!(config.string_column_index, Some(0));
        assert_eq!(config.legend_column_index, Some(1));
    }

    #[test]
    fn date_legend_candidate_moves_to_category() {
        let mut columns = region_product_columns();
        columns[1] = Column::new("month", ColumnType::Date).groupable();
        assert_eq!(apply_swap_heuristic(&columns, &[], 0, 1), (1, 0));
    }

    #[test]
    fn selection_is_idempotent_and_stable() {
        let columns = region_product_columns();
        let rows = region_product_rows();
        let first = select_axes(&columns, &rows, &AxisHints::default());
        let again = select_axes(&columns, &rows, &AxisHints::default());
        assert_eq!(first, again);

        let rerun = select_axes(
            &columns,
            &rows,
            &AxisHints {
                preferred: Some(&first),
                ..AxisHints::default()
            },
        );
        assert_eq!(first, rerun);
    }

    #[test]
    fn exclusions_and_non_groupable_columns_are_respected() {
        let mut columns = region_product_columns();
        columns[1].groupable = false;
        let rows = region_product_rows();
        let config = select_axes(&columns, &rows, &AxisHints::default());
        assert_eq!(config.string_column_index, Some(0));
        assert_eq!(config.legend_column_index, None);

        let excluded = [0];
        let config = select_axes(
            &columns,
            &rows,
            &AxisHints {
                excluded: &excluded,
                ..AxisHints::default()
            },
        );
        // Falls back to the first visible non-numeric column for display.
        assert_eq!(config.string_column_index, Some(1));
        assert_eq!(config.legend_column_index, None);
    }

    #[test]
    fn default_amount_column_is_preferred_when_eligible() {
        let columns = vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("count", ColumnType::Quantity),
            Column::new("sales", ColumnType::DollarAmt),
            Column::new("margin", ColumnType::DollarAmt).hidden(),
        ];
        let hints = AxisHints {
            default_amount_column: Some(2),
            ..AxisHints::default()
        };
        let config = select_axes(&columns, &[], &hints);
        assert_eq!(config.number_column_index, Some(2));
        assert_eq!(config.number_column_index2, Some(1));
        assert_eq!(config.number_column_indices, vec![2]);
        assert_eq!(config.number_column_indices2, vec![1]);

        let hidden_hint = AxisHints {
            default_amount_column: Some(3),
            ..AxisHints::default()
        };
        assert_eq!(select_axes(&columns, &[], &hidden_hint).number_column_index, Some(1));
    }

    #[test]
    fn secondary_axis_keeps_previous_choice_and_honours_exclusions() {
        let columns = vec![
            Column::new("a", ColumnType::DollarAmt),
            Column::new("b", ColumnType::DollarAmt),
            Column::new("c", ColumnType::Quantity),
        ];
        assert_eq!(select_secondary_value_axis(&columns, Some(0), &[], None), Some(1));
        assert_eq!(select_secondary_value_axis(&columns, Some(0), &[], Some(2)), Some(2));
        assert_eq!(select_secondary_value_axis(&columns, Some(0), &[1], None), Some(2));
        assert_eq!(select_secondary_value_axis(&columns, Some(0), &[1, 2], Some(2)), None);
        assert_eq!(select_secondary_value_axis(&columns, Some(0), &[], Some(0)), Some(1));
    }
}
