//! FILENAME: core/result-model/src/axis.rs
//! PURPOSE: The resolved axis configuration threaded between pipeline stages.
//! CONTEXT: Produced by the axis selector, consumed by the table assembler,
//! pivot engine and drilldown mapper. Always rebuilt, never mutated in place.

use serde::{Deserialize, Serialize};

use crate::column::Column;

/// Which columns play the category, legend and value roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    /// Category (string) axis.
    pub string_column_index: Option<usize>,
    /// Every eligible category candidate, chosen axis first.
    #[serde(default)]
    pub string_column_indices: Vec<usize>,
    /// Series (legend) axis.
    #[serde(default)]
    pub legend_column_index: Option<usize>,
    /// Primary value axis.
    pub number_column_index: Option<usize>,
    /// Value columns plotted against the primary axis, chosen axis first.
    #[serde(default)]
    pub number_column_indices: Vec<usize>,
    /// Secondary value axis for dual-metric charts.
    #[serde(default)]
    pub number_column_index2: Option<usize>,
    #[serde(default)]
    pub number_column_indices2: Vec<usize>,
}

impl AxisConfig {
    pub fn has_category(&self) -> bool {
        self.string_column_index.is_some()
    }

    pub fn has_legend(&self) -> bool {
        self.legend_column_index.is_some()
    }

    pub fn has_value(&self) -> bool {
        self.number_column_index.is_some()
    }

    /// Checks every index against the role it plays.
    pub fn is_valid_for(&self, columns: &[Column]) -> bool {
        let axis_ok = |idx: usize| columns.get(idx).map_or(false, Column::is_axis_candidate);
        let value_ok = |idx: usize| columns.get(idx).map_or(false, Column::is_value_candidate);

        let category_ok = self.string_column_index.map_or(true, axis_ok)
            && self.string_column_indices.iter().all(|&i| axis_ok(i));
        let legend_ok = match self.legend_column_index {
            Some(legend) => {
                axis_ok(legend)
                    && columns[legend].groupable
                    && Some(legend) != self.string_column_index
            }
            None => true,
        };
        let primary_ok = self.number_column_index.map_or(true, value_ok)
            && self.number_column_indices.iter().all(|&i| value_ok(i));
        let secondary_ok = match self.number_column_index2 {
            Some(second) => value_ok(second) && Some(second) != self.number_column_index,
            None => true,
        } && self.number_column_indices2.iter().all(|&i| value_ok(i));

        category_ok && legend_ok && primary_ok && secondary_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    #[test]
    fn validity_follows_column_roles() {
        let columns = vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("sales", ColumnType::DollarAmt),
        ];
        let good = AxisConfig {
            string_column_index: Some(0),
            string_column_indices: vec![0],
            number_column_index: Some(1),
            number_column_indices: vec![1],
            ..AxisConfig::default()
        };
        assert!(good.is_valid_for(&columns));

        let swapped = AxisConfig {
            string_column_index: Some(1),
            number_column_index: Some(0),
            ..AxisConfig::default()
        };
        assert!(!swapped.is_valid_for(&columns));

        let out_of_range = AxisConfig {
            number_column_index: Some(7),
            ..AxisConfig::default()
        };
        assert!(!out_of_range.is_valid_for(&columns));
    }

    #[test]
    fn legend_must_be_groupable() {
        let columns = vec![
            Column::new("region", ColumnType::String).groupable(),
            Column::new("product", ColumnType::String),
            Column::new("sales", ColumnType::DollarAmt),
        ];
        let config = AxisConfig {
            string_column_index: Some(0),
            legend_column_index: Some(1),
            number_column_index: Some(2),
            ..AxisConfig::default()
        };
        assert!(!config.is_valid_for(&columns));

        let mut grouped = columns.clone();
        grouped[1] = Column::new("product", ColumnType::String).groupable();
        assert!(config.is_valid_for(&grouped));

        // A non-groupable category is still accepted on its own.
        let category_only = AxisConfig {
            string_column_index: Some(1),
            number_column_index: Some(2),
            ..AxisConfig::default()
        };
        assert!(category_only.is_valid_for(&columns));
    }

    #[test]
    fn secondary_must_differ_from_primary() {
        let columns = vec![Column::new("sales", ColumnType::DollarAmt)];
        let config = AxisConfig {
            number_column_index: Some(0),
            number_column_index2: Some(0),
            ..AxisConfig::default()
        };
        assert!(!config.is_valid_for(&columns));
    }
}
