//! FILENAME: core/pivot-engine/src/cache.rs
//! Value interning for axis values.
//!
//! Each distinct axis value is stored once and referenced by a dense id in
//! first-occurrence order. Pivot rows and columns are laid out by these ids,
//! so the output order is the insertion order of the source rows.

use rustc_hash::FxHashMap;
use result_model::CellValue;

/// A reference to an interned value.
pub type ValueId = usize;

/// A normalized, hashable representation of a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
}

impl From<&CellValue> for CacheValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Null => CacheValue::Empty,
            CellValue::Number(n) => CacheValue::Number(OrderedFloat(*n)),
            CellValue::Text(s) => CacheValue::Text(s.clone()),
        }
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // 0.0 and -0.0 compare equal, so they must hash equal
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// Distinct values of one axis, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct DistinctValues {
    value_to_id: FxHashMap<CacheValue, ValueId>,
    id_to_value: Vec<CellValue>,
}

impl DistinctValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a value and returns its id. Existing values keep their id.
    pub fn intern(&mut self, value: &CellValue) -> ValueId {
        let key = CacheValue::from(value);
        if let Some(&id) = self.value_to_id.get(&key) {
            return id;
        }
        let id = self.id_to_value.len();
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(key, id);
        id
    }

    pub fn get(&self, id: ValueId) -> Option<&CellValue> {
        self.id_to_value.get(id)
    }

    pub fn len(&self) -> usize {
        self.id_to_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_value.is_empty()
    }

    pub fn values(&self) -> &[CellValue] {
        &self.id_to_value
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.id_to_value
    }
}

/// Counts distinct non-null values in one column.
pub fn distinct_count(rows: &[Vec<CellValue>], column_index: usize) -> usize {
    let mut distinct = DistinctValues::new();
    for cell in rows.iter().filter_map(|row| row.get(column_index)) {
        if !cell.is_null() {
            distinct.intern(cell);
        }
    }
    distinct.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_preserves_first_occurrence_order() {
        let mut distinct = DistinctValues::new();
        let ids: Vec<ValueId> = ["b", "a", "b", "c", "a"]
            .iter()
            .map(|s| distinct.intern(&CellValue::text(*s)))
            .collect();
        assert_eq!(ids, vec![0, 1, 0, 2, 1]);
        assert_eq!(
            distinct.values(),
            &[CellValue::text("b"), CellValue::text("a"), CellValue::text("c")]
        );
    }

    #[test]
    fn numbers_and_text_are_distinct_keys() {
        let mut distinct = DistinctValues::new();
        distinct.intern(&CellValue::Number(2021.0));
        distinct.intern(&CellValue::text("2021"));
        distinct.intern(&CellValue::Number(-0.0));
        distinct.intern(&CellValue::Number(0.0));
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn distinct_count_ignores_nulls() {
        let rows = vec![
            vec![CellValue::text("x")],
            vec![CellValue::Null],
            vec![CellValue::text("y")],
            vec![CellValue::text("x")],
        ];
        assert_eq!(distinct_count(&rows, 0), 2);
        assert_eq!(distinct_count(&rows, 5), 0);
    }
}
