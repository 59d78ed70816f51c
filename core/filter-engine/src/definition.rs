//! FILENAME: core/filter-engine/src/definition.rs
//! Filter Definition - The serializable filter descriptors.
//!
//! Filters reach the core from several places (header quick filters, saved
//! query filters, drilldown fallbacks) in slightly different shapes. These
//! types accept all of them and normalise to one representation:
//! - column references by id, by name, or by positional field string
//! - operators as symbols (">=") or words ("greater_than_or_equal")
//! - values as a single string, a number, or a two-element range

use std::fmt;
use std::str::FromStr;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

// ============================================================================
// COLUMN REFERENCE
// ============================================================================

/// How a filter names its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    /// Positional index into the column list.
    Index(usize),
    /// Column id, column name, or a positional field string such as "2".
    Key(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(key: &str) -> Self {
        ColumnRef::Key(key.to_string())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{}", i),
            ColumnRef::Key(k) => write!(f, "{}", k),
        }
    }
}

// ============================================================================
// OPERATOR
// ============================================================================

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    Between,
    Is,
}

impl FilterOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::Contains => "contains",
            FilterOperator::Between => "between",
            FilterOperator::Is => "is",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let op = match normalized.as_str() {
            "=" | "==" | "eq" | "equals" | "equal" => FilterOperator::Equals,
            "!=" | "<>" | "ne" | "neq" | "not_equals" | "not_equal" => FilterOperator::NotEquals,
            ">" | "gt" | "greater_than" => FilterOperator::GreaterThan,
            "<" | "lt" | "less_than" => FilterOperator::LessThan,
            ">=" | "gte" | "ge" | "greater_than_or_equal" => FilterOperator::GreaterThanOrEqual,
            "<=" | "lte" | "le" | "less_than_or_equal" => FilterOperator::LessThanOrEqual,
            "contains" | "like" => FilterOperator::Contains,
            "between" => FilterOperator::Between,
            "is" => FilterOperator::Is,
            _ => return Err(format!("unknown filter operator '{}'", s)),
        };
        Ok(op)
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.symbol().to_string()
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// The operand of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFilterValue", untagged)]
pub enum FilterValue {
    Single(String),
    Range(String, String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterValue {
    Text(String),
    Number(f64),
    Pair(Vec<RawScalar>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(f64),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            RawScalar::Text(s) => s,
            RawScalar::Number(n) => n.to_string(),
        }
    }
}

impl From<RawFilterValue> for FilterValue {
    fn from(raw: RawFilterValue) -> Self {
        match raw {
            RawFilterValue::Text(s) => FilterValue::Single(s),
            RawFilterValue::Number(n) => FilterValue::Single(n.to_string()),
            RawFilterValue::Pair(items) => {
                let mut items = items.into_iter().map(RawScalar::into_string);
                match (items.next(), items.next()) {
                    (Some(start), Some(end)) => FilterValue::Range(start, end),
                    (Some(only), None) => FilterValue::Single(only),
                    _ => FilterValue::Single(String::new()),
                }
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Single(value.to_string())
    }
}

impl FilterValue {
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        FilterValue::Range(start.into(), end.into())
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            FilterValue::Single(s) => Some(s.as_str()),
            FilterValue::Range(..) => None,
        }
    }

    /// Splits into (start, end): ranges directly, single strings on `separator`.
    pub fn split_range(&self, separator: &str) -> Option<(String, String)> {
        match self {
            FilterValue::Range(start, end) => Some((start.clone(), end.clone())),
            FilterValue::Single(s) => {
                if separator.is_empty() {
                    return None;
                }
                let pattern = RegexBuilder::new(&regex::escape(separator))
                    .case_insensitive(true)
                    .build()
                    .ok()?;
                let mut parts = pattern.splitn(s, 2);
                let start = parts.next()?.trim().to_string();
                let end = parts.next()?.trim().to_string();
                if start.is_empty() || end.is_empty() {
                    None
                } else {
                    Some((start, end))
                }
            }
        }
    }
}

// ============================================================================
// FILTER SPEC & OPTIONS
// ============================================================================

/// One filter condition against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(alias = "column", alias = "field", alias = "id", alias = "name")]
    pub column_ref: ColumnRef,

    /// When absent, the column kind decides: `contains` for strings, `=` otherwise.
    #[serde(default)]
    pub operator: Option<FilterOperator>,

    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(
        column_ref: impl Into<ColumnRef>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        FilterSpec {
            column_ref: column_ref.into(),
            operator: Some(operator),
            value: value.into(),
        }
    }

    /// A header quick filter: free text, operator decided by the column kind
    /// or by a relational prefix inside the text.
    pub fn quick(column_ref: impl Into<ColumnRef>, text: &str) -> Self {
        FilterSpec {
            column_ref: column_ref.into(),
            operator: None,
            value: FilterValue::Single(text.to_string()),
        }
    }
}

fn default_between_separator() -> String {
    " to ".to_string()
}

/// Policy for a whole filter batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// When true, a filter naming a missing column excludes every row;
    /// when false, such filters are skipped.
    #[serde(default)]
    pub fail_on_unknown_column: bool,

    /// Token splitting a single-string `between` value into start and end.
    #[serde(default = "default_between_separator")]
    pub between_separator: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            fail_on_unknown_column: false,
            between_separator: default_between_separator(),
        }
    }
}
