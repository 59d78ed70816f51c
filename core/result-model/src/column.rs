//! FILENAME: core/result-model/src/column.rs
//! PURPOSE: Column descriptors and semantic classification.
//! CONTEXT: Every column returned by a query carries a type tag. Classification
//! maps that tag onto exactly one `ColumnKind` (string, number or date) which
//! the axis, filter and pivot stages use to decide what a column may do.
//! Unrecognised tags never fail: they classify as string-kind.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// TYPE TAGS
// ============================================================================

/// The declared type tag of a column, as sent by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Date,
    DateString,
    DollarAmt,
    Quantity,
    Percent,
    Ratio,
    Number,
    /// Any tag this version does not know about.
    Unknown(String),
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "STRING" => ColumnType::String,
            "DATE" => ColumnType::Date,
            "DATE_STRING" => ColumnType::DateString,
            "DOLLAR_AMT" => ColumnType::DollarAmt,
            "QUANTITY" => ColumnType::Quantity,
            "PERCENT" => ColumnType::Percent,
            "RATIO" => ColumnType::Ratio,
            "NUMBER" => ColumnType::Number,
            _ => ColumnType::Unknown(tag),
        }
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.tag().to_string()
    }
}

impl ColumnType {
    pub fn tag(&self) -> &str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Date => "DATE",
            ColumnType::DateString => "DATE_STRING",
            ColumnType::DollarAmt => "DOLLAR_AMT",
            ColumnType::Quantity => "QUANTITY",
            ColumnType::Percent => "PERCENT",
            ColumnType::Ratio => "RATIO",
            ColumnType::Number => "NUMBER",
            ColumnType::Unknown(tag) => tag.as_str(),
        }
    }
}

/// Bucket granularity of a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatePrecision {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DatePrecision {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "MINUTE" | "DATE_MINUTE" => Some(DatePrecision::Minute),
            "HOUR" | "DATE_HOUR" => Some(DatePrecision::Hour),
            "DAY" | "DATE" => Some(DatePrecision::Day),
            "WEEK" => Some(DatePrecision::Week),
            "MONTH" => Some(DatePrecision::Month),
            "QUARTER" => Some(DatePrecision::Quarter),
            "YEAR" => Some(DatePrecision::Year),
            _ => None,
        }
    }
}

/// Unknown precision tags are dropped rather than rejected.
fn lenient_precision<'de, D>(deserializer: D) -> Result<Option<DatePrecision>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag: Option<String> = Option::deserialize(deserializer)?;
    Ok(tag.as_deref().and_then(DatePrecision::from_tag))
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Flavour of a number-kind column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberKind {
    Currency,
    Quantity,
    Percent,
    Ratio,
    Plain,
}

/// How a date-kind column encodes its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRepr {
    /// Unix epoch seconds (number or numeric text).
    Epoch,
    /// Calendar text ("2021-02-15", "Feb 2021", "2021-W05", ...).
    Calendar,
}

/// The single semantic kind every column resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    String,
    Number(NumberKind),
    Date(DateRepr),
}

impl ColumnKind {
    pub fn of(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::String | ColumnType::Unknown(_) => ColumnKind::String,
            ColumnType::Date => ColumnKind::Date(DateRepr::Epoch),
            ColumnType::DateString => ColumnKind::Date(DateRepr::Calendar),
            ColumnType::DollarAmt => ColumnKind::Number(NumberKind::Currency),
            ColumnType::Quantity => ColumnKind::Number(NumberKind::Quantity),
            ColumnType::Percent => ColumnKind::Number(NumberKind::Percent),
            ColumnType::Ratio => ColumnKind::Number(NumberKind::Ratio),
            ColumnType::Number => ColumnKind::Number(NumberKind::Plain),
        }
    }
}

// ============================================================================
// COLUMN
// ============================================================================

fn default_true() -> bool {
    true
}

/// A column descriptor as returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Stable identifier, when the query service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Whether the source query may group by this column.
    #[serde(default)]
    pub groupable: bool,

    /// Whether values may be aggregated. Only meaningful for number-kind columns.
    #[serde(default = "default_true")]
    pub summable: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(
        default,
        deserialize_with = "lenient_precision",
        skip_serializing_if = "Option::is_none"
    )]
    pub precision: Option<DatePrecision>,

    /// Series label for contrast/compare results with several value columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_category: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            id: None,
            name: name.into(),
            display_name: String::new(),
            column_type,
            groupable: false,
            summable: true,
            visible: true,
            precision: None,
            series_category: None,
        }
    }

    pub fn groupable(mut self) -> Self {
        self.groupable = true;
        self
    }

    pub fn with_precision(mut self, precision: DatePrecision) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series_category = Some(series.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn kind(&self) -> ColumnKind {
        ColumnKind::of(&self.column_type)
    }

    /// Display name, falling back to the raw name.
    pub fn display_label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    pub fn is_string_kind(&self) -> bool {
        self.kind() == ColumnKind::String
    }

    pub fn is_number_kind(&self) -> bool {
        matches!(self.kind(), ColumnKind::Number(_))
    }

    pub fn is_date_kind(&self) -> bool {
        matches!(self.kind(), ColumnKind::Date(_))
    }

    pub fn date_repr(&self) -> Option<DateRepr> {
        match self.kind() {
            ColumnKind::Date(repr) => Some(repr),
            _ => None,
        }
    }

    pub fn number_kind(&self) -> Option<NumberKind> {
        match self.kind() {
            ColumnKind::Number(kind) => Some(kind),
            _ => None,
        }
    }

    /// Eligible to become the category or legend axis.
    pub fn is_axis_candidate(&self) -> bool {
        !self.is_number_kind()
    }

    /// Eligible for aggregation.
    pub fn is_summable(&self) -> bool {
        self.is_number_kind() && self.summable
    }

    /// Eligible to become a value axis: visible, summable, number-kind.
    pub fn is_value_candidate(&self) -> bool {
        self.visible && self.is_summable()
    }

    /// Precision used for bucketing; date columns without one use day buckets.
    pub fn effective_precision(&self) -> DatePrecision {
        self.precision.unwrap_or(DatePrecision::Day)
    }
}

/// Classifies every column, logging unrecognised type tags once per column.
pub fn classify_columns(columns: &[Column]) -> Vec<ColumnKind> {
    columns
        .iter()
        .map(|column| {
            if let ColumnType::Unknown(tag) = &column.column_type {
                crate::log_debug!(
                    "COLUMN",
                    "unknown type tag '{}' on column '{}', treating as string",
                    tag,
                    column.name
                );
            }
            column.kind()
        })
        .collect()
}
