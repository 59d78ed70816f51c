//! FILENAME: core/filter-engine/src/engine.rs
//! Filter Engine - evaluates filter batches against typed rows.
//!
//! Algorithm:
//! 1. Resolve every filter's column reference once per pass
//! 2. Compile each filter into a kind-specific predicate (numeric, date, text, null test)
//! 3. Apply the unknown-column policy to the whole batch
//! 4. Keep the rows that satisfy every compiled predicate
//!
//! Cells that fail to coerce under their column's declared type are excluded
//! for that filter and counted; the counts are logged and reported as
//! diagnostics, never raised.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use result_model::date::{iso_week_start, parse_iso_week};
use result_model::{
    cell_to_datetime, end_of, log_debug, log_warn, normalize_label, parse_formatted_number,
    start_of, CellValue, Column, ColumnKind, DatePrecision, DateRepr, Diagnostic, Row, Stage,
};

use crate::definition::{ColumnRef, FilterOperator, FilterOptions, FilterSpec, FilterValue};

static RELATIONAL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(>=|<=|!=|>|<|=)\s*(.*)$").expect("valid relational prefix pattern")
});

// ============================================================================
// COLUMN RESOLUTION
// ============================================================================

/// Resolves a column reference: index, then id, then exact name, then
/// display name (case-insensitive), then a positional field string.
pub fn resolve_column<'a>(columns: &'a [Column], column_ref: &ColumnRef) -> Option<(usize, &'a Column)> {
    match column_ref {
        ColumnRef::Index(i) => columns.get(*i).map(|c| (*i, c)),
        ColumnRef::Key(key) => {
            let by_id = columns
                .iter()
                .position(|c| c.id.as_deref() == Some(key.as_str()));
            let by_name = || columns.iter().position(|c| c.name == *key);
            let by_label = || {
                let wanted = normalize_label(key);
                columns
                    .iter()
                    .position(|c| normalize_label(c.display_label()) == wanted)
            };
            let by_field = || key.trim().parse::<usize>().ok().filter(|i| *i < columns.len());

            by_id
                .or_else(by_name)
                .or_else(by_label)
                .or_else(by_field)
                .map(|i| (i, &columns[i]))
        }
    }
}

// ============================================================================
// COMPILED PREDICATES
// ============================================================================

/// Result of evaluating one filter against one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The cell could not be read under the column's declared type.
    Uncoercible,
}

impl Verdict {
    fn from_bool(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumericTest {
    Compare(FilterOperator, f64),
    Range(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateTest {
    /// Inclusive bucket bounds; `negate` flips the result (for `!=`).
    Within {
        start: NaiveDateTime,
        end: NaiveDateTime,
        negate: bool,
    },
    After(NaiveDateTime),
    AtOrAfter(NaiveDateTime),
    Before(NaiveDateTime),
    AtOrBefore(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq)]
enum TextTest {
    Contains(String),
    Compare(FilterOperator, String),
    Range(String, String),
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    IsNull,
    IsNotNull,
    Numeric(NumericTest),
    Date {
        repr: DateRepr,
        precision: DatePrecision,
        test: DateTest,
    },
    Text(TextTest),
}

/// A filter whose column has been resolved and whose operand has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub column_index: usize,
    pub column_name: String,
    predicate: Predicate,
}

impl CompiledFilter {
    pub fn evaluate(&self, row: &Row) -> Verdict {
        let cell = row.get(self.column_index).unwrap_or(&CellValue::Null);
        match &self.predicate {
            Predicate::IsNull => Verdict::from_bool(cell.is_null()),
            Predicate::IsNotNull => Verdict::from_bool(!cell.is_null()),
            _ if cell.is_null() => Verdict::Fail,
            Predicate::Numeric(test) => match cell.as_formatted_number() {
                Some(n) => Verdict::from_bool(numeric_matches(*test, n)),
                None => Verdict::Uncoercible,
            },
            Predicate::Date { repr, precision, test } => match cell_to_datetime(cell, *repr) {
                Some(dt) => Verdict::from_bool(date_matches(*test, start_of(dt, *precision))),
                None => Verdict::Uncoercible,
            },
            Predicate::Text(test) => Verdict::from_bool(text_matches(test, &cell.display_value())),
        }
    }
}

fn numeric_matches(test: NumericTest, n: f64) -> bool {
    match test {
        NumericTest::Range(lo, hi) => n >= lo && n <= hi,
        NumericTest::Compare(op, v) => match op {
            FilterOperator::NotEquals => n != v,
            FilterOperator::GreaterThan => n > v,
            FilterOperator::LessThan => n < v,
            FilterOperator::GreaterThanOrEqual => n >= v,
            FilterOperator::LessThanOrEqual => n <= v,
            _ => n == v,
        },
    }
}

fn date_matches(test: DateTest, dt: NaiveDateTime) -> bool {
    match test {
        DateTest::Within { start, end, negate } => (dt >= start && dt <= end) != negate,
        DateTest::After(bound) => dt > bound,
        DateTest::AtOrAfter(bound) => dt >= bound,
        DateTest::Before(bound) => dt < bound,
        DateTest::AtOrBefore(bound) => dt <= bound,
    }
}

fn text_matches(test: &TextTest, cell_text: &str) -> bool {
    let haystack = normalize_label(cell_text);
    match test {
        TextTest::Contains(needle) => haystack.contains(needle.as_str()),
        TextTest::Range(lo, hi) => haystack.as_str() >= lo.as_str() && haystack.as_str() <= hi.as_str(),
        TextTest::Compare(op, value) => match op {
            FilterOperator::NotEquals => haystack != *value,
            FilterOperator::GreaterThan => haystack > *value,
            FilterOperator::LessThan => haystack < *value,
            FilterOperator::GreaterThanOrEqual => haystack >= *value,
            FilterOperator::LessThanOrEqual => haystack <= *value,
            _ => haystack == *value,
        },
    }
}

// ============================================================================
// COMPILATION
// ============================================================================

fn null_sentinel(value: &FilterValue) -> Option<Predicate> {
    let text = value.as_single()?.trim().to_ascii_uppercase();
    match text.as_str() {
        "NULL" | "IS NULL" => Some(Predicate::IsNull),
        "NOT NULL" | "IS NOT NULL" => Some(Predicate::IsNotNull),
        _ => None,
    }
}

/// Splits a leading relational prefix off quick-filter text.
fn split_relational_prefix(text: &str) -> Option<(FilterOperator, String)> {
    let caps = RELATIONAL_PREFIX_RE.captures(text)?;
    let op: FilterOperator = caps.get(1)?.as_str().parse().ok()?;
    Some((op, caps.get(2)?.as_str().trim().to_string()))
}

fn compile_text(op: FilterOperator, value: &FilterValue, options: &FilterOptions) -> Predicate {
    if op == FilterOperator::Between {
        if let Some((lo, hi)) = value.split_range(&options.between_separator) {
            let (lo, hi) = (normalize_label(&lo), normalize_label(&hi));
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            return Predicate::Text(TextTest::Range(lo, hi));
        }
    }
    let needle = match value {
        FilterValue::Single(s) => normalize_label(s),
        FilterValue::Range(start, _) => normalize_label(start),
    };
    match op {
        FilterOperator::Contains | FilterOperator::Between => Predicate::Text(TextTest::Contains(needle)),
        FilterOperator::Is => Predicate::Text(TextTest::Compare(FilterOperator::Equals, needle)),
        other => Predicate::Text(TextTest::Compare(other, needle)),
    }
}

fn compile_numeric(op: FilterOperator, value: &FilterValue, options: &FilterOptions) -> Predicate {
    if let Some((lo, hi)) = value.split_range(&options.between_separator) {
        if op == FilterOperator::Between || matches!(value, FilterValue::Range(..)) {
            if let (Some(lo), Some(hi)) = (parse_formatted_number(&lo), parse_formatted_number(&hi)) {
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                return Predicate::Numeric(NumericTest::Range(lo, hi));
            }
        }
    }

    let Some(text) = value.as_single() else {
        return compile_text(op, value, options);
    };

    // Inline operators in quick-filter text win over the declared operator.
    let (op, operand) = match split_relational_prefix(text) {
        Some((inline_op, rest)) => (inline_op, rest),
        None => (op, text.to_string()),
    };

    match (op, parse_formatted_number(&operand)) {
        (FilterOperator::Contains, _) | (_, None) => {
            compile_text(FilterOperator::Contains, &FilterValue::Single(operand), options)
        }
        (FilterOperator::Between | FilterOperator::Is, Some(v)) => {
            Predicate::Numeric(NumericTest::Compare(FilterOperator::Equals, v))
        }
        (op, Some(v)) => Predicate::Numeric(NumericTest::Compare(op, v)),
    }
}

/// Parses a filter operand as an instant, honouring the column's representation.
fn parse_filter_instant(text: &str, repr: DateRepr) -> Option<NaiveDateTime> {
    let cell = CellValue::text(text.trim());
    let is_year = text.trim().len() == 4 && text.trim().chars().all(|c| c.is_ascii_digit());
    if is_year {
        return cell_to_datetime(&cell, DateRepr::Calendar);
    }
    cell_to_datetime(&cell, repr)
        .or_else(|| cell_to_datetime(&cell, DateRepr::Calendar))
        .or_else(|| parse_iso_week(text).and_then(|(y, w)| iso_week_start(y, w)))
}

fn compile_date(
    op: FilterOperator,
    value: &FilterValue,
    column: &Column,
    repr: DateRepr,
    options: &FilterOptions,
) -> Predicate {
    let precision = column.effective_precision();
    let date_predicate = |test| Predicate::Date { repr, precision, test };

    let range = value.split_range(&options.between_separator);
    if let Some((lo, hi)) = range.filter(|_| op == FilterOperator::Between || matches!(value, FilterValue::Range(..))) {
        if let (Some(lo), Some(hi)) = (parse_filter_instant(&lo, repr), parse_filter_instant(&hi, repr)) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            return date_predicate(DateTest::Within {
                start: start_of(lo, precision),
                end: end_of(hi, precision),
                negate: false,
            });
        }
        log_debug!("FILTER", "unparseable date range on '{}', falling back to text", column.name);
        return compile_text(FilterOperator::Contains, value, options);
    }

    let Some(text) = value.as_single() else {
        return compile_text(op, value, options);
    };
    let Some(instant) = parse_filter_instant(text, repr) else {
        log_debug!("FILTER", "unparseable date '{}' on '{}', falling back to text", text, column.name);
        return compile_text(FilterOperator::Contains, value, options);
    };

    let start = start_of(instant, precision);
    let end = end_of(instant, precision);
    let test = match op {
        FilterOperator::NotEquals => DateTest::Within { start, end, negate: true },
        FilterOperator::GreaterThan => DateTest::After(end),
        FilterOperator::GreaterThanOrEqual => DateTest::AtOrAfter(start),
        FilterOperator::LessThan => DateTest::Before(start),
        FilterOperator::LessThanOrEqual => DateTest::AtOrBefore(end),
        FilterOperator::Contains => return compile_text(FilterOperator::Contains, value, options),
        _ => DateTest::Within { start, end, negate: false },
    };
    date_predicate(test)
}

/// Compiles one filter against an already-resolved column.
pub fn compile_filter(
    spec: &FilterSpec,
    column_index: usize,
    column: &Column,
    options: &FilterOptions,
) -> CompiledFilter {
    let kind = column.kind();
    let op = spec.operator.unwrap_or(match kind {
        ColumnKind::String => FilterOperator::Contains,
        _ => FilterOperator::Equals,
    });

    let sentinel = if op == FilterOperator::Is || spec.operator.is_none() {
        null_sentinel(&spec.value)
    } else {
        None
    };

    let predicate = match sentinel {
        Some(predicate) => predicate,
        None => match kind {
            ColumnKind::Number(_) => compile_numeric(op, &spec.value, options),
            ColumnKind::Date(repr) => compile_date(op, &spec.value, column, repr, options),
            ColumnKind::String => compile_text(op, &spec.value, options),
        },
    };

    CompiledFilter {
        column_index,
        column_name: column.name.clone(),
        predicate,
    }
}

// ============================================================================
// BATCH EVALUATION
// ============================================================================

/// A compiled filter batch, ready to evaluate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub filters: Vec<CompiledFilter>,
    /// Set when an unknown column was referenced under the fail policy.
    pub reject_all: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl FilterPlan {
    /// Resolves and compiles a batch. Column resolution happens here, once.
    pub fn compile(columns: &[Column], filters: &[FilterSpec], options: &FilterOptions) -> Self {
        let mut plan = FilterPlan {
            filters: Vec::with_capacity(filters.len()),
            reject_all: false,
            diagnostics: Vec::new(),
        };

        for spec in filters {
            match resolve_column(columns, &spec.column_ref) {
                Some((index, column)) => plan.filters.push(compile_filter(spec, index, column, options)),
                None => {
                    let action = if options.fail_on_unknown_column {
                        plan.reject_all = true;
                        "excluding all rows"
                    } else {
                        "skipping filter"
                    };
                    log_warn!("FILTER", "unknown filter column '{}', {}", spec.column_ref, action);
                    plan.diagnostics.push(Diagnostic::new(
                        Stage::Filter,
                        format!("unknown filter column '{}', {}", spec.column_ref, action),
                    ));
                }
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && !self.reject_all
    }

    pub fn matches(&self, row: &Row) -> bool {
        !self.reject_all
            && self
                .filters
                .iter()
                .all(|f| f.evaluate(row) == Verdict::Pass)
    }
}

/// Filtered rows plus anything that was suppressed along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub rows: Vec<Row>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies a filter batch (conjunction) to rows.
pub fn apply_filters(
    columns: &[Column],
    rows: &[Row],
    filters: &[FilterSpec],
    options: &FilterOptions,
) -> FilterOutcome {
    let mut plan = FilterPlan::compile(columns, filters, options);
    if plan.reject_all {
        return FilterOutcome {
            rows: Vec::new(),
            diagnostics: plan.diagnostics,
        };
    }

    let mut uncoercible = vec![0usize; plan.filters.len()];
    let mut kept = Vec::with_capacity(rows.len());

    'rows: for row in rows {
        for (i, filter) in plan.filters.iter().enumerate() {
            match filter.evaluate(row) {
                Verdict::Pass => {}
                Verdict::Fail => continue 'rows,
                Verdict::Uncoercible => {
                    uncoercible[i] += 1;
                    continue 'rows;
                }
            }
        }
        kept.push(row.clone());
    }

    for (filter, count) in plan.filters.iter().zip(uncoercible) {
        if count > 0 {
            log_warn!(
                "FILTER",
                "{} cell(s) in '{}' could not be coerced and were excluded",
                count,
                filter.column_name
            );
            plan.diagnostics.push(Diagnostic::new(
                Stage::Filter,
                format!("{} uncoercible cell(s) in '{}' excluded", count, filter.column_name),
            ));
        }
    }

    log_debug!("FILTER", "kept {} of {} rows", kept.len(), rows.len());
    FilterOutcome {
        rows: kept,
        diagnostics: plan.diagnostics,
    }
}
