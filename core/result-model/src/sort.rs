//! FILENAME: core/result-model/src/sort.rs
//! Chronological ordering over heterogeneous date-like cells.
//!
//! Values are classified one at a time into a `DateSortKey`, in order of
//! preference: plain number, calendar instant, ISO week, weekday name, text.
//! Whole numbers between 1000 and 9999 are bare years and classify as the
//! instant of January 1st, so they interleave with calendar dates.
//! Keys of different classes order by class, keys of the same class by
//! payload, so the comparator is a total order no matter how the inputs mix.
//! Nulls always sort last.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, Row};
use crate::date::{parse_calendar_text, parse_iso_week, weekday_ordinal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// The comparable form of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DateSortKey {
    /// Unix timestamps and other plain numbers.
    Number(f64),
    Instant(NaiveDateTime),
    IsoWeek(i32, u32),
    /// Sunday = 1 .. Saturday = 7.
    Weekday(u32),
    Text(String),
}

impl DateSortKey {
    pub fn of(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Null => None,
            CellValue::Number(n) => Some(DateSortKey::from_number(*n)),
            CellValue::Text(s) => {
                if let Some(n) = cell.as_number() {
                    return Some(DateSortKey::from_number(n));
                }
                if let Some(dt) = parse_calendar_text(s) {
                    return Some(DateSortKey::Instant(dt));
                }
                if let Some((year, week)) = parse_iso_week(s) {
                    return Some(DateSortKey::IsoWeek(year, week));
                }
                if let Some(ordinal) = weekday_ordinal(s) {
                    return Some(DateSortKey::Weekday(ordinal));
                }
                Some(DateSortKey::Text(s.trim().to_lowercase()))
            }
        }
    }

    fn from_number(n: f64) -> Self {
        if n.fract() == 0.0 && (1000.0..=9999.0).contains(&n) {
            let year_start = NaiveDate::from_ymd_opt(n as i32, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
            if let Some(dt) = year_start {
                return DateSortKey::Instant(dt);
            }
        }
        DateSortKey::Number(n)
    }

    fn class_rank(&self) -> u8 {
        match self {
            DateSortKey::Number(_) => 0,
            DateSortKey::Instant(_) => 1,
            DateSortKey::IsoWeek(..) => 2,
            DateSortKey::Weekday(_) => 3,
            DateSortKey::Text(_) => 4,
        }
    }
}

impl Eq for DateSortKey {}

impl PartialOrd for DateSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DateSortKey::Number(a), DateSortKey::Number(b)) => a.total_cmp(b),
            (DateSortKey::Instant(a), DateSortKey::Instant(b)) => a.cmp(b),
            (DateSortKey::IsoWeek(ya, wa), DateSortKey::IsoWeek(yb, wb)) => {
                ya.cmp(yb).then(wa.cmp(wb))
            }
            (DateSortKey::Weekday(a), DateSortKey::Weekday(b)) => a.cmp(b),
            (DateSortKey::Text(a), DateSortKey::Text(b)) => a.cmp(b),
            _ => self.class_rank().cmp(&other.class_rank()),
        }
    }
}

/// Compares two date-like cells in the given direction. Never panics.
pub fn compare_dates(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    compare_keys(DateSortKey::of(a).as_ref(), DateSortKey::of(b).as_ref(), direction)
}

/// The default (newest first) comparator.
pub fn compare_dates_desc(a: &CellValue, b: &CellValue) -> Ordering {
    compare_dates(a, b, SortDirection::Descending)
}

fn compare_keys(
    a: Option<&DateSortKey>,
    b: Option<&DateSortKey>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ka), Some(kb)) => match direction {
            SortDirection::Ascending => ka.cmp(kb),
            SortDirection::Descending => kb.cmp(ka),
        },
    }
}

/// Stable-sorts rows chronologically by one column. Keys are computed once per row.
pub fn sort_rows_by_column(rows: &mut Vec<Row>, column_index: usize, direction: SortDirection) {
    let mut keyed: Vec<(Option<DateSortKey>, Row)> = rows
        .drain(..)
        .map(|row| (row.get(column_index).and_then(DateSortKey::of), row))
        .collect();
    keyed.sort_by(|(ka, _), (kb, _)| compare_keys(ka.as_ref(), kb.as_ref(), direction));
    rows.extend(keyed.into_iter().map(|(_, row)| row));
}
