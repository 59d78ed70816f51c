//! FILENAME: core/result-model/src/date.rs
//! PURPOSE: Date parsing and precision bucketing shared by sort, filter and pivot.
//! CONTEXT: Upstream data mixes unix timestamps, ISO dates, month/year labels,
//! quarter labels, ISO week labels and weekday names. All conversions here are
//! total: anything unparseable comes back as `None`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::column::{DatePrecision, DateRepr};

static ISO_WEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").expect("valid ISO week pattern"));

static QUARTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(\d{4})\s*-?\s*Q([1-4])|Q([1-4])\s*'?\s*(\d{4}))$")
        .expect("valid quarter pattern")
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year pattern"));

/// "Jan 2021", "March 2021". Checked ahead of the day-bearing formats, which
/// would otherwise read the year's leading digits as a day.
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+\.?\s+\d{4}$").expect("valid month-year pattern"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

// Month/year labels carry no day; they are parsed with a day of 1 prepended.
const MONTH_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y"];

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub const MONTH_SHORT_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label style for month names in calendar pivots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthLabelStyle {
    #[default]
    Full,
    Short,
}

/// Returns the label for a 1-based month, or `None` outside 1..=12.
pub fn month_label(month: u32, style: MonthLabelStyle) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    match style {
        MonthLabelStyle::Full => MONTH_NAMES.get(idx).copied(),
        MonthLabelStyle::Short => MONTH_SHORT_NAMES.get(idx).copied(),
    }
}

/// Resolves a month label (full or short, any case) to its 1-based number.
pub fn month_from_label(label: &str) -> Option<u32> {
    let needle = label.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .zip(MONTH_SHORT_NAMES.iter())
        .position(|(full, short)| full.to_lowercase() == needle || short.to_lowercase() == needle)
        .map(|i| i as u32 + 1)
}

// ============================================================================
// PARSING
// ============================================================================

/// Converts unix epoch seconds to a UTC datetime.
pub fn epoch_to_datetime(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

pub fn datetime_to_epoch(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

/// Parses calendar text (dates, datetimes, month/year, quarter and bare year
/// labels). ISO week labels and weekday names are handled separately.
pub fn parse_calendar_text(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if MONTH_YEAR_RE.is_match(s) {
        let normalized = format!("01 {}", s.replacen('.', "", 1));
        for format in MONTH_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
                return midnight(date);
            }
        }
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return midnight(date);
        }
    }

    if YEAR_RE.is_match(s) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).and_then(midnight);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return midnight(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01/{}", s), "%d/%m/%Y") {
        return midnight(date);
    }
    for format in MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {}", s), format) {
            return midnight(date);
        }
    }

    if let Some(caps) = QUARTER_RE.captures(s) {
        let (year, quarter) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(y), Some(q), _, _) => (y.as_str(), q.as_str()),
            (_, _, Some(q), Some(y)) => (y.as_str(), q.as_str()),
            _ => return None,
        };
        let year: i32 = year.parse().ok()?;
        let quarter: u32 = quarter.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1).and_then(midnight);
    }

    None
}

/// Parses an ISO week label such as "2021-W05" into (year, week).
pub fn parse_iso_week(text: &str) -> Option<(i32, u32)> {
    let caps = ISO_WEEK_RE.captures(text.trim())?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let week: u32 = caps.get(2)?.as_str().parse().ok()?;
    if (1..=53).contains(&week) {
        Some((year, week))
    } else {
        None
    }
}

/// Monday 00:00 of the given ISO week.
pub fn iso_week_start(year: i32, week: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).and_then(midnight)
}

/// Maps a weekday name (full or three-letter) to Sunday=1 .. Saturday=7.
pub fn weekday_ordinal(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    let key = lower.get(..3)?;
    let ordinal = match key {
        "sun" => 1,
        "mon" => 2,
        "tue" => 3,
        "wed" => 4,
        "thu" => 5,
        "fri" => 6,
        "sat" => 7,
        _ => return None,
    };
    // Reject words that merely start like a weekday ("month", "sunset").
    const FULL: [&str; 7] = [
        "sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
    ];
    if lower.len() == 3 || FULL[ordinal as usize - 1] == lower {
        Some(ordinal)
    } else {
        None
    }
}

/// Interprets a cell according to the column's declared date representation.
pub fn cell_to_datetime(cell: &CellValue, repr: DateRepr) -> Option<NaiveDateTime> {
    match repr {
        DateRepr::Epoch => match cell {
            CellValue::Text(s) if s.trim().parse::<f64>().is_err() => parse_calendar_text(s),
            other => other.as_number().and_then(epoch_to_datetime),
        },
        DateRepr::Calendar => match cell {
            CellValue::Null => None,
            CellValue::Number(n) => {
                // Bare years are the only meaningful numeric calendar value.
                if n.fract() == 0.0 && (1000.0..=9999.0).contains(n) {
                    NaiveDate::from_ymd_opt(*n as i32, 1, 1).and_then(midnight)
                } else {
                    None
                }
            }
            CellValue::Text(s) => parse_calendar_text(s)
                .or_else(|| parse_iso_week(s).and_then(|(y, w)| iso_week_start(y, w))),
        },
    }
}

// ============================================================================
// PRECISION BUCKETS
// ============================================================================

/// First instant of the precision bucket containing `dt`.
pub fn start_of(dt: NaiveDateTime, precision: DatePrecision) -> NaiveDateTime {
    let date = dt.date();
    let start = match precision {
        DatePrecision::Minute => date.and_hms_opt(dt.hour(), dt.minute(), 0),
        DatePrecision::Hour => date.and_hms_opt(dt.hour(), 0, 0),
        DatePrecision::Day => midnight(date),
        DatePrecision::Week => {
            let offset = date.weekday().num_days_from_monday() as i64;
            midnight(date - Duration::days(offset))
        }
        DatePrecision::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(midnight),
        DatePrecision::Quarter => {
            let first_month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1).and_then(midnight)
        }
        DatePrecision::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(midnight),
    };
    start.unwrap_or(dt)
}

/// Last second of the precision bucket containing `dt` (inclusive bound).
pub fn end_of(dt: NaiveDateTime, precision: DatePrecision) -> NaiveDateTime {
    let start = start_of(dt, precision);
    let next = match precision {
        DatePrecision::Minute => Some(start + Duration::minutes(1)),
        DatePrecision::Hour => Some(start + Duration::hours(1)),
        DatePrecision::Day => Some(start + Duration::days(1)),
        DatePrecision::Week => Some(start + Duration::weeks(1)),
        DatePrecision::Month => add_months(start, 1),
        DatePrecision::Quarter => add_months(start, 3),
        DatePrecision::Year => add_months(start, 12),
    };
    next.map(|n| n - Duration::seconds(1)).unwrap_or(dt)
}

fn add_months(dt: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let total = dt.year() * 12 + dt.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).and_then(midnight)
}

/// (year, 1-based month) of an instant.
pub fn year_month(dt: NaiveDateTime) -> (i32, u32) {
    (dt.year(), dt.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn parses_common_calendar_shapes() {
        assert_eq!(parse_calendar_text("2021-02-15"), Some(ymd(2021, 2, 15)));
        assert_eq!(parse_calendar_text("Jan 2021"), Some(ymd(2021, 1, 1)));
        assert_eq!(parse_calendar_text("March 2021"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_calendar_text("Feb. 2021"), Some(ymd(2021, 2, 1)));
        assert_eq!(parse_calendar_text("Jan 20 2021"), Some(ymd(2021, 1, 20)));
        assert_eq!(parse_calendar_text("Jan 20, 2021"), Some(ymd(2021, 1, 20)));
        assert_eq!(parse_calendar_text("20 Jan 2021"), Some(ymd(2021, 1, 20)));
        assert_eq!(parse_calendar_text("Smarch 2021"), None);
        assert_eq!(parse_calendar_text("2021-03"), Some(ymd(2021, 3, 1)));
        assert_eq!(parse_calendar_text("2021"), Some(ymd(2021, 1, 1)));
        assert_eq!(parse_calendar_text("2021-Q3"), Some(ymd(2021, 7, 1)));
        assert_eq!(parse_calendar_text("Q2 2020"), Some(ymd(2020, 4, 1)));
        assert_eq!(parse_calendar_text("02/15/2021"), Some(ymd(2021, 2, 15)));
        assert!(parse_calendar_text("2021-02-15T10:30:00Z").is_some());
        assert_eq!(parse_calendar_text("Monday"), None);
        assert_eq!(parse_calendar_text("2021-W05"), None);
        assert_eq!(parse_calendar_text(""), None);
    }

    #[test]
    fn iso_week_and_weekdays() {
        assert_eq!(parse_iso_week("2021-W05"), Some((2021, 5)));
        assert_eq!(parse_iso_week("2021-W60"), None);
        assert_eq!(iso_week_start(2021, 1), Some(ymd(2021, 1, 4)));
        assert_eq!(weekday_ordinal("Sunday"), Some(1));
        assert_eq!(weekday_ordinal("sat"), Some(7));
        assert_eq!(weekday_ordinal("month"), None);
    }

    #[test]
    fn epoch_cells_follow_declared_repr() {
        // 2021-02-15T00:00:00Z
        let cell = CellValue::Number(1_613_347_200.0);
        assert_eq!(cell_to_datetime(&cell, DateRepr::Epoch), Some(ymd(2021, 2, 15)));
        assert_eq!(cell_to_datetime(&cell, DateRepr::Calendar), None);
        let text = CellValue::text("1613347200");
        assert_eq!(cell_to_datetime(&text, DateRepr::Epoch), Some(ymd(2021, 2, 15)));
        assert_eq!(
            cell_to_datetime(&CellValue::text("2021-W05"), DateRepr::Calendar),
            Some(ymd(2021, 2, 1))
        );
    }

    #[test]
    fn bucket_bounds() {
        let dt = ymd(2021, 2, 15);
        assert_eq!(start_of(dt, DatePrecision::Month), ymd(2021, 2, 1));
        assert_eq!(end_of(dt, DatePrecision::Month), ymd(2021, 3, 1) - Duration::seconds(1));
        assert_eq!(start_of(dt, DatePrecision::Quarter), ymd(2021, 1, 1));
        assert_eq!(end_of(ymd(2021, 12, 5), DatePrecision::Year), ymd(2022, 1, 1) - Duration::seconds(1));
        // 2021-02-15 is a Monday
        assert_eq!(start_of(ymd(2021, 2, 17), DatePrecision::Week), dt);
    }

    #[test]
    fn month_labels_round_trip_through_lookup() {
        assert_eq!(month_label(2, MonthLabelStyle::Full), Some("February"));
        assert_eq!(month_label(13, MonthLabelStyle::Short), None);
        assert_eq!(month_from_label("feb"), Some(2));
        assert_eq!(month_from_label("December"), Some(12));
    }
}
