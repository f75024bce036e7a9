//! Inclusive time windows and the filter applied with them.
//!
//! Windows compare at full timestamp precision. Boundary literals coming from
//! config files or the command line may be plain dates; those mean midnight
//! UTC of that day, so "through the end of the 24th" has to be spelled as a
//! timestamp late on the 24th (or as the 25th).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use super::event::Timestamped;
use crate::error::ContribError;

/// Naive date-time layouts accepted for window boundaries, interpreted as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// An inclusive `[after, before]` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// Earliest instant included.
    pub after: DateTime<Utc>,
    /// Latest instant included.
    pub before: DateTime<Utc>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl TimeWindow {
    /// Creates a window; `after` defaults to the Unix epoch and `before` to now.
    pub fn new(after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        Self {
            after: after.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            before: before.unwrap_or_else(Utc::now),
        }
    }

    /// Creates a window from optional boundary literals.
    pub fn parse(after: Option<&str>, before: Option<&str>) -> Result<Self, ContribError> {
        let after = after.map(parse_boundary).transpose()?;
        let before = before.map(parse_boundary).transpose()?;
        Ok(Self::new(after, before))
    }

    /// Returns true when `instant` lies inside the window, boundaries included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.after <= instant && instant <= self.before
    }
}

/// Returns the items created inside `window`, in their original order.
///
/// With no window every item survives.
pub fn time_filter<'a, T: Timestamped>(items: &'a [T], window: Option<&TimeWindow>) -> Vec<&'a T> {
    match window {
        Some(window) => items
            .iter()
            .filter(|item| window.contains(item.created_at()))
            .collect(),
        None => items.iter().collect(),
    }
}

/// Parses a window boundary literal.
///
/// Accepts RFC 3339, naive date-times (UTC), `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
/// Partial dates resolve to the first instant they denote.
pub fn parse_boundary(text: &str) -> Result<DateTime<Utc>, ContribError> {
    let text = text.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }

    parse_partial_date(text)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| ContribError::InvalidTimestamp(text.to_string()))
}

fn parse_partial_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = text.splitn(2, '-');
    let year = parts.next()?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;

    match parts.next() {
        None => NaiveDate::from_ymd_opt(year, 1, 1),
        Some(month) if month.len() == 2 => NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1),
        Some(_) => None,
    }
}
