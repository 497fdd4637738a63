//! Day/month fragments embedded in free-text bug descriptions
//!
//! Testers write things like "reported 09/01 by QA" without a year. The
//! year is inferred from a reference date: the current year, except that a
//! December entry read during January-June belongs to the previous year.
//! Nothing else is corrected, so this is only meaningful for entries less
//! than about a year old. A January entry read in December is NOT moved to
//! the next year.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,2})/([0-9]{1,2})").expect("valid day/month pattern"));

/// First `D/M` or `DD/MM` token in the text, as (day, month)
///
/// Values are not range checked: "45/13" yields (45, 13).
pub fn extract_day_month(text: &str) -> Option<(u32, u32)> {
    let captures = DAY_MONTH.captures(text)?;
    let day = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    Some((day, month))
}

/// Year a day/month entry is assumed to belong to, relative to `today`
pub fn infer_year(month: u32, today: NaiveDate) -> i32 {
    if today.month() <= 6 && month == 12 {
        today.year() - 1
    } else {
        today.year()
    }
}

/// Calendar date for a day/month pair, letting out-of-range values overflow
///
/// Month 13 is January of the next year, month 0 December of the previous
/// one; day 0 is the last day of the previous month and day 31 of a 30-day
/// month is the first of the next.
pub fn reported_date(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let year = infer_year(month, today);

    let months = year * 12 + month as i32 - 1;
    let first_of_month = NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)?;

    first_of_month.checked_add_signed(Duration::days(day as i64 - 1))
}

/// Milliseconds since the epoch of local midnight on the given date
pub fn local_day_start_millis(date: NaiveDate) -> Option<i64> {
    let midnight: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;

    // Midnight can fall inside a DST gap; the first valid instant after it is used then
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|instant| instant.timestamp_millis())
}

/// Comparable timestamp for the first day/month token in `text`
///
/// `None` when the text holds no such token.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<i64> {
    let (day, month) = extract_day_month(text)?;
    let date = reported_date(day, month, today)?;
    let millis = local_day_start_millis(date)?;

    log::trace!("Extracted date: {}/{} -> {} ({})", day, month, date, millis);
    Some(millis)
}
