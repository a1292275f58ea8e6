use chrono::{Duration, NaiveDate};

/// Calendar dates covered by a catalog scan, newest first.
///
/// The window ends at `today` (inclusive) and spans `days` dates.
pub fn dates_in_window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days as i64)
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Fiscal year key of a period end such as `2024-03-31`.
///
/// Only the first four characters are read, so `2024/03/31` or `20240331`
/// resolve the same way.
pub fn fiscal_year(period_end: &str) -> Option<i32> {
    let prefix = period_end.trim().get(0..4)?;
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}
