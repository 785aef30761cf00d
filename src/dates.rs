// src/dates.rs

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

pub const MINUTES_IN_DAY: u32 = 24 * 60;

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Strict `YYYY-MM-DD` with a real calendar check.
fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if !value
        .chars()
        .enumerate()
        .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
    {
        return None;
    }
    let year: i32 = value[0..4].parse().ok()?;
    let month: u32 = value[5..7].parse().ok()?;
    let day: u32 = value[8..10].parse().ok()?;
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize an upstream or operator-typed date string to `YYYY-MM-DD`.
///
/// Precedence, first match wins:
/// 1. `YYYY-MM-DD`
/// 2. `YYYY/MM/DD`
/// 3. ISO datetime — the part before `T`
/// 4. `YYYY-MM-DD hh:mm:ss` — the part before the space
/// 5. `M/D/YYYY` (also `M-D-YYYY`)
///
/// Total function: anything else yields an empty string.
pub fn normalize_date_string(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(date) = parse_iso_date(trimmed) {
        return to_iso_date(date);
    }

    let dashed = trimmed.replace('/', "-");
    if let Some(date) = parse_iso_date(&dashed) {
        return to_iso_date(date);
    }

    if let Some(prefix) = dashed.split('T').next()
        && let Some(date) = parse_iso_date(prefix)
    {
        return to_iso_date(date);
    }

    if let Some(prefix) = dashed.split(' ').next()
        && let Some(date) = parse_iso_date(prefix)
    {
        return to_iso_date(date);
    }

    let parts: Vec<&str> = dashed.split('-').collect();
    if let [month, day, year] = parts.as_slice()
        && (1..=2).contains(&month.len())
        && (1..=2).contains(&day.len())
        && year.len() == 4
        && month.chars().all(|c| c.is_ascii_digit())
        && day.chars().all(|c| c.is_ascii_digit())
        && year.chars().all(|c| c.is_ascii_digit())
    {
        let iso = format!("{year}-{month:0>2}-{day:0>2}");
        if let Some(date) = parse_iso_date(&iso) {
            return to_iso_date(date);
        }
    }

    String::new()
}

/// Parse a date through [`normalize_date_string`], `None` when it does not
/// normalize.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let normalized = normalize_date_string(value);
    if normalized.is_empty() {
        None
    } else {
        parse_iso_date(&normalized)
    }
}

/// `H:MM` or `H:MM:SS` clock string to minutes since midnight.
pub fn parse_clock_minutes(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let mut parts = trimmed.split(':');
    let hours_raw = parts.next()?;
    let minutes_raw = parts.next()?;
    let seconds_raw = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if hours_raw.len() > 2 || !all_digits(hours_raw) {
        return None;
    }
    if minutes_raw.len() != 2 || !all_digits(minutes_raw) {
        return None;
    }
    if let Some(seconds) = seconds_raw
        && (seconds.len() != 2 || !all_digits(seconds))
    {
        return None;
    }

    let hours: u32 = hours_raw.parse().ok()?;
    let minutes: u32 = minutes_raw.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes since midnight to `HH:MM`, wrapping across day boundaries.
pub fn format_minutes_to_clock(value: i64) -> String {
    let normalized = value.rem_euclid(MINUTES_IN_DAY as i64) as u32;
    format!("{:02}:{:02}", normalized / 60, normalized % 60)
}

/// Re-shape a loose clock string to `HH:MM`, dropping seconds.
pub fn normalize_time_input(value: &str) -> Option<String> {
    parse_clock_minutes(value).map(|minutes| format_minutes_to_clock(minutes as i64))
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let minutes = parse_clock_minutes(value)?;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

/* ============================================================
   Calendar boundaries (Monday-first weeks, used by the range
   filter presets)
   ============================================================ */

pub fn start_of_week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn end_of_week_monday(date: NaiveDate) -> NaiveDate {
    start_of_week_monday(date) + Duration::days(6)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(date)
}
