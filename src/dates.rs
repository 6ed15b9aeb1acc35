//! Date-stamped header detection.
//!
//! Auxiliary exports version their data by putting a calendar date in the
//! column label itself (`DATE 15-11-2025`, `Status 2025/11/15`, ...). Any
//! header may carry one, so every header is scanned, not only those that
//! mention "date".

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

struct DatePatterns {
    day_first: Regex,
    year_first: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        day_first: Regex::new(r"(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})")
            .expect("day-first date pattern compiles"),
        year_first: Regex::new(r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})")
            .expect("year-first date pattern compiles"),
    })
}

pub fn parse_embedded_date(header: &str) -> Option<NaiveDate> {
    let patterns = patterns();
    for caps in patterns.day_first.captures_iter(header) {
        if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }
    for caps in patterns.year_first.captures_iter(header) {
        if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn date_columns(headers: &[String]) -> Vec<(&str, NaiveDate)> {
    headers
        .iter()
        .filter_map(|h| parse_embedded_date(h).map(|d| (h.as_str(), d)))
        .collect()
}

// Ties keep the earliest header.
pub fn find_latest_date_column(headers: &[String]) -> Option<(&str, NaiveDate)> {
    let mut latest: Option<(&str, NaiveDate)> = None;
    for (header, date) in date_columns(headers) {
        match latest {
            Some((_, best)) if date <= best => {}
            _ => latest = Some((header, date)),
        }
    }
    latest
}
