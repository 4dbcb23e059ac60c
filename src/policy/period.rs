//! Application-period text parsing.
//!
//! Sources publish periods as free text: "2025.01.01~2025.12.31",
//! "2025년 3월 1일부터", "상시모집", sometimes nothing at all. This module
//! turns that text into a date window without ever failing the caller;
//! text we cannot read is [`ParsedPeriod::Unknown`], never an error.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Markers that mean applications are accepted year-round
pub const ROLLING_MARKERS: [&str; 4] = ["상시", "연중", "수시", "계속"];

// YYYY.MM.DD / YYYY-MM-DD / YYYY/MM/DD
static FULL_YEAR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[.\-/](\d{1,2})[.\-/](\d{1,2})").expect("date pattern compiles")
});

// YYYY년 MM월 DD일
static KOREAN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일").expect("date pattern compiles")
});

// YY.MM.DD, two-digit year
static SHORT_YEAR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})[.\-/](\d{1,2})[.\-/](\d{1,2})").expect("date pattern compiles")
});

/// Outcome of parsing a period text.
///
/// Rolling admission is a terminal, non-temporal case and is kept distinct
/// from text that simply had no dates in it; the expiry classifier treats
/// the two differently even though both carry no window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPeriod {
    /// A rolling-admission marker matched; there is no window to pass
    Rolling,
    /// At least one date was found. A single date is a deadline, so
    /// `start` may be absent while `end` is set.
    Window {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Nothing datelike in the text
    Unknown,
}

impl ParsedPeriod {
    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            ParsedPeriod::Window { start, .. } => *start,
            _ => None,
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            ParsedPeriod::Window { end, .. } => *end,
            _ => None,
        }
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self, ParsedPeriod::Rolling)
    }
}

/// Parse free-form period text into a date window.
///
/// All three date patterns are collected over the whole text; with two or
/// more hits the window is (earliest, latest), a single hit is taken as a
/// deadline. The two-digit-year form pivots at 50 (24 is 2024, 97 is 1997).
pub fn parse_period(text: &str) -> ParsedPeriod {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "N/A" {
        return ParsedPeriod::Unknown;
    }

    if ROLLING_MARKERS.iter().any(|marker| trimmed.contains(marker)) {
        return ParsedPeriod::Rolling;
    }

    let mut dates = collect_dates(trimmed);
    if dates.is_empty() {
        tracing::debug!(text = trimmed, "no parseable dates in period text");
        return ParsedPeriod::Unknown;
    }

    dates.sort_unstable();
    if dates.len() >= 2 {
        ParsedPeriod::Window {
            start: dates.first().copied(),
            end: dates.last().copied(),
        }
    } else {
        ParsedPeriod::Window {
            start: None,
            end: dates.first().copied(),
        }
    }
}

/// Every date any of the three patterns can read out of the text.
/// The patterns overlap on purpose (a four-digit year also satisfies the
/// two-digit form); duplicates are harmless under the min/max rule.
fn collect_dates(text: &str) -> Vec<NaiveDate> {
    let mut dates = Vec::new();

    for caps in FULL_YEAR_DATE.captures_iter(text) {
        push_date(&mut dates, &caps[1], &caps[2], &caps[3]);
    }
    for caps in KOREAN_DATE.captures_iter(text) {
        push_date(&mut dates, &caps[1], &caps[2], &caps[3]);
    }
    for caps in SHORT_YEAR_DATE.captures_iter(text) {
        push_date(&mut dates, &caps[1], &caps[2], &caps[3]);
    }

    dates
}

fn push_date(dates: &mut Vec<NaiveDate>, year: &str, month: &str, day: &str) {
    let (Ok(mut year), Ok(month), Ok(day)) = (
        year.parse::<i32>(),
        month.parse::<u32>(),
        day.parse::<u32>(),
    ) else {
        return;
    };

    // two-digit years: < 50 is 20xx, >= 50 is 19xx
    if year < 100 {
        year += if year < 50 { 2000 } else { 1900 };
    }

    // calendar-invalid matches (month 13, day 32) are skipped
    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        dates.push(date);
    }
}
