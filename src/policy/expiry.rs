//! Freshness classification for policy records.
//!
//! Decides whether a policy is open, upcoming, closed, or ongoing from its
//! application-period text, with the program period as a fallback closer
//! (agencies leave stale application text up after the program itself has
//! ended). Unreadable text classifies as open.

use chrono::{Local, NaiveDate};

use crate::policy::period::{parse_period, ParsedPeriod};
use crate::policy::record::PolicyStatus;

/// Remaining-day window that counts as closing soon
const CLOSING_SOON_DAYS: i64 = 7;

/// Freshness verdict for one policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    pub status: PolicyStatus,
    /// Days until the deadline, only while the policy is open
    pub remaining_days: Option<i64>,
    /// The parsed application window, for callers that also want the dates
    pub period: ParsedPeriod,
}

impl Expiry {
    /// Human label used in assembled context and CLI output
    pub fn status_label(&self) -> String {
        match self.status {
            PolicyStatus::Closed => "만료됨".to_string(),
            PolicyStatus::Ongoing => "상시모집".to_string(),
            PolicyStatus::Upcoming => "신청 예정".to_string(),
            PolicyStatus::Open => match self.remaining_days {
                Some(0) => "오늘 마감".to_string(),
                Some(n) if n <= CLOSING_SOON_DAYS => format!("마감 임박 ({}일)", n),
                Some(n) => format!("{}일 남음", n),
                None => "진행중".to_string(),
            },
        }
    }
}

/// Classify a policy's freshness as of `today`.
///
/// Order matters: a passed application deadline closes the policy, then a
/// passed program period closes it, then rolling admission keeps it ongoing,
/// then a future start makes it upcoming. Everything else is open.
pub fn classify(
    application_period: &str,
    program_period: Option<&str>,
    today: NaiveDate,
) -> Expiry {
    let period = parse_period(application_period);

    if let Some(end) = period.end() {
        if end < today {
            return Expiry {
                status: PolicyStatus::Closed,
                remaining_days: None,
                period,
            };
        }
    }

    if let Some(program_text) = program_period {
        if let Some(program_end) = parse_period(program_text).end() {
            if program_end < today {
                tracing::debug!(
                    program_period = program_text,
                    "program period has ended, closing policy"
                );
                return Expiry {
                    status: PolicyStatus::Closed,
                    remaining_days: None,
                    period,
                };
            }
        }
    }

    if period.is_rolling() {
        return Expiry {
            status: PolicyStatus::Ongoing,
            remaining_days: None,
            period,
        };
    }

    if let Some(start) = period.start() {
        if start > today {
            return Expiry {
                status: PolicyStatus::Upcoming,
                remaining_days: None,
                period,
            };
        }
    }

    let remaining_days = period.end().map(|end| (end - today).num_days());
    Expiry {
        status: PolicyStatus::Open,
        remaining_days,
        period,
    }
}

/// [`classify`] against the local calendar date
pub fn classify_today(application_period: &str, program_period: Option<&str>) -> Expiry {
    classify(application_period, program_period, Local::now().date_naive())
}
