//! Eligibility and benefit extraction from free text.
//!
//! Catalog records describe who qualifies and what is paid in prose
//! ("만 19세 이상 34세 이하", "월 20만원 지원"). These helpers pull the
//! structured pieces out; anything unreadable simply stays unstructured.

use regex::Regex;
use std::sync::LazyLock;

// 만 19세 이상 34세 이하
static AGE_BOUNDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"만?\s*(\d+)세\s*이상\s*(\d+)세\s*이하").expect("age pattern compiles")
});

// 19세 ~ 34세
static AGE_TILDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"만?\s*(\d+)세\s*~\s*(\d+)세").expect("age pattern compiles")
});

// 19세부터 34세까지
static AGE_FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)세\s*부터\s*(\d+)세\s*까지").expect("age pattern compiles")
});

// 19세 이상 (open-ended)
static AGE_MIN_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"만?\s*(\d+)세\s*이상").expect("age pattern compiles")
});

// 35세 미만 (exclusive upper bound)
static AGE_MAX_EXCLUSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)세\s*미만").expect("age pattern compiles")
});

// 100만원 / 1,000,000원 / 최대 300 / 월 20
static AMOUNT_MANWON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})*)\s*만원").expect("amount pattern compiles")
});
static AMOUNT_WON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})*)\s*원").expect("amount pattern compiles")
});
static AMOUNT_MAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"최대\s*(\d{1,3}(?:,\d{3})*)").expect("amount pattern compiles")
});
static AMOUNT_MONTHLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"월\s*(\d{1,3}(?:,\d{3})*)").expect("amount pattern compiles")
});

fn capture_age(caps: &regex::Captures<'_>, index: usize) -> Option<u8> {
    caps.get(index)?.as_str().parse().ok()
}

/// Extract an age window from eligibility text.
///
/// Bounded forms are tried before open-ended ones so "19세 이상 34세 이하"
/// does not stop at the 이상 clause. "N세 미만" is exclusive, so the bound
/// stored is N-1. Returns `(None, None)` when no form matches.
pub fn parse_age_condition(text: &str) -> (Option<u8>, Option<u8>) {
    if let Some(caps) = AGE_BOUNDED.captures(text) {
        return (capture_age(&caps, 1), capture_age(&caps, 2));
    }
    if let Some(caps) = AGE_TILDE.captures(text) {
        return (capture_age(&caps, 1), capture_age(&caps, 2));
    }
    if let Some(caps) = AGE_FROM_TO.captures(text) {
        return (capture_age(&caps, 1), capture_age(&caps, 2));
    }
    if let Some(caps) = AGE_MIN_ONLY.captures(text) {
        return (capture_age(&caps, 1), None);
    }
    if let Some(caps) = AGE_MAX_EXCLUSIVE.captures(text) {
        let max = capture_age(&caps, 1).and_then(|n| n.checked_sub(1));
        return (None, max);
    }
    (None, None)
}

/// Extract a monetary amount in KRW from benefit text.
///
/// The 만원 form multiplies by 10,000; the bare 최대/월 forms return the
/// number as written. First matching form wins.
pub fn extract_monetary_amount(text: &str) -> Option<i64> {
    if let Some(caps) = AMOUNT_MANWON.captures(text) {
        return parse_amount(caps.get(1)?.as_str()).map(|n| n * 10_000);
    }
    for pattern in [&*AMOUNT_WON, &*AMOUNT_MAX, &*AMOUNT_MONTHLY] {
        if let Some(caps) = pattern.captures(text) {
            return parse_amount(caps.get(1)?.as_str());
        }
    }
    None
}

fn parse_amount(digits: &str) -> Option<i64> {
    digits.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_age_range() {
        assert_eq!(parse_age_condition("만 19세 이상 34세 이하"), (Some(19), Some(34)));
        assert_eq!(parse_age_condition("19세 이상 39세 이하 청년"), (Some(19), Some(39)));
    }

    #[test]
    fn test_tilde_age_range() {
        assert_eq!(parse_age_condition("만 19세 ~ 34세"), (Some(19), Some(34)));
    }

    #[test]
    fn test_from_to_age_range() {
        assert_eq!(parse_age_condition("20세부터 29세까지"), (Some(20), Some(29)));
    }

    #[test]
    fn test_min_only() {
        assert_eq!(parse_age_condition("만 19세 이상"), (Some(19), None));
    }

    #[test]
    fn test_exclusive_max() {
        assert_eq!(parse_age_condition("35세 미만"), (None, Some(34)));
    }

    #[test]
    fn test_no_age_text() {
        assert_eq!(parse_age_condition("누구나 신청 가능"), (None, None));
    }

    #[test]
    fn test_amount_manwon() {
        assert_eq!(extract_monetary_amount("월 20만원 지원"), Some(200_000));
        assert_eq!(extract_monetary_amount("최대 300만원"), Some(3_000_000));
    }

    #[test]
    fn test_amount_plain_won() {
        assert_eq!(extract_monetary_amount("1,000,000원 일시 지급"), Some(1_000_000));
    }

    #[test]
    fn test_amount_bare_max() {
        assert_eq!(extract_monetary_amount("최대 120 한도"), Some(120));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_monetary_amount("현물 지급"), None);
    }
}
