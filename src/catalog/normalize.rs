//! Catalog-to-record normalization.
//!
//! Raw catalog entries arrive with portal field names, free-text periods,
//! and no structured eligibility. This module maps them onto
//! [`PolicyRecord`], deriving category, age window, benefit amount, and
//! freshness on the way. Entries whose application or program period has
//! already passed are dropped here so no expired policy crosses into the
//! engine.

use chrono::{NaiveDate, Utc};

use crate::policy::expiry;
use crate::policy::extract::{extract_monetary_amount, parse_age_condition};
use crate::policy::record::{ApplyChannel, ApplyMethod, Benefit, Eligibility};
use crate::policy::{
    normalize_region_name, policy_id, Category, PolicyRecord, PolicyStatus, REGION_NATIONAL,
    REGION_WIDE,
};

use super::types::RawPolicyItem;

/// Source label stamped on every normalized catalog record
pub const CATALOG_SOURCE: &str = "온통청년";

const PORTAL_URL: &str = "https://www.youthcenter.go.kr";

/// Normalize one catalog entry, returning `None` when it is already closed.
pub fn normalize_item(item: &RawPolicyItem, today: NaiveDate) -> Option<PolicyRecord> {
    let program_period = Some(item.program_period.as_str()).filter(|p| !p.trim().is_empty());
    let verdict = expiry::classify(&item.application_period, program_period, today);
    if verdict.status == PolicyStatus::Closed {
        return None;
    }

    let id = match item.native_id() {
        Some(native) => format!("youthcenter_{}", native),
        None => policy_id(&item.title, &item.agency, &item.detail_url),
    };

    let analysis_text = format!("{} {}", item.support_content, item.support_target);
    let category = Category::classify(&item.title, &analysis_text);

    let (age_min, age_max) = parse_age_condition(&item.support_target);

    let source_url = if item.detail_url.trim().is_empty() {
        PORTAL_URL.to_string()
    } else {
        item.detail_url.clone()
    };

    Some(PolicyRecord {
        id,
        title: item.title.clone(),
        agency: item.agency.clone(),
        region: detect_region(&item.support_target),
        categories: vec![category],
        summary: item.support_target.clone(),
        body: build_body(item),
        eligibility: Eligibility {
            age_min,
            age_max,
            student: None,
            income_condition: None,
        },
        benefit: Benefit {
            amount: extract_monetary_amount(&item.support_content),
            description: Some(item.support_content.clone()).filter(|c| !c.trim().is_empty()),
        },
        apply_method: ApplyMethod {
            method: ApplyChannel::Online,
            url: Some(source_url.clone()),
        },
        application_period_text: item.application_period.clone(),
        period_start: verdict.period.start(),
        period_end: verdict.period.end(),
        status: verdict.status,
        source_name: CATALOG_SOURCE.to_string(),
        source_url,
        updated_at: Utc::now(),
    })
}

/// District mentioned in the eligibility text, Seoul-wide when only the
/// city is named, national otherwise.
fn detect_region(target_text: &str) -> String {
    let region = normalize_region_name(target_text);
    if region != target_text {
        return region;
    }
    if target_text.contains("서울") {
        return REGION_WIDE.to_string();
    }
    REGION_NATIONAL.to_string()
}

fn build_body(item: &RawPolicyItem) -> String {
    let mut lines = Vec::new();
    for (label, value) in [
        ("지원대상", &item.support_target),
        ("지원내용", &item.support_content),
        ("신청방법", &item.application_method),
        ("기타사항", &item.extra),
    ] {
        if !value.trim().is_empty() {
            lines.push(format!("{}: {}", label, value.trim()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn sample_item() -> RawPolicyItem {
        RawPolicyItem {
            biz_id: "R2025001".to_string(),
            title: "청년 월세 지원".to_string(),
            agency: "서울특별시".to_string(),
            support_target: "만 19세 이상 34세 이하 성북구 거주 무주택 청년".to_string(),
            support_content: "월 20만원 임차료 지원".to_string(),
            application_period: "2025.01.01~2025.12.31".to_string(),
            application_method: "온라인 신청".to_string(),
            detail_url: "https://www.youthcenter.go.kr/go/R2025001".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_fills_derived_fields() {
        let record = normalize_item(&sample_item(), fixed_today()).unwrap();

        assert_eq!(record.id, "youthcenter_R2025001");
        assert_eq!(record.region, "성북구");
        assert_eq!(record.categories, vec![Category::Housing]);
        assert_eq!(record.eligibility.age_min, Some(19));
        assert_eq!(record.eligibility.age_max, Some(34));
        assert_eq!(record.benefit.amount, Some(200_000));
        assert_eq!(record.status, PolicyStatus::Open);
        assert_eq!(
            record.period_end,
            Some(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
        );
        assert_eq!(record.source_name, CATALOG_SOURCE);
        assert!(record.body.contains("지원대상"));
        assert!(record.body.contains("신청방법: 온라인 신청"));
    }

    #[test]
    fn test_expired_item_dropped() {
        let mut item = sample_item();
        item.application_period = "2024.01.01~2024.12.31".to_string();
        assert!(normalize_item(&item, fixed_today()).is_none());
    }

    #[test]
    fn test_program_period_can_close_rolling_policy() {
        let mut item = sample_item();
        item.application_period = "상시모집".to_string();
        item.program_period = "2024.01.01~2024.06.30".to_string();
        assert!(normalize_item(&item, fixed_today()).is_none());
    }

    #[test]
    fn test_rolling_item_survives_as_ongoing() {
        let mut item = sample_item();
        item.application_period = "상시모집".to_string();
        let record = normalize_item(&item, fixed_today()).unwrap();
        assert_eq!(record.status, PolicyStatus::Ongoing);
    }

    #[test]
    fn test_region_detection() {
        let mut item = sample_item();

        item.support_target = "서울 거주 청년".to_string();
        let record = normalize_item(&item, fixed_today()).unwrap();
        assert_eq!(record.region, REGION_WIDE);

        item.support_target = "만 19세~39세 청년".to_string();
        let record = normalize_item(&item, fixed_today()).unwrap();
        assert_eq!(record.region, REGION_NATIONAL);
    }

    #[test]
    fn test_missing_ids_fall_back_to_derived_id() {
        let mut item = sample_item();
        item.biz_id = String::new();
        item.biz_code = String::new();
        let record = normalize_item(&item, fixed_today()).unwrap();
        assert!(record.id.starts_with("seoul_"));
    }

    #[test]
    fn test_blank_detail_url_falls_back_to_portal() {
        let mut item = sample_item();
        item.detail_url = String::new();
        let record = normalize_item(&item, fixed_today()).unwrap();
        assert_eq!(record.source_url, PORTAL_URL);
    }
}
