//! Canonical policy record shared by every retrieval source.
//!
//! Records from the local store, the national youth-policy catalog, and the
//! hybrid index all normalize into [`PolicyRecord`] before they reach the
//! ranking and assembly stages, so downstream code never branches on where
//! a record came from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::category::Category;

/// Region marker for policies open to every Seoul resident
pub const REGION_WIDE: &str = "서울시 전체";

/// Region marker for nationwide catalog policies
pub const REGION_NATIONAL: &str = "전국";

/// The 25 Seoul administrative districts, short name to standard name.
/// Declaration order matches the official district listing.
const SEOUL_DISTRICTS: [(&str, &str); 25] = [
    ("강남", "강남구"),
    ("강동", "강동구"),
    ("강북", "강북구"),
    ("강서", "강서구"),
    ("관악", "관악구"),
    ("광진", "광진구"),
    ("구로", "구로구"),
    ("금천", "금천구"),
    ("노원", "노원구"),
    ("도봉", "도봉구"),
    ("동대문", "동대문구"),
    ("동작", "동작구"),
    ("마포", "마포구"),
    ("서대문", "서대문구"),
    ("서초", "서초구"),
    ("성동", "성동구"),
    ("성북", "성북구"),
    ("송파", "송파구"),
    ("양천", "양천구"),
    ("영등포", "영등포구"),
    ("용산", "용산구"),
    ("은평", "은평구"),
    ("종로", "종로구"),
    ("중구", "중구"),
    ("중랑", "중랑구"),
];

/// Lifecycle status derived from a policy's application/program periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// Applications are being accepted
    Open,
    /// Application window has not started yet
    Upcoming,
    /// Application window has passed
    Closed,
    /// Rolling admission, no window to pass
    Ongoing,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Open => "open",
            PolicyStatus::Upcoming => "upcoming",
            PolicyStatus::Closed => "closed",
            PolicyStatus::Ongoing => "ongoing",
        }
    }

    /// Korean display label
    pub fn label(&self) -> &'static str {
        match self {
            PolicyStatus::Open => "진행중",
            PolicyStatus::Upcoming => "신청 예정",
            PolicyStatus::Closed => "만료됨",
            PolicyStatus::Ongoing => "상시모집",
        }
    }
}

impl Default for PolicyStatus {
    fn default() -> Self {
        PolicyStatus::Open
    }
}

/// Applicant constraints a policy declares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_condition: Option<String>,
}

impl Eligibility {
    /// True when `age` falls inside the declared window. Policies that
    /// declare no (or only half a) window accept every age.
    pub fn admits_age(&self, age: u8) -> bool {
        match (self.age_min, self.age_max) {
            (Some(min), Some(max)) => age >= min && age <= max,
            _ => true,
        }
    }

    /// True unless the policy is student-only and the applicant is not one
    pub fn admits_student(&self, student: Option<bool>) -> bool {
        match (self.student, student) {
            (Some(true), Some(is_student)) => is_student,
            _ => true,
        }
    }
}

/// What the policy pays or provides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    /// Amount in KRW when one could be extracted from the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Application channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyChannel {
    #[default]
    Online,
    Offline,
    Both,
}

/// How to apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyMethod {
    pub method: ApplyChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Canonical policy record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Stable source-qualified id, e.g. `seoul_성북_3fa8c1d2`
    pub id: String,
    pub title: String,
    pub agency: String,
    /// One of the 25 district names, [`REGION_WIDE`], or [`REGION_NATIONAL`]
    pub region: String,
    /// Never empty; [`Category::Other`] is the catch-all
    pub categories: Vec<Category>,
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub eligibility: Eligibility,
    #[serde(default)]
    pub benefit: Benefit,
    #[serde(default)]
    pub apply_method: ApplyMethod,
    /// Raw application-period text as published by the source
    #[serde(default)]
    pub application_period_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub status: PolicyStatus,
    pub source_name: String,
    pub source_url: String,
    pub updated_at: DateTime<Utc>,
}

impl PolicyRecord {
    /// Region check used by store predicates: a record matches a district
    /// either exactly or by being region-wide/national.
    pub fn serves_region(&self, region: &str) -> bool {
        self.region == region || self.region == REGION_WIDE || self.region == REGION_NATIONAL
    }
}

/// Requester profile attached to a query. All fields optional; absent
/// fields simply widen the search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
}

/// Normalize free-form region text to a standard district name.
///
/// Full district names win over short forms, and district matches win over
/// the region-wide keywords (so "서울시 성북구" resolves to 성북구, not
/// [`REGION_WIDE`]). Unrecognized text passes through unchanged.
pub fn normalize_region_name(region_text: &str) -> String {
    for (_, standard) in SEOUL_DISTRICTS {
        if region_text.contains(standard) {
            return standard.to_string();
        }
    }
    for (short, standard) in SEOUL_DISTRICTS {
        if region_text.contains(short) {
            return standard.to_string();
        }
    }
    if ["서울시", "서울 전체", "전 지역"]
        .iter()
        .any(|kw| region_text.contains(kw))
    {
        return REGION_WIDE.to_string();
    }
    region_text.to_string()
}

/// Derive a stable policy id from its identifying fields.
///
/// Format: `seoul_<agency-code>_<hash8>` where the agency code strips the
/// 구청/시 suffixes and keeps up to three characters.
pub fn policy_id(title: &str, agency: &str, url: &str) -> String {
    let identifier = format!("{}_{}_{}", agency, title, url);
    let hash = fnv1a_64(identifier.as_bytes());
    let agency_code: String = agency
        .replace("구청", "")
        .replace('시', "")
        .chars()
        .take(3)
        .collect();
    format!("seoul_{}_{:08x}", agency_code, (hash & 0xffff_ffff) as u32)
}

/// FNV-1a 64-bit hash, enough for id derivation
fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
