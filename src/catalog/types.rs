//! Wire shapes of the national youth-policy catalog.
//!
//! The listing endpoint answers with a `youthPolicy` array whose field
//! names follow the portal's own abbreviations. Every field is optional
//! in practice, so all of them default to empty.

use serde::Deserialize;

/// One raw catalog entry as served by `youthPlcyList.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPolicyItem {
    #[serde(rename = "bizId")]
    pub biz_id: String,
    #[serde(rename = "polyBizSecd")]
    pub biz_code: String,
    /// Policy title
    #[serde(rename = "polyBizSjnm")]
    pub title: String,
    /// Portal-side realm classification code
    #[serde(rename = "polyRlmCd")]
    pub realm_code: String,
    /// Operating agency
    #[serde(rename = "cnsgNmor")]
    pub agency: String,
    /// Eligibility description (age ranges, residency, student status)
    #[serde(rename = "sporTarget")]
    pub support_target: String,
    /// Benefit description
    #[serde(rename = "sporCn")]
    pub support_content: String,
    /// Application period text
    #[serde(rename = "rqutPrdCn")]
    pub application_period: String,
    /// Program operating period text
    #[serde(rename = "bizPrdCn")]
    pub program_period: String,
    /// How to apply
    #[serde(rename = "rqutProcCn")]
    pub application_method: String,
    /// Detail page URL
    #[serde(rename = "rfcSiteUrla1")]
    pub detail_url: String,
    #[serde(rename = "etcCn")]
    pub extra: String,
}

impl RawPolicyItem {
    /// Source-native identifier, `bizId` preferred over the legacy code.
    pub fn native_id(&self) -> Option<&str> {
        if !self.biz_id.is_empty() {
            Some(&self.biz_id)
        } else if !self.biz_code.is_empty() {
            Some(&self.biz_code)
        } else {
            None
        }
    }
}

/// Top-level listing response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(rename = "youthPolicy", default)]
    pub youth_policy: Vec<RawPolicyItem>,
}
