//! Client for the national youth-policy catalog (온통청년).
//!
//! The catalog is a keyword-paginated open-data endpoint. Quirks handled
//! here: an invalid or missing API key is answered with an HTML page and
//! HTTP 200 (treated as zero results), and expired policies are served
//! alongside live ones (dropped during normalization). Requests are spaced
//! by a fixed delay so keyword fan-out stays under the portal's rate limit.

pub mod normalize;
pub mod retry;
pub mod types;

pub use normalize::CATALOG_SOURCE;
pub use types::{CatalogPage, RawPolicyItem};

use std::collections::HashSet;
use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::SourceError;
use crate::policy::PolicyRecord;

use normalize::normalize_item;
use retry::RetryPolicy;

pub const DEFAULT_CATALOG_URL: &str = "https://www.youthcenter.go.kr/opi";

const SOURCE: &str = "catalog";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
const MAX_PAGE_SIZE: u32 = 100;
const KEYWORD_PAGE_SIZE: u32 = 20;

/// HTTP client for the catalog listing endpoint
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl CatalogClient {
    pub fn new(api_key: String) -> Self {
        Self::with_config(
            DEFAULT_CATALOG_URL.to_string(),
            api_key,
            DEFAULT_REQUEST_DELAY_MS,
        )
    }

    pub fn with_config(base_url: String, api_key: String, request_delay_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            api_key,
            request_delay: Duration::from_millis(request_delay_ms),
            retry: RetryPolicy::default(),
        }
    }

    /// Fetch one raw listing page. `display` is capped at the portal's
    /// 100-item page limit; an empty query lists without a search term.
    pub async fn search_page(
        &self,
        query: &str,
        page_index: u32,
        display: u32,
    ) -> Result<Vec<RawPolicyItem>, SourceError> {
        let url = format!("{}/youthPlcyList.do", self.base_url);

        let mut params = vec![
            ("openApiVlak", self.api_key.clone()),
            ("pageIndex", page_index.to_string()),
            ("display", display.min(MAX_PAGE_SIZE).to_string()),
        ];
        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }

        // Bound to a new name because tracing's macros shadow a caller
        // identifier named `display` with `tracing::field::display`.
        let display_count = display;
        debug!(page_index, display = display_count, query, "fetching catalog page");
        let page = self.retry.run(|| self.fetch_page(&url, &params)).await?;
        Ok(page.youth_policy)
    }

    async fn fetch_page(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<CatalogPage, SourceError> {
        let response = self.client.get(url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                source: SOURCE,
                reason: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().await?;

        decode_listing(&content_type, &body)
    }

    /// Search with one request per keyword, normalizing and deduplicating
    /// as results arrive. A failed keyword is logged and skipped; the
    /// remaining keywords still run. First occurrence of an id wins.
    pub async fn search_by_keywords(
        &self,
        keywords: &[String],
        max_results: usize,
    ) -> Result<Vec<PolicyRecord>, SourceError> {
        let today = Local::now().date_naive();
        let display = KEYWORD_PAGE_SIZE.min(max_results as u32);

        let mut seen = HashSet::new();
        let mut records: Vec<PolicyRecord> = Vec::new();

        'keywords: for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                sleep(self.request_delay).await;
            }

            let items = match self.search_page(keyword, 1, display).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "catalog keyword search failed, skipping");
                    continue;
                }
            };

            for item in &items {
                let Some(record) = normalize_item(item, today) else {
                    continue;
                };
                if !seen.insert(record.id.clone()) {
                    continue;
                }
                records.push(record);
                if records.len() >= max_results {
                    break 'keywords;
                }
            }
        }

        debug!(count = records.len(), "catalog search collected records");
        Ok(records)
    }

    /// Search with keywords derived from the requester's profile.
    pub async fn search_by_profile(
        &self,
        region: Option<&str>,
        age: Option<u8>,
        max_results: usize,
    ) -> Result<Vec<PolicyRecord>, SourceError> {
        let keywords = profile_keywords(region, age);
        debug!(?keywords, "profile-derived catalog keywords");
        self.search_by_keywords(&keywords, max_results).await
    }

    /// Transport-level reachability probe.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/youthPlcyList.do", self.base_url);
        self.client
            .get(&url)
            .query(&[("openApiVlak", self.api_key.as_str()), ("display", "1")])
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }
}

/// Decode one listing body by content type. Key failures come back as HTML
/// with status 200, so a non-JSON payload is zero results, not an error; a
/// JSON payload that does not parse is malformed.
fn decode_listing(content_type: &str, body: &str) -> Result<CatalogPage, SourceError> {
    if !content_type.contains("application/json") {
        warn!(
            content_type,
            "catalog answered with a non-JSON payload, treating as zero results"
        );
        return Ok(CatalogPage::default());
    }

    serde_json::from_str(body).map_err(|e| SourceError::MalformedPayload {
        source: SOURCE,
        detail: e.to_string(),
    })
}

/// Derive catalog search keywords from a requester profile.
///
/// A district-level region also searches the city name, and the age
/// bracket picks the themes that bracket actually applies for. With no
/// profile at all the four staple youth-policy themes are used.
pub fn profile_keywords(region: Option<&str>, age: Option<u8>) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    if let Some(region) = region {
        terms.push(region.to_string());
        if region.contains('구') && !region.contains("서울") {
            terms.push("서울".to_string());
        }
    }

    if let Some(age) = age {
        let bracket: &[&str] = if age <= 24 {
            &["대학생", "청년", "취업준비"]
        } else if age <= 29 {
            &["청년", "취업", "창업"]
        } else if age <= 34 {
            &["청년", "창업", "주거"]
        } else {
            &[]
        };
        terms.extend(bracket.iter().map(|s| s.to_string()));
    }

    if terms.is_empty() {
        terms = ["청년", "취업", "주거", "창업"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_keywords_district_adds_city() {
        let keywords = profile_keywords(Some("성북구"), None);
        assert_eq!(keywords, vec!["성북구", "서울"]);
    }

    #[test]
    fn test_profile_keywords_city_region_not_doubled() {
        let keywords = profile_keywords(Some("서울"), None);
        assert_eq!(keywords, vec!["서울"]);
    }

    #[test]
    fn test_profile_keywords_age_brackets() {
        assert_eq!(
            profile_keywords(None, Some(22)),
            vec!["대학생", "청년", "취업준비"]
        );
        assert_eq!(profile_keywords(None, Some(27)), vec!["청년", "취업", "창업"]);
        assert_eq!(profile_keywords(None, Some(33)), vec!["청년", "창업", "주거"]);
    }

    #[test]
    fn test_profile_keywords_default_set() {
        assert_eq!(
            profile_keywords(None, None),
            vec!["청년", "취업", "주거", "창업"]
        );
        // above every bracket, same as no age
        assert_eq!(
            profile_keywords(None, Some(40)),
            vec!["청년", "취업", "주거", "창업"]
        );
    }

    #[test]
    fn test_profile_keywords_region_and_age_combined() {
        let keywords = profile_keywords(Some("성북구"), Some(25));
        assert_eq!(keywords, vec!["성북구", "서울", "청년", "취업", "창업"]);
    }

    #[test]
    fn test_html_key_failure_page_decodes_to_zero_results() {
        // invalid or missing API key: HTML error page with HTTP 200
        let page = decode_listing(
            "text/html;charset=UTF-8",
            "<html><body>인증키가 유효하지 않습니다</body></html>",
        )
        .unwrap();
        assert!(page.youth_policy.is_empty());
    }

    #[test]
    fn test_json_listing_decodes() {
        let body = r#"{"youthPolicy":[{"bizId":"R2025001","polyBizSjnm":"청년 월세 지원"}]}"#;
        let page = decode_listing("application/json;charset=UTF-8", body).unwrap();
        assert_eq!(page.youth_policy.len(), 1);
        assert_eq!(page.youth_policy[0].title, "청년 월세 지원");
    }

    #[test]
    fn test_broken_json_listing_is_malformed() {
        let result = decode_listing("application/json", "{not json");
        assert!(matches!(
            result,
            Err(SourceError::MalformedPayload { source: "catalog", .. })
        ));
    }

    #[test]
    fn test_client_defaults() {
        let client = CatalogClient::new(String::new());
        assert_eq!(client.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(client.request_delay, Duration::from_millis(500));
    }

    #[tokio::test]
    #[ignore] // Requires network access and a valid catalog API key
    async fn test_search_page_integration() {
        let key = std::env::var("YOUTHY_CATALOG_KEY").unwrap_or_default();
        let client = CatalogClient::new(key);
        let items = client.search_page("청년취업", 1, 10).await.unwrap();
        // an invalid key degrades to the HTML path, which is still Ok
        assert!(items.len() <= 10);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_health_check_integration() {
        let client = CatalogClient::new(String::new());
        assert!(client.health_check().await);
    }
}
