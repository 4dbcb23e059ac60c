//! Store-backed retrieval source.
//!
//! Wraps a [`PolicyStore`] and answers engine queries with typed
//! [`PolicyRecord`]s. Rows carry their nested fields as JSON text; a row
//! whose JSON fails to decode is kept with defaults rather than dropped.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::errors::SourceError;
use crate::policy::record::{ApplyMethod, Benefit, Eligibility, PolicyRecord, UserContext};
use crate::policy::Category;

use super::{PolicyRow, PolicyStore, StoreFilter};

/// Retrieval source over the local policy store
#[derive(Clone)]
pub struct LocalStoreSearch {
    store: Arc<dyn PolicyStore>,
}

impl LocalStoreSearch {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// Search valid local policies matching `query` and the caller's profile.
    pub async fn search(
        &self,
        query: &str,
        user: &UserContext,
        limit: usize,
    ) -> Result<Vec<PolicyRecord>, SourceError> {
        let keyword = Some(query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let filter = StoreFilter {
            keyword,
            age: user.age,
            region: user.region.clone(),
            student: user.student,
            limit,
        };

        let rows = self.store.search(&filter).await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}

/// Rebuild a typed record from its row encoding.
pub fn row_to_record(row: PolicyRow) -> PolicyRecord {
    let eligibility: Eligibility = parse_json_field(&row.id, "eligibility", row.eligibility);
    let benefit: Benefit = parse_json_field(&row.id, "benefit", row.benefit);
    let apply_method: ApplyMethod = parse_json_field(&row.id, "apply_method", row.apply_method);

    let mut categories: Vec<Category> = row
        .categories
        .iter()
        .filter_map(|label| Category::from_label(label))
        .collect();
    if categories.is_empty() {
        categories.push(Category::Other);
    }

    PolicyRecord {
        id: row.id,
        title: row.title,
        agency: row.agency,
        region: row.region,
        categories,
        summary: row.summary,
        body: row.body,
        eligibility,
        benefit,
        apply_method,
        application_period_text: row.application_period_text,
        period_start: row.period_start,
        period_end: row.period_end,
        status: row.status,
        source_name: row.source_name,
        source_url: row.source_url,
        updated_at: row.updated_at,
    }
}

fn parse_json_field<T: DeserializeOwned + Default>(
    row_id: &str,
    field: &str,
    text: Option<String>,
) -> T {
    let Some(text) = text else {
        return T::default();
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(row_id, field, error = %e, "undecodable row field, using defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyStatus;
    use crate::store::InMemoryStore;
    use chrono::Utc;

    fn seeded_row(id: &str, title: &str) -> PolicyRow {
        PolicyRow {
            id: id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            body: String::new(),
            agency: "성북구청".to_string(),
            region: "성북구".to_string(),
            categories: vec!["주거".to_string()],
            eligibility: None,
            benefit: None,
            apply_method: None,
            application_period_text: "상시모집".to_string(),
            period_start: None,
            period_end: None,
            status: PolicyStatus::Ongoing,
            source_name: "서울청년포털".to_string(),
            source_url: "https://youth.seoul.go.kr".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_search_maps_rows_to_records() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_row(seeded_row("p1", "청년 월세 지원")).await;
        let source = LocalStoreSearch::new(store);

        let records = source
            .search("월세", &UserContext::default(), 5)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].categories, vec![Category::Housing]);
        assert_eq!(records[0].status, PolicyStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_blank_query_searches_without_keyword() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_row(seeded_row("p1", "청년 월세 지원")).await;
        store.insert_row(seeded_row("p2", "창업 교육")).await;
        let source = LocalStoreSearch::new(store);

        let records = source
            .search("   ", &UserContext::default(), 0)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_profile_narrows_search() {
        let store = Arc::new(InMemoryStore::new());
        let mut local = seeded_row("p1", "성북 청년 지원");
        local.region = "성북구".to_string();
        store.insert_row(local).await;
        let mut elsewhere = seeded_row("p2", "강남 청년 지원");
        elsewhere.region = "강남구".to_string();
        store.insert_row(elsewhere).await;

        let source = LocalStoreSearch::new(store);
        let user = UserContext {
            region: Some("성북구".to_string()),
            ..Default::default()
        };
        let records = source.search("청년", &user, 0).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "p1");
    }

    #[test]
    fn test_row_to_record_defaults_on_broken_json() {
        let mut row = seeded_row("p1", "청년 정책");
        row.eligibility = Some("{not json".to_string());
        row.benefit = Some("also broken".to_string());

        let record = row_to_record(row);
        assert_eq!(record.eligibility, Eligibility::default());
        assert_eq!(record.benefit, Benefit::default());
    }

    #[test]
    fn test_unknown_category_label_falls_back_to_other() {
        let mut row = seeded_row("p1", "청년 정책");
        row.categories = vec!["없는분류".to_string()];

        let record = row_to_record(row);
        assert_eq!(record.categories, vec![Category::Other]);
    }
}
