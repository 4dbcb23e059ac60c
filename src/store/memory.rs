//! In-memory implementation of the store contract.
//!
//! Backs the integration tests and the CLI demo with the same predicate
//! and ordering behavior the relational store promises.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::cmp::Reverse;
use tokio::sync::RwLock;

use crate::errors::SourceError;
use crate::policy::record::PolicyRecord;
use crate::policy::PolicyStatus;

use super::{record_to_row, PolicyRow, PolicyStore, StoreFilter};

/// Vec-backed policy store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<PolicyRow>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with typed records (nested fields round-trip through
    /// their JSON row encoding, same as the real table)
    pub async fn insert_records(&self, records: &[PolicyRecord]) {
        let mut rows = self.rows.write().await;
        rows.extend(records.iter().map(record_to_row));
    }

    pub async fn insert_row(&self, row: PolicyRow) {
        self.rows.write().await.push(row);
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl PolicyStore for InMemoryStore {
    async fn search(&self, filter: &StoreFilter) -> Result<Vec<PolicyRow>, SourceError> {
        let today = Local::now().date_naive();
        let rows = self.rows.read().await;

        let keyword = filter
            .keyword
            .as_deref()
            .map(str::to_lowercase)
            .filter(|k| !k.is_empty());

        let mut hits: Vec<PolicyRow> = rows
            .iter()
            .filter(|row| row_matches(row, filter, keyword.as_deref(), today))
            .cloned()
            .collect();

        // title matches first, most recently updated next
        hits.sort_by_key(|row| {
            let title_rank = match &keyword {
                Some(k) if row.title.to_lowercase().contains(k.as_str()) => 0u8,
                _ => 1u8,
            };
            (title_rank, Reverse(row.updated_at))
        });

        if filter.limit > 0 {
            hits.truncate(filter.limit);
        }
        Ok(hits)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

fn row_matches(
    row: &PolicyRow,
    filter: &StoreFilter,
    keyword: Option<&str>,
    today: NaiveDate,
) -> bool {
    // validity: closed rows and passed deadlines never surface
    if row.status == PolicyStatus::Closed {
        return false;
    }
    if let Some(end) = row.period_end {
        if end < today {
            return false;
        }
    }

    if let Some(keyword) = keyword {
        let hit = row.title.to_lowercase().contains(keyword)
            || row.summary.to_lowercase().contains(keyword)
            || row.body.to_lowercase().contains(keyword);
        if !hit {
            return false;
        }
    }

    // eligibility constraints live in the JSON column
    if filter.age.is_some() || filter.student.is_some() {
        let eligibility = row
            .eligibility
            .as_deref()
            .and_then(|text| serde_json::from_str::<crate::policy::Eligibility>(text).ok())
            .unwrap_or_default();

        if let Some(age) = filter.age {
            if !eligibility.admits_age(age) {
                return false;
            }
        }
        if !eligibility.admits_student(filter.student) {
            return false;
        }
    }

    if let Some(region) = filter.region.as_deref() {
        let record_region = &row.region;
        let region_ok = record_region == region
            || record_region == crate::policy::REGION_WIDE
            || record_region == crate::policy::REGION_NATIONAL;
        if !region_ok {
            return false;
        }
    }

    true
}
