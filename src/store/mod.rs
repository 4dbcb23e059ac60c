//! Local policy store seam.
//!
//! The persistent store is an external collaborator. This module owns the
//! query contract ([`PolicyStore`]), the row shape it answers with, and the
//! search wrapper that turns rows into typed [`PolicyRecord`]s at the
//! boundary. An in-memory implementation backs tests and the CLI demo.

mod memory;
mod search;

pub use memory::InMemoryStore;
pub use search::LocalStoreSearch;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;
use crate::policy::record::PolicyRecord;
use crate::policy::PolicyStatus;

/// Source tag for store errors and logs
pub const STORE_SOURCE: &str = "local-store";

/// Predicates pushed down to the store. Absent fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFilter {
    /// Case-insensitive substring over title, summary, and body
    pub keyword: Option<String>,
    /// Applicant age; only records declaring a full age window filter on it
    pub age: Option<u8>,
    /// District name; region-wide records always match
    pub region: Option<String>,
    /// Applicant student status; `Some(false)` excludes student-only records
    pub student: Option<bool>,
    /// Row cap applied after ordering; 0 means no cap
    pub limit: usize,
}

/// One row as the store returns it: flat columns plus JSON-encoded nested
/// fields, matching the `policies` table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRow {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub agency: String,
    pub region: String,
    /// Category labels as stored (e.g. "주거")
    pub categories: Vec<String>,
    /// JSON text, decoded once at the search boundary
    pub eligibility: Option<String>,
    /// JSON text, decoded once at the search boundary
    pub benefit: Option<String>,
    /// JSON text, decoded once at the search boundary
    pub apply_method: Option<String>,
    pub application_period_text: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub status: PolicyStatus,
    pub source_name: String,
    pub source_url: String,
    pub updated_at: DateTime<Utc>,
}

/// Query contract against the relational policy store.
///
/// Implementations answer a filtered query over valid rows (not closed,
/// deadline not passed), title matches before recency, at most
/// `filter.limit` rows.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn search(&self, filter: &StoreFilter) -> Result<Vec<PolicyRow>, SourceError>;

    /// Cheap liveness probe for the doctor command
    async fn health_check(&self) -> bool;
}

/// Flatten a typed record into the store's row shape. Nested structs are
/// JSON-encoded the way the `policies` table stores them.
pub fn record_to_row(record: &PolicyRecord) -> PolicyRow {
    PolicyRow {
        id: record.id.clone(),
        title: record.title.clone(),
        summary: record.summary.clone(),
        body: record.body.clone(),
        agency: record.agency.clone(),
        region: record.region.clone(),
        categories: record
            .categories
            .iter()
            .map(|c| c.label().to_string())
            .collect(),
        eligibility: serde_json::to_string(&record.eligibility).ok(),
        benefit: serde_json::to_string(&record.benefit).ok(),
        apply_method: serde_json::to_string(&record.apply_method).ok(),
        application_period_text: record.application_period_text.clone(),
        period_start: record.period_start,
        period_end: record.period_end,
        status: record.status,
        source_name: record.source_name.clone(),
        source_url: record.source_url.clone(),
        updated_at: record.updated_at,
    }
}
