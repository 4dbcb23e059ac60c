//! Multi-source retrieval orchestration.
//!
//! One [`RetrievalEngine`] is built at startup and shared by handle; it owns
//! the local store search, the external catalog seam and the hybrid retriever
//! and runs the whole pipeline for each query: local-first search, a gated
//! concurrent fan-out to the slower sources, cross-source merge/rank, and
//! context assembly. Every source failure is absorbed as an empty result set,
//! so a query always yields a usable (possibly sentinel) context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::CatalogClient;
use crate::context::{self, Citation};
use crate::errors::SourceError;
use crate::hybrid::HybridRetriever;
use crate::policy::{Category, PolicyRecord, UserContext};
use crate::ranking::{merge_and_rank, Candidate, Origin, DEFAULT_RESULT_CAP};
use crate::store::LocalStoreSearch;

/// Records requested from the local store per query.
pub const LOCAL_LIMIT: usize = 5;
/// Local hits at or above which the external fan-out is skipped.
pub const LOCAL_SUFFICIENT: usize = 3;
/// Records requested from the external catalog per query.
pub const EXTERNAL_LIMIT: usize = 10;
/// Candidates requested from the hybrid retriever per query.
pub const HYBRID_TOP_K: usize = 10;
/// Shared deadline for the concurrent fan-out branches.
pub const FANOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// External catalog seam. [`CatalogClient`] is the production
/// implementation; tests substitute in-process stubs.
#[async_trait]
pub trait ExternalSource: Send + Sync {
    /// Search the catalog with keywords derived from the requester's profile.
    async fn search_by_profile(
        &self,
        region: Option<&str>,
        age: Option<u8>,
        max_results: usize,
    ) -> Result<Vec<PolicyRecord>, SourceError>;
}

#[async_trait]
impl ExternalSource for CatalogClient {
    async fn search_by_profile(
        &self,
        region: Option<&str>,
        age: Option<u8>,
        max_results: usize,
    ) -> Result<Vec<PolicyRecord>, SourceError> {
        CatalogClient::search_by_profile(self, region, age, max_results).await
    }
}

/// Tuning knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub local_limit: usize,
    pub local_sufficient: usize,
    pub external_limit: usize,
    pub hybrid_top_k: usize,
    pub result_cap: usize,
    pub fanout_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            local_limit: LOCAL_LIMIT,
            local_sufficient: LOCAL_SUFFICIENT,
            external_limit: EXTERNAL_LIMIT,
            hybrid_top_k: HYBRID_TOP_K,
            result_cap: DEFAULT_RESULT_CAP,
            fanout_timeout: FANOUT_TIMEOUT,
        }
    }
}

/// Citation-ready answer material for one query. The caller hands
/// `context_text` to a generation step; this engine never writes prose.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub query_id: Uuid,
    pub context_text: String,
    pub citations: Vec<Citation>,
    pub categories_detected: Vec<Category>,
}

/// Retrieval pipeline over the local store, the external catalog and the
/// hybrid index.
pub struct RetrievalEngine {
    local: LocalStoreSearch,
    external: Arc<dyn ExternalSource>,
    hybrid: HybridRetriever,
    config: EngineConfig,
}

impl RetrievalEngine {
    pub fn new(
        local: LocalStoreSearch,
        external: Arc<dyn ExternalSource>,
        hybrid: HybridRetriever,
    ) -> Self {
        Self::with_config(local, external, hybrid, EngineConfig::default())
    }

    pub fn with_config(
        local: LocalStoreSearch,
        external: Arc<dyn ExternalSource>,
        hybrid: HybridRetriever,
        config: EngineConfig,
    ) -> Self {
        Self {
            local,
            external,
            hybrid,
            config,
        }
    }

    /// Answer a query: local store first, concurrent external fan-out when
    /// local coverage is thin, then merge, rank and assemble the context.
    ///
    /// Never fails. A source that errors or times out contributes an empty
    /// set, and an all-empty merge still yields the sentinel context.
    pub async fn answer_query(&self, query: &str, user: &UserContext) -> QueryAnswer {
        let query_id = Uuid::new_v4();
        info!(%query_id, query, "answering policy query");

        let categories_detected = Category::detect(query);

        // Step 1: local store first.
        let local = match self.local.search(query, user, self.config.local_limit).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "local store search failed, continuing without it");
                Vec::new()
            }
        };

        // Step 2: fan out to the slower sources only when the local store
        // did not already cover the query.
        let (external, hybrid) = if local.len() >= self.config.local_sufficient {
            debug!(
                count = local.len(),
                "local results sufficient, skipping fan-out"
            );
            (Vec::new(), Vec::new())
        } else {
            self.fan_out(query, user).await
        };

        debug!(
            local = local.len(),
            external = external.len(),
            hybrid = hybrid.len(),
            "candidate sets collected"
        );

        // Step 3: merge all sets by value and rank. Set order doubles as the
        // duplicate-resolution preference: local beats external beats hybrid.
        let sets = vec![
            into_candidates(local, Origin::Local),
            into_candidates(external, Origin::External),
            hybrid,
        ];
        let ranked = merge_and_rank(sets, query, self.config.result_cap);
        info!(%query_id, candidates = ranked.len(), "ranked candidate set");

        // Step 4: assemble the bounded context and its citations.
        let (context_text, citations) = context::assemble(&ranked);

        QueryAnswer {
            query_id,
            context_text,
            citations,
            categories_detected,
        }
    }

    /// Run the catalog search and the hybrid retriever concurrently under a
    /// shared deadline. A branch that fails or misses the deadline
    /// contributes an empty set; partial results are always used.
    async fn fan_out(&self, query: &str, user: &UserContext) -> (Vec<PolicyRecord>, Vec<Candidate>) {
        let enhanced = enhance_query(query, user);
        debug!(enhanced, "external fan-out query");

        let deadline = self.config.fanout_timeout;
        let (catalog_result, hybrid_result) = tokio::join!(
            timeout(
                deadline,
                self.external.search_by_profile(
                    user.region.as_deref(),
                    user.age,
                    self.config.external_limit,
                ),
            ),
            timeout(deadline, self.hybrid.retrieve(&enhanced, self.config.hybrid_top_k)),
        );

        let external = match catalog_result {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(error = %err, "catalog search failed, treating as empty");
                Vec::new()
            }
            Err(_) => {
                let err = deadline_missed("catalog", deadline);
                warn!(error = %err, "treating catalog branch as empty");
                Vec::new()
            }
        };

        let mut hybrid = match hybrid_result {
            Ok(candidates) => candidates,
            Err(_) => {
                let err = deadline_missed("hybrid", deadline);
                warn!(error = %err, "treating hybrid branch as empty");
                Vec::new()
            }
        };

        // The hybrid corpus may span districts, so a requester with a region
        // only sees hits that serve it.
        if let Some(region) = user.region.as_deref() {
            hybrid.retain(|candidate| candidate.record.serves_region(region));
        }

        (external, hybrid)
    }

    /// Number of documents in the hybrid corpus.
    pub fn indexed_documents(&self) -> usize {
        self.hybrid.len()
    }

    pub async fn local_store_healthy(&self) -> bool {
        self.local.health_check().await
    }
}

/// Timeout error for a fan-out branch that missed the shared deadline.
fn deadline_missed(source: &'static str, deadline: Duration) -> SourceError {
    SourceError::Timeout {
        source,
        elapsed_ms: deadline.as_millis() as u64,
    }
}

/// Append profile facts to the query so the hybrid retriever can match on
/// them. The original query always comes first.
fn enhance_query(query: &str, user: &UserContext) -> String {
    let mut parts = vec![query.to_string()];
    if let Some(region) = &user.region {
        parts.push(format!("지역: {region}"));
    }
    if let Some(age) = user.age {
        parts.push(format!("나이: {age}세"));
    }
    if user.student == Some(true) {
        parts.push("대학생".to_string());
    }
    parts.join(" ")
}

fn into_candidates(records: Vec<PolicyRecord>, origin: Origin) -> Vec<Candidate> {
    records
        .into_iter()
        .map(|record| Candidate::new(record, origin))
        .collect()
}
