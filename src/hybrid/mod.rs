//! Hybrid retrieval: BM25 keyword ranking fused with embedding cosine
//! ranking by weighted reciprocal rank.
//!
//! The semantic side carries more weight (0.6 vs 0.4) but is optional
//! end to end: no embedding client, an unembedded corpus, or a failed
//! query embedding all degrade to keyword-only retrieval instead of
//! failing the query.

pub mod index;
pub mod keyword;
pub mod semantic;

pub use index::{IndexedDoc, PolicyIndex};
pub use semantic::{EmbeddingClient, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL};

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::policy::PolicyRecord;
use crate::ranking::{Candidate, Origin};
use semantic::cosine_similarity;

pub const KEYWORD_WEIGHT: f32 = 0.4;
pub const SEMANTIC_WEIGHT: f32 = 0.6;

/// RRF smoothing constant
const RRF_K: f32 = 60.0;
/// Per-side depth before fusion
const RETRIEVER_DEPTH: usize = 10;

/// Two-sided retriever over an in-process index
pub struct HybridRetriever {
    index: PolicyIndex,
    embeddings: Option<EmbeddingClient>,
    keyword_weight: f32,
    semantic_weight: f32,
}

impl HybridRetriever {
    /// Keyword-only retriever.
    pub fn new(index: PolicyIndex) -> Self {
        Self {
            index,
            embeddings: None,
            keyword_weight: KEYWORD_WEIGHT,
            semantic_weight: SEMANTIC_WEIGHT,
        }
    }

    pub fn with_embeddings(index: PolicyIndex, client: EmbeddingClient) -> Self {
        Self {
            embeddings: Some(client),
            ..Self::new(index)
        }
    }

    pub fn with_weights(mut self, keyword_weight: f32, semantic_weight: f32) -> Self {
        self.keyword_weight = keyword_weight;
        self.semantic_weight = semantic_weight;
        self
    }

    /// Index `records` and embed the corpus up front. Any embedding
    /// failure abandons the semantic side for this retriever.
    pub async fn build(records: Vec<PolicyRecord>, embeddings: Option<EmbeddingClient>) -> Self {
        let mut index = PolicyIndex::from_records(records);
        let mut client = embeddings;

        if let Some(c) = &client {
            for i in 0..index.len() {
                let text = index.docs()[i].text.clone();
                match c.embed(&text).await {
                    Ok(vector) => index.set_embedding(i, vector),
                    Err(e) => {
                        warn!(error = %e, doc = i, "corpus embedding failed, keyword-only retrieval");
                        client = None;
                        break;
                    }
                }
            }
        }
        debug!(
            docs = index.len(),
            embedded = index.fully_embedded(),
            "hybrid retriever ready"
        );

        match client {
            Some(c) => Self::with_embeddings(index, c),
            None => Self::new(index),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Retrieve the top `k` fused candidates for `query`.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<Candidate> {
        if self.index.is_empty() || query.trim().is_empty() {
            return Vec::new();
        }

        let keyword_ranked = keyword::rank(&self.index, query, RETRIEVER_DEPTH);

        let semantic_ranked = match &self.embeddings {
            Some(client) if self.index.fully_embedded() => {
                match client.embed(query).await {
                    Ok(query_embedding) => Some(self.rank_semantic(&query_embedding)),
                    Err(e) => {
                        warn!(error = %e, "query embedding failed, falling back to keyword-only");
                        None
                    }
                }
            }
            _ => None,
        };

        let keyword_ids: Vec<usize> = keyword_ranked.iter().map(|(i, _)| *i).collect();
        let lists: Vec<(f32, Vec<usize>)> = match semantic_ranked {
            Some(semantic) => vec![
                (self.keyword_weight, keyword_ids),
                (
                    self.semantic_weight,
                    semantic.iter().map(|(i, _)| *i).collect(),
                ),
            ],
            // a single list keeps its order under any positive weight
            None => vec![(1.0, keyword_ids)],
        };

        fuse(&lists, RRF_K)
            .into_iter()
            .take(k)
            .map(|(doc_idx, score)| {
                let doc = &self.index.docs()[doc_idx];
                Candidate {
                    record: doc.record.clone(),
                    relevance_score: score,
                    origin: Origin::Hybrid,
                }
            })
            .collect()
    }

    fn rank_semantic(&self, query_embedding: &[f32]) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .index
            .docs()
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                doc.embedding
                    .as_ref()
                    .map(|e| (i, cosine_similarity(query_embedding, e)))
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(RETRIEVER_DEPTH);
        scored
    }
}

/// Weighted reciprocal-rank fusion: score(d) = Σ weight_l / (k + rank_l(d)),
/// rank counted from 1. Ties break on document index so the fused order is
/// deterministic.
fn fuse(ranked_lists: &[(f32, Vec<usize>)], k: f32) -> Vec<(usize, f32)> {
    let mut scores: HashMap<usize, f32> = HashMap::new();

    for (weight, list) in ranked_lists {
        for (rank, doc_idx) in list.iter().enumerate() {
            *scores.entry(*doc_idx).or_default() += weight / (k + (rank + 1) as f32);
        }
    }

    let mut fused: Vec<(usize, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    fused
}
