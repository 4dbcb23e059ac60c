//! Embedding client and cosine ranking for the semantic side.
//!
//! Talks to an Ollama-compatible `/api/embeddings` endpoint. The semantic
//! side is strictly optional: any failure here downgrades the hybrid
//! retriever to keyword-only rather than failing the query.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;

pub const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

const SOURCE: &str = "embeddings";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// HTTP client for the embedding endpoint
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
}

impl EmbeddingClient {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_EMBEDDING_URL.to_string(),
            DEFAULT_EMBEDDING_MODEL.to_string(),
        )
    }

    pub fn with_config(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            model,
        }
    }

    /// Embed one text. Empty embeddings are rejected as malformed.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, SourceError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable {
                source: SOURCE,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let payload: EmbeddingsResponse =
            response
                .json()
                .await
                .map_err(|e| SourceError::MalformedPayload {
                    source: SOURCE,
                    detail: e.to_string(),
                })?;

        if payload.embedding.is_empty() {
            return Err(SourceError::MalformedPayload {
                source: SOURCE,
                detail: "empty embedding vector".to_string(),
            });
        }

        Ok(payload.embedding)
    }

    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }
}

impl Default for EmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity of two vectors. Mismatched lengths and zero vectors
/// score 0 rather than erroring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, 1.0, -0.25];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_client_defaults() {
        let client = EmbeddingClient::new();
        assert_eq!(client.base_url, DEFAULT_EMBEDDING_URL);
        assert_eq!(client.model, DEFAULT_EMBEDDING_MODEL);
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running with an embedding model
    async fn test_embed_integration() {
        let client = EmbeddingClient::new();
        let embedding = client.embed("청년 월세 지원 정책").await.unwrap();
        assert!(!embedding.is_empty());
    }
}
