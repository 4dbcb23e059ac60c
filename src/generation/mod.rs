//! Text-generation collaborator.
//!
//! The engine produces context and citations; wording the final answer
//! belongs to a [`TextGenerator`]. The default implementation streams
//! from an Ollama-compatible `/api/generate` endpoint.

pub mod prompt;

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

pub const DEFAULT_GENERATION_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_GENERATION_MODEL: &str = "qwen2.5:7b-instruct";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything the generator needs for one answer
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instructions: String,
    pub context_text: String,
    pub user_message: String,
    pub profile_summary: Option<String>,
}

impl GenerationRequest {
    /// Package assembled context for one user question.
    pub fn new(user_message: &str, context_text: &str, user: &crate::policy::UserContext) -> Self {
        Self {
            system_instructions: prompt::SYSTEM_INSTRUCTIONS.to_string(),
            context_text: context_text.to_string(),
            user_message: user_message.to_string(),
            profile_summary: prompt::build_profile_summary(user),
        }
    }
}

/// Incremental answer tokens
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Generation service seam. The engine only ever feeds it assembled
/// context; implementations decide wording, never retrieval.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the full answer in one piece.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Produce the answer as a token stream.
    async fn generate_stream(&self, request: &GenerationRequest) -> Result<TokenStream>;

    async fn health_check(&self) -> bool;
}

#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateChunk {
    #[serde(default)]
    response: String,
}

/// Ollama-backed generator
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_GENERATION_URL, DEFAULT_GENERATION_MODEL)
    }

    pub fn with_config(base_url: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_generate(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt::compose(request),
            stream,
            options: None,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Generation(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EngineError::Generation(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let response = self.send_generate(request, false).await?;
        let chunk: OllamaGenerateChunk = response
            .json()
            .await
            .map_err(|e| EngineError::Generation(format!("Failed to parse response: {}", e)))?;
        Ok(chunk.response)
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> Result<TokenStream> {
        let response = self.send_generate(request, true).await?;

        // reassemble newline-delimited JSON chunks across network frames
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| EngineError::Streaming(e.to_string())))
            .scan(String::new(), |buffer, chunk| {
                let item = match chunk {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        let mut tokens = String::new();
                        while let Some(pos) = buffer.find('\n') {
                            let line: String = buffer.drain(..=pos).collect();
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            if let Ok(parsed) = serde_json::from_str::<OllamaGenerateChunk>(line) {
                                tokens.push_str(&parsed.response);
                            }
                        }
                        Ok(tokens)
                    }
                    Err(e) => Err(e),
                };
                futures_util::future::ready(Some(item))
            })
            .filter_map(|item| async move {
                match item {
                    Ok(tokens) if tokens.is_empty() => None,
                    other => Some(other),
                }
            });

        Ok(Box::pin(stream))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
