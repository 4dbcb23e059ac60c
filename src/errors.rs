//! Error types for the youthy retrieval engine.
//!
//! Retrieval sources fail independently and are never fatal to a query:
//! the engine logs a failed source and carries on with whatever the other
//! sources produced. `SourceError` keeps "empty because the source is down"
//! distinguishable from "empty because nothing matched" at the call
//! boundary; `EngineError` covers everything above that layer.

use thiserror::Error;

/// Per-source failure raised by the store, catalog, and hybrid retrievers.
///
/// `Display`/`Error`/`From` are written by hand because the `source` field
/// holds the source's name (a `&'static str`), which `thiserror` would
/// otherwise try to treat as the error's cause.
#[derive(Debug)]
pub enum SourceError {
    /// Source could not be reached at all
    Unavailable { source: &'static str, reason: String },

    /// Source did not answer within its deadline
    Timeout { source: &'static str, elapsed_ms: u64 },

    /// Source answered with a payload we could not decode
    MalformedPayload { source: &'static str, detail: String },

    /// Transport-level HTTP failure
    Http(reqwest::Error),

    /// Payload decoding failure
    Json(serde_json::Error),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable { source, reason } => {
                write!(f, "{source} unavailable: {reason}")
            }
            SourceError::Timeout { source, elapsed_ms } => {
                write!(f, "{source} timed out after {elapsed_ms}ms")
            }
            SourceError::MalformedPayload { source, detail } => {
                write!(f, "{source} returned a malformed payload: {detail}")
            }
            SourceError::Http(err) => write!(f, "HTTP request failed: {err}"),
            SourceError::Json(err) => write!(f, "JSON decode failed: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(err) => Some(err),
            SourceError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Http(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Json(err)
    }
}

impl SourceError {
    /// Name of the source this error belongs to (for logging)
    pub fn source_name(&self) -> &'static str {
        match self {
            SourceError::Unavailable { source, .. } => source,
            SourceError::Timeout { source, .. } => source,
            SourceError::MalformedPayload { source, .. } => source,
            SourceError::Http(_) => "http",
            SourceError::Json(_) => "json",
        }
    }
}

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation service errors
    #[error("Generation service error: {0}")]
    Generation(String),

    /// Token stream errors
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Embedding service errors
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// A source failure that escaped the treat-as-empty boundary
    #[error(transparent)]
    Source(#[from] SourceError),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Engine error: {0}")]
    Other(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Convert anyhow errors to EngineError
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Timeout {
            source: "youthcenter",
            elapsed_ms: 10_000,
        };
        assert!(err.to_string().contains("youthcenter"));
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn test_source_name() {
        let err = SourceError::Unavailable {
            source: "local-store",
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.source_name(), "local-store");
    }

    #[test]
    fn test_source_error_passes_through_engine_error() {
        let err: EngineError = SourceError::MalformedPayload {
            source: "youthcenter",
            detail: "expected list".to_string(),
        }
        .into();
        assert!(err.to_string().contains("malformed"));
    }
}
