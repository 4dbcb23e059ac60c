//! youthy - Policy Retrieval & Freshness Engine
//!
//! Retrieves, deduplicates, ranks and time-filters Korean youth-policy
//! records from heterogeneous sources, then assembles a bounded,
//! citation-ready context for a text-generation step.
//!
//! # Architecture
//!
//! - **policy**: canonical record plus the period, expiry and category classifiers
//! - **store / catalog / hybrid**: the three candidate sources
//! - **ranking / context**: cross-source merge and context assembly
//! - **engine**: per-query orchestration entry point

pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod generation;
pub mod hybrid;
pub mod policy;
pub mod ranking;
pub mod store;

// Re-export commonly used types
pub use errors::{EngineError, Result, SourceError};
