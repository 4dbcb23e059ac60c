use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{DEFAULT_CATALOG_URL, DEFAULT_REQUEST_DELAY_MS};
use crate::engine::{
    EngineConfig, EXTERNAL_LIMIT, FANOUT_TIMEOUT, HYBRID_TOP_K, LOCAL_LIMIT, LOCAL_SUFFICIENT,
};
use crate::generation::{DEFAULT_GENERATION_MODEL, DEFAULT_GENERATION_URL};
use crate::hybrid::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, KEYWORD_WEIGHT, SEMANTIC_WEIGHT,
};
use crate::ranking::DEFAULT_RESULT_CAP;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogSection,
    pub generation: GenerationSection,
    pub embedding: EmbeddingSection,
    pub retrieval: RetrievalSection,
}

/// Youth Center open-API settings. An empty key is allowed: the catalog
/// answers keyless requests with an HTML page, which the client already
/// treats as zero results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub api_key: String,
    pub base_url: String,
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
    pub local_limit: usize,
    pub local_sufficient: usize,
    pub external_limit: usize,
    pub hybrid_top_k: usize,
    pub result_cap: usize,
    pub fanout_timeout_secs: u64,
    pub keyword_weight: f32,
    pub semantic_weight: f32,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".youthy").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog: CatalogSection::default(),
            generation: GenerationSection::default(),
            embedding: EmbeddingSection::default(),
            retrieval: RetrievalSection::default(),
        }
    }
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_CATALOG_URL.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
        }
    }
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
        }
    }
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMBEDDING_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            local_limit: LOCAL_LIMIT,
            local_sufficient: LOCAL_SUFFICIENT,
            external_limit: EXTERNAL_LIMIT,
            hybrid_top_k: HYBRID_TOP_K,
            result_cap: DEFAULT_RESULT_CAP,
            fanout_timeout_secs: FANOUT_TIMEOUT.as_secs(),
            keyword_weight: KEYWORD_WEIGHT,
            semantic_weight: SEMANTIC_WEIGHT,
        }
    }
}

impl RetrievalSection {
    /// Engine tuning derived from this section.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            local_limit: self.local_limit,
            local_sufficient: self.local_sufficient,
            external_limit: self.external_limit,
            hybrid_top_k: self.hybrid_top_k,
            result_cap: self.result_cap,
            fanout_timeout: Duration::from_secs(self.fanout_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.catalog.api_key.is_empty());
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.generation.model, DEFAULT_GENERATION_MODEL);
        assert_eq!(config.retrieval.local_limit, 5);
        assert_eq!(config.retrieval.local_sufficient, 3);
        assert_eq!(config.retrieval.result_cap, 8);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let contents = r#"
[catalog]
api_key = "test-key"

[retrieval]
result_cap = 12
"#;
        let config: Config = toml::from_str(contents).unwrap();
        assert_eq!(config.catalog.api_key, "test-key");
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.retrieval.result_cap, 12);
        assert_eq!(config.retrieval.local_limit, 5);
        assert_eq!(config.generation.model, DEFAULT_GENERATION_MODEL);
    }

    #[test]
    fn test_engine_config_conversion() {
        let section = RetrievalSection {
            fanout_timeout_secs: 4,
            result_cap: 6,
            ..RetrievalSection::default()
        };
        let engine = section.engine_config();
        assert_eq!(engine.fanout_timeout, Duration::from_secs(4));
        assert_eq!(engine.result_cap, 6);
        assert_eq!(engine.local_limit, 5);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.catalog.api_key = "round-trip-key".to_string();
        config.retrieval.fanout_timeout_secs = 7;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.catalog.api_key, "round-trip-key");
        assert_eq!(loaded.retrieval.fanout_timeout_secs, 7);
        assert_eq!(loaded.generation.base_url, DEFAULT_GENERATION_URL);
    }
}
