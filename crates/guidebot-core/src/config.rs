//! GuideBot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideBotConfig {
    /// Global API key fallback; section-level keys take precedence.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for GuideBotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            knowledge: KnowledgeConfig::default(),
            ingest: IngestConfig::default(),
            answer: AnswerConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl GuideBotConfig {
    /// Load config from `GUIDEBOT_CONFIG` or the default path
    /// (~/.guidebot/config.toml). Missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("GUIDEBOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::GuideBotError::Config(format!("Failed to read config: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::GuideBotError::Config(format!("Failed to parse config: {e}"))
        })?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::error::GuideBotError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the GuideBot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guidebot")
    }
}

/// Completion model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Override for the provider base URL; empty = registry default.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String { "openai".into() }
fn default_llm_model() -> String { "gpt-4o".into() }
fn default_max_tokens() -> u32 { 800 }
fn default_temperature() -> f32 { 0.7 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_llm_model(),
            endpoint: String::new(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    /// Dimension the model produces; every stored chunk must match.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_embedding_model() -> String { "text-embedding-3-small".into() }
fn default_dimension() -> usize { 1536 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            endpoint: String::new(),
            api_key: String::new(),
            dimension: default_dimension(),
        }
    }
}

/// Knowledge store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Store backend: "flat" (in-memory JSON snapshot) or "qdrant".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Flat-file knowledge base path. "~" expands to the home directory.
    #[serde(default = "default_kb_path")]
    pub path: String,
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// How many chunks are retrieved as generation context.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_backend() -> String { "flat".into() }
fn default_kb_path() -> String { "~/.guidebot/knowledge_base.json".into() }
fn default_qdrant_url() -> String { "http://127.0.0.1:6333".into() }
fn default_collection() -> String { "user_guide".into() }
fn default_top_k() -> usize { 3 }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_kb_path(),
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

impl KnowledgeConfig {
    /// Flat-file path with a leading "~/" expanded.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(rest) = self.path.strip_prefix("~/") {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(rest)
        } else {
            PathBuf::from(&self.path)
        }
    }
}

/// Ingestion (chunking) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Chunk window size in words.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in words.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Fragments shorter than this (chars) are dropped.
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
}

fn default_chunk_size() -> usize { 1500 }
fn default_chunk_overlap() -> usize { 300 }
fn default_min_chunk_chars() -> usize { 100 }

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_chunk_chars: default_min_chunk_chars(),
        }
    }
}

/// Answer composition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Natural language the assistant answers in.
    #[serde(default = "default_language")]
    pub language: String,
    /// Short product name used in the assistant instruction.
    #[serde(default = "default_product")]
    pub product: String,
}

fn default_language() -> String { "Turkish".into() }
fn default_product() -> String { "cash register application".into() }

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            product: default_product(),
        }
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS origins. Empty = allow any (development fallback).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuideBotConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.knowledge.backend, "flat");
        assert_eq!(config.knowledge.top_k, 3);
        assert!((config.llm.temperature - 0.7).abs() < 0.01);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [llm]
            provider = "ollama"
            model = "llama3.2"
            max_tokens = 512

            [knowledge]
            backend = "qdrant"
            collection = "manual_v2"

            [answer]
            language = "English"
        "#;

        let config: GuideBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.knowledge.backend, "qdrant");
        assert_eq!(config.knowledge.collection, "manual_v2");
        assert_eq!(config.answer.language, "English");
        // untouched sections fall back to defaults
        assert_eq!(config.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let toml_str = "";
        let config: GuideBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.ingest.chunk_size, 1500);
    }

    #[test]
    fn test_resolved_path_expands_tilde() {
        let cfg = KnowledgeConfig::default();
        let path = cfg.resolved_path();
        assert!(!path.to_string_lossy().contains('~'));
        assert!(path.to_string_lossy().ends_with("knowledge_base.json"));
    }
}
