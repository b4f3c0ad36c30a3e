//! # GuideBot Providers
//!
//! Embedding and completion provider implementations.
//!
//! All OpenAI-compatible services (OpenAI, Ollama, custom endpoints) are
//! handled by a single `OpenAiCompatibleProvider` — the same struct serves
//! both the `/embeddings` and `/chat/completions` surfaces, so the query
//! path and the ingestion path talk to one client.

pub mod openai_compatible;
pub mod provider_registry;

use guidebot_core::config::GuideBotConfig;
use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::provider::{CompletionProvider, EmbeddingProvider};

use openai_compatible::OpenAiCompatibleProvider;

/// Create the completion provider from configuration (`[llm]` section).
pub fn create_completion_provider(config: &GuideBotConfig) -> Result<Box<dyn CompletionProvider>> {
    let provider = build_provider(
        &config.llm.provider,
        &config.llm.api_key,
        &config.llm.endpoint,
        config,
    )?;
    Ok(Box::new(provider))
}

/// Create the embedding provider from configuration (`[embedding]` section).
pub fn create_embedding_provider(config: &GuideBotConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let mut provider = build_provider(
        &config.embedding.provider,
        &config.embedding.api_key,
        &config.embedding.endpoint,
        config,
    )?;
    provider.set_embedding_model(&config.embedding.model);
    Ok(Box::new(provider))
}

/// Shared resolution for both factories.
///
/// API key: section key > top-level `api_key` > registry env vars > empty.
/// Base URL: section endpoint > env override > registry default.
fn build_provider(
    provider_name: &str,
    section_key: &str,
    endpoint: &str,
    config: &GuideBotConfig,
) -> Result<OpenAiCompatibleProvider> {
    // Custom endpoint: "custom:https://my-server.com/v1"
    if provider_name.starts_with("custom:") {
        let api_key = if !section_key.is_empty() {
            section_key.to_string()
        } else if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };
        return Ok(OpenAiCompatibleProvider::custom(provider_name, api_key));
    }

    let registry = provider_registry::get_provider_config(provider_name)
        .ok_or_else(|| GuideBotError::ProviderNotFound(provider_name.into()))?;

    let api_key = if !section_key.is_empty() {
        section_key.to_string()
    } else if !config.api_key.is_empty() {
        config.api_key.clone()
    } else {
        registry
            .env_keys
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .unwrap_or_default()
    };

    let base_url = if !endpoint.is_empty() {
        endpoint.trim_end_matches('/').to_string()
    } else {
        registry
            .base_url_env
            .and_then(|env_key| {
                let val = std::env::var(env_key).ok()?;
                // For OLLAMA_HOST, append /v1 if not present
                if val.ends_with("/v1") {
                    Some(val)
                } else {
                    Some(format!("{}/v1", val.trim_end_matches('/')))
                }
            })
            .unwrap_or_else(|| registry.base_url.to_string())
    };

    Ok(OpenAiCompatibleProvider::from_registry(
        registry, api_key, base_url,
    ))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}
