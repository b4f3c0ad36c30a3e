//! Unified OpenAI-compatible provider.
//!
//! A single struct that serves both embeddings and chat completions for ALL
//! OpenAI-compatible APIs. Different providers are distinguished only by
//! endpoint URL, auth style, and API key.

use async_trait::async_trait;
use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::provider::{CompletionProvider, EmbeddingProvider, GenerateParams};
use serde_json::{Value, json};

use crate::provider_registry::{AuthStyle, ProviderConfig};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "ollama").
    name: String,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    /// Path for chat completions (e.g., "/chat/completions").
    chat_path: String,
    /// Path for embeddings (e.g., "/embeddings").
    embeddings_path: String,
    /// Model sent with embedding requests; chat models arrive per-call.
    embedding_model: String,
    /// Authentication style.
    auth_style: AuthStyle,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known registry entry with resolved key and base URL.
    pub fn from_registry(registry: &ProviderConfig, api_key: String, base_url: String) -> Self {
        Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            chat_path: registry.chat_path.to_string(),
            embeddings_path: registry.embeddings_path.to_string(),
            embedding_model: String::new(),
            auth_style: registry.auth_style,
            client: reqwest::Client::new(),
        }
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, api_key: String) -> Self {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            embeddings_path: "/embeddings".to_string(),
            embedding_model: String::new(),
            auth_style,
            client: reqwest::Client::new(),
        }
    }

    /// Set the model used for embedding requests.
    pub fn set_embedding_model(&mut self, model: &str) {
        self.embedding_model = model.to_string();
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    /// POST a JSON body and parse the JSON response, with shared error
    /// mapping. Providers that require auth fail fast without a key.
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(GuideBotError::ApiKeyMissing(self.name.clone()));
        }

        let url = format!("{}{}", self.base_url, path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            GuideBotError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!("⚠️ {} API error {} at {}", self.name, status, path);
            return Err(GuideBotError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        resp.json()
            .await
            .map_err(|e| GuideBotError::Http(e.to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        let json = self.post_json(&self.embeddings_path, &body).await?;

        let embedding = json["data"]
            .get(0)
            .and_then(|d| d["embedding"].as_array())
            .ok_or_else(|| {
                GuideBotError::Provider(format!("{}: no embedding in response", self.name))
            })?;

        Ok(embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &GenerateParams,
    ) -> Result<String> {
        let body = json!({
            "model": params.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let json = self.post_json(&self.chat_path, &body).await?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| {
                GuideBotError::Provider(format!("{}: no choices in response", self.name))
            })?;

        Ok(content.to_string())
    }
}
