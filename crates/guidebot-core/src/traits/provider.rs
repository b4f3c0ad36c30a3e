//! Provider traits — the embedding and completion services the pipeline
//! talks to. Both are blocking request/response calls from the core's point
//! of view; retry and timeout policy belong to the caller.

use async_trait::async_trait;

use crate::error::Result;

/// Sampling parameters for a completion call.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            max_tokens: 800,
            temperature: 0.7,
        }
    }
}

/// Converts text into a fixed-dimension embedding vector.
///
/// Query and chunk embeddings must come from the same model — vectors from
/// different models are not comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Generates text from a system instruction and a user prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: &GenerateParams,
    ) -> Result<String>;
}
