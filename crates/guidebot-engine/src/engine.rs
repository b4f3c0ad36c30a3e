//! The retrieval/composition engine.

use std::sync::Arc;

use guidebot_core::config::{GuideBotConfig, IngestConfig};
use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::provider::{CompletionProvider, EmbeddingProvider, GenerateParams};
use guidebot_core::traits::store::KnowledgeStore;
use guidebot_core::types::{Answer, RankedResult, Source, StoreStatus};
use guidebot_ingest::{PageContent, build_knowledge_base};

use crate::prompt;

/// Sources surfaced to callers. More chunks may have served as generation
/// context; at most this many are ever cited.
const MAX_SOURCES: usize = 2;
/// Source text cap before the ellipsis marker.
const SOURCE_TEXT_CHARS: usize = 200;

/// Tuning knobs, read from config once at startup.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: usize,
    pub language: String,
    pub product: String,
    pub embedding_model: String,
    pub ingest: IngestConfig,
}

impl EngineOptions {
    pub fn from_config(config: &GuideBotConfig) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            top_k: config.knowledge.top_k,
            language: config.answer.language.clone(),
            product: config.answer.product.clone(),
            embedding_model: config.embedding.model.clone(),
            ingest: config.ingest.clone(),
        }
    }
}

/// One engine per process; each question is an independent request/response
/// pass with no state carried across calls.
pub struct RagEngine {
    embedder: Box<dyn EmbeddingProvider>,
    completer: Box<dyn CompletionProvider>,
    store: Arc<dyn KnowledgeStore>,
    options: EngineOptions,
}

impl RagEngine {
    pub fn new(
        embedder: Box<dyn EmbeddingProvider>,
        completer: Box<dyn CompletionProvider>,
        store: Arc<dyn KnowledgeStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            embedder,
            completer,
            store,
            options,
        }
    }

    /// Answer one question. Never fails: provider trouble is converted into
    /// a renderable answer with empty sources.
    pub async fn ask(&self, question: &str) -> Answer {
        let query = match self.embedder.embed(question).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::error!("question embedding failed: {e}");
                return error_answer(&e);
            }
        };

        let ranked = self.store.nearest(&query, self.options.top_k).await;
        if ranked.is_empty() {
            return Answer {
                answer: prompt::NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            };
        }

        let context = ranked
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(prompt::CONTEXT_SEPARATOR);
        let system = prompt::system_prompt(&self.options.product, &self.options.language);
        let user = prompt::user_prompt(&context, question);
        let params = GenerateParams {
            model: self.options.model.clone(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        match self.completer.complete(&system, &user, &params).await {
            Ok(text) => Answer {
                answer: text,
                sources: ranked.iter().take(MAX_SOURCES).map(source_from).collect(),
            },
            Err(e) => {
                tracing::error!("completion failed: {e}");
                error_answer(&e)
            }
        }
    }

    /// Store summary for health/status surfaces.
    pub async fn status(&self) -> Option<StoreStatus> {
        self.store.load().await
    }

    /// Re-ingest: chunk and embed the given pages, then destructively
    /// replace the knowledge base. A run that yields nothing aborts before
    /// the store is touched.
    pub async fn rebuild_from_pages(
        &self,
        pages: &[PageContent],
        vision_model: &str,
    ) -> Result<StoreStatus> {
        let kb = build_knowledge_base(
            pages,
            self.embedder.as_ref(),
            &self.options.ingest,
            &self.options.embedding_model,
            vision_model,
        )
        .await?;
        self.store.rebuild(kb).await
    }
}

/// Best-effort conversion of an upstream failure into something renderable.
fn error_answer(e: &GuideBotError) -> Answer {
    Answer {
        answer: format!("Something went wrong while answering: {e}. Please try again."),
        sources: Vec::new(),
    }
}

/// Redact a ranked chunk into a citation: truncated text, page, score.
fn source_from(result: &RankedResult) -> Source {
    let text = if result.text.chars().count() > SOURCE_TEXT_CHARS {
        let truncated: String = result.text.chars().take(SOURCE_TEXT_CHARS).collect();
        format!("{truncated}...")
    } else {
        result.text.clone()
    };
    Source {
        text,
        page: result.page_number,
        similarity: result.similarity,
    }
}
