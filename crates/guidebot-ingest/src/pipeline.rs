//! Embed-and-assemble pipeline: draft chunks -> embedded chunks -> knowledge base.
//!
//! Per-chunk embedding failures are skipped and logged so a transient
//! provider hiccup doesn't abort an hour-long run; a run that produces
//! nothing at all is an error, raised before any store is touched.

use guidebot_core::config::IngestConfig;
use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::provider::EmbeddingProvider;
use guidebot_core::types::{Chunk, KbMetadata, KnowledgeBase};
use tiktoken_rs::cl100k_base;

use crate::chunker::{DraftChunk, PageContent, chunk_pages};

/// Embed every draft chunk. Failures are skipped and logged; an empty
/// outcome (no drafts, or every embedding failed) is an `Ingestion` error.
pub async fn embed_chunks(
    drafts: &[DraftChunk],
    embedder: &dyn EmbeddingProvider,
) -> Result<Vec<Chunk>> {
    if drafts.is_empty() {
        return Err(GuideBotError::Ingestion(
            "no chunks to embed — source produced no usable text".into(),
        ));
    }

    let bpe = cl100k_base()
        .map_err(|e| GuideBotError::Ingestion(format!("tokenizer unavailable: {e}")))?;

    let mut chunks = Vec::with_capacity(drafts.len());
    let mut skipped = 0usize;
    for draft in drafts {
        match embedder.embed(&draft.text).await {
            Ok(embedding) => {
                let token_count = bpe.encode_with_special_tokens(&draft.text).len();
                chunks.push(Chunk {
                    text: draft.text.clone(),
                    embedding,
                    page_number: draft.page_number,
                    chunk_index: draft.chunk_index,
                    token_count,
                });
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    "embedding failed for chunk {} (page {}): {e}",
                    draft.chunk_index,
                    draft.page_number
                );
            }
        }
    }

    if chunks.is_empty() {
        return Err(GuideBotError::Ingestion(format!(
            "all {} chunk embeddings failed",
            drafts.len()
        )));
    }
    if skipped > 0 {
        tracing::warn!("⚠️ {skipped}/{} chunks skipped during ingestion", drafts.len());
    }

    Ok(chunks)
}

/// Assemble the persisted knowledge-base document with computed metadata.
pub fn knowledge_base_from_chunks(
    chunks: Vec<Chunk>,
    embedding_model: &str,
    vision_model: &str,
) -> KnowledgeBase {
    let metadata = KbMetadata {
        total_chunks: chunks.len(),
        total_tokens: chunks.iter().map(|c| c.token_count).sum(),
        embedding_model: embedding_model.to_string(),
        vision_model: vision_model.to_string(),
    };
    KnowledgeBase { metadata, chunks }
}

/// The whole run: chunk pages, embed, assemble. Fails (without touching any
/// store) when the input yields nothing ingestible.
pub async fn build_knowledge_base(
    pages: &[PageContent],
    embedder: &dyn EmbeddingProvider,
    cfg: &IngestConfig,
    embedding_model: &str,
    vision_model: &str,
) -> Result<KnowledgeBase> {
    if pages.is_empty() {
        return Err(GuideBotError::Ingestion("no pages to ingest".into()));
    }

    let drafts = chunk_pages(pages, cfg);
    tracing::info!("✂️ {} chunks from {} pages", drafts.len(), pages.len());

    let chunks = embed_chunks(&drafts, embedder).await?;
    Ok(knowledge_base_from_chunks(
        chunks,
        embedding_model,
        vision_model,
    ))
}
