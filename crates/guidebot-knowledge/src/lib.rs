//! # GuideBot Knowledge
//!
//! Knowledge store backends for retrieval:
//!
//! - **flat** — the whole knowledge base as one JSON snapshot in memory,
//!   brute-force cosine scan per query. Zero services to run.
//! - **qdrant** — embeddings held by a Qdrant collection, search delegated
//!   to the service.
//!
//! Both satisfy the same [`KnowledgeStore`] contract and rank by cosine
//! similarity, so the backend is a configuration choice, not a code path
//! the rest of the system can observe.

pub mod flat;
pub mod qdrant;
pub mod similarity;

use std::sync::Arc;

use guidebot_core::config::GuideBotConfig;
use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::store::KnowledgeStore;

pub use flat::FlatFileStore;
pub use qdrant::QdrantStore;

/// Create the knowledge store selected by `knowledge.backend`.
pub fn create_store(config: &GuideBotConfig) -> Result<Arc<dyn KnowledgeStore>> {
    match config.knowledge.backend.as_str() {
        "flat" => Ok(Arc::new(FlatFileStore::new(
            config.knowledge.resolved_path(),
        ))),
        "qdrant" => Ok(Arc::new(QdrantStore::new(
            &config.knowledge.qdrant_url,
            &config.knowledge.collection,
            config.embedding.dimension,
        ))),
        other => Err(GuideBotError::Config(format!(
            "unknown knowledge backend: {other}"
        ))),
    }
}
