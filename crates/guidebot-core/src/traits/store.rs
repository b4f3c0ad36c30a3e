//! Knowledge store trait — the contract both retrieval backends satisfy.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{KnowledgeBase, RankedResult, StoreStatus};

/// A corpus of embedded chunks with nearest-neighbor retrieval.
///
/// Implementations: the flat-file store (whole knowledge base in memory,
/// brute-force scan) and the Qdrant store (similarity search delegated to
/// the index service). Both rank by cosine similarity so callers never
/// observe metric drift when the backend is swapped.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    fn name(&self) -> &str;

    /// Lazy, memoized load. The underlying read happens at most once per
    /// process even under concurrent first access; every caller observes
    /// the same outcome. `None` means not loaded (missing file, malformed
    /// schema, unreachable service) — callers treat that as an empty
    /// retrieval condition, never as a panic.
    async fn load(&self) -> Option<StoreStatus>;

    /// Top-k chunks by similarity, best first. Returns at most `k` results;
    /// empty when the store is not loaded or holds no chunks. Never fails.
    async fn nearest(&self, query: &[f32], k: usize) -> Vec<RankedResult>;

    /// Destructive replace: the prior collection (if any) is dropped and
    /// the given knowledge base becomes the active one. Readers observe
    /// the pre-rebuild snapshot until the swap completes.
    async fn rebuild(&self, kb: KnowledgeBase) -> Result<StoreStatus>;
}
