//! Flat-file knowledge store.
//!
//! The whole knowledge base is one JSON document read into memory; queries
//! are a brute-force cosine scan. The load is lazy and memoized for the
//! process lifetime — under concurrent first access exactly one read
//! happens and every caller sees the same outcome. `rebuild` writes a temp
//! file and renames it over the target, then swaps the in-memory snapshot;
//! in-flight readers keep their `Arc` to the previous generation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::store::KnowledgeStore;
use guidebot_core::types::{KnowledgeBase, RankedResult, StoreStatus};

use crate::similarity;

enum CacheState {
    Unloaded,
    Ready(Arc<KnowledgeBase>),
    /// First load failed; memoized so concurrent callers agree. Cleared by
    /// `rebuild`.
    Failed,
}

pub struct FlatFileStore {
    path: PathBuf,
    cache: RwLock<CacheState>,
}

impl FlatFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(CacheState::Unloaded),
        }
    }

    fn read_file(path: &Path) -> Result<KnowledgeBase> {
        let content = std::fs::read_to_string(path)?;
        let kb: KnowledgeBase = serde_json::from_str(&content)?;
        if !kb.dimensions_consistent() {
            return Err(GuideBotError::Knowledge(
                "knowledge base mixes embedding dimensions".into(),
            ));
        }
        Ok(kb)
    }

    /// Memoized snapshot. Double-checked against the write lock so a race
    /// of first requests performs the file read once.
    async fn snapshot(&self) -> Option<Arc<KnowledgeBase>> {
        {
            let cache = self.cache.read().await;
            match &*cache {
                CacheState::Ready(kb) => return Some(kb.clone()),
                CacheState::Failed => return None,
                CacheState::Unloaded => {}
            }
        }

        let mut cache = self.cache.write().await;
        // another caller may have loaded while we waited for the lock
        match &*cache {
            CacheState::Ready(kb) => return Some(kb.clone()),
            CacheState::Failed => return None,
            CacheState::Unloaded => {}
        }

        match Self::read_file(&self.path) {
            Ok(kb) => {
                tracing::info!(
                    "📚 Knowledge base loaded: {} chunks from {}",
                    kb.chunk_count(),
                    self.path.display()
                );
                let kb = Arc::new(kb);
                *cache = CacheState::Ready(kb.clone());
                Some(kb)
            }
            Err(e) => {
                tracing::warn!(
                    "Knowledge base not available at {}: {e}",
                    self.path.display()
                );
                *cache = CacheState::Failed;
                None
            }
        }
    }

    fn status_of(kb: &KnowledgeBase) -> StoreStatus {
        StoreStatus {
            chunk_count: kb.chunk_count(),
            embedding_model: if kb.metadata.embedding_model.is_empty() {
                None
            } else {
                Some(kb.metadata.embedding_model.clone())
            },
        }
    }
}

#[async_trait]
impl KnowledgeStore for FlatFileStore {
    fn name(&self) -> &str {
        "flat"
    }

    async fn load(&self) -> Option<StoreStatus> {
        self.snapshot().await.map(|kb| Self::status_of(&kb))
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Vec<RankedResult> {
        match self.snapshot().await {
            Some(kb) => similarity::rank(&kb.chunks, query, k),
            None => Vec::new(),
        }
    }

    async fn rebuild(&self, kb: KnowledgeBase) -> Result<StoreStatus> {
        if !kb.dimensions_consistent() {
            return Err(GuideBotError::Knowledge(
                "new chunk set mixes embedding dimensions".into(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // temp file + rename: the file on disk is always a complete document
        let json = serde_json::to_string_pretty(&kb)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;

        let kb = Arc::new(kb);
        let status = Self::status_of(&kb);
        let mut cache = self.cache.write().await;
        *cache = CacheState::Ready(kb);
        tracing::info!(
            "💾 Knowledge base rebuilt: {} chunks -> {}",
            status.chunk_count,
            self.path.display()
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidebot_core::types::{Chunk, KbMetadata};

    fn sample_kb() -> KnowledgeBase {
        KnowledgeBase {
            metadata: KbMetadata {
                total_chunks: 2,
                total_tokens: 9,
                embedding_model: "text-embedding-3-small".into(),
                vision_model: "gpt-4o".into(),
            },
            chunks: vec![
                Chunk {
                    text: "hold the feed key to advance paper".into(),
                    embedding: vec![1.0, 0.0],
                    page_number: 4,
                    chunk_index: 0,
                    token_count: 5,
                },
                Chunk {
                    text: "daily report is under the Z menu".into(),
                    embedding: vec![0.0, 1.0],
                    page_number: 9,
                    chunk_index: 1,
                    token_count: 4,
                },
            ],
        }
    }

    fn write_kb(path: &Path, kb: &KnowledgeBase) {
        std::fs::write(path, serde_json::to_string(kb).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path().join("missing.json"));
        assert!(store.load().await.is_none());
        assert!(store.nearest(&[1.0, 0.0], 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{not valid json").unwrap();
        let store = FlatFileStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &sample_kb());

        let store = FlatFileStore::new(&path);
        let status = store.load().await.unwrap();
        assert_eq!(status.chunk_count, 2);
        assert_eq!(
            status.embedding_model.as_deref(),
            Some("text-embedding-3-small")
        );
    }

    #[tokio::test]
    async fn test_load_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &sample_kb());

        let store = FlatFileStore::new(&path);
        assert_eq!(store.load().await.unwrap().chunk_count, 2);

        // the backing file is gone, but the snapshot survives
        std::fs::remove_file(&path).unwrap();
        assert_eq!(store.load().await.unwrap().chunk_count, 2);
        assert_eq!(store.nearest(&[1.0, 0.0], 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_agrees() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &sample_kb());

        let store = Arc::new(FlatFileStore::new(&path));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.load().await.map(|s| s.chunk_count) })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(2));
        }
    }

    #[tokio::test]
    async fn test_failed_load_is_memoized_until_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");

        let store = FlatFileStore::new(&path);
        assert!(store.load().await.is_none());

        // a file appearing later does not resurrect the cached failure
        write_kb(&path, &sample_kb());
        assert!(store.load().await.is_none());

        // rebuild replaces the cached state outright
        store.rebuild(sample_kb()).await.unwrap();
        assert_eq!(store.load().await.unwrap().chunk_count, 2);
    }

    #[tokio::test]
    async fn test_mixed_dimensions_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        let mut kb = sample_kb();
        kb.chunks[1].embedding = vec![0.0, 1.0, 0.0];
        write_kb(&path, &kb);

        let store = FlatFileStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_nearest_ranks_loaded_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &sample_kb());

        let store = FlatFileStore::new(&path);
        let results = store.nearest(&[1.0, 0.1], 2).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_index, 0);
        assert!(results[0].similarity > results[1].similarity);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_prior_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &sample_kb());

        let store = FlatFileStore::new(&path);
        assert_eq!(store.load().await.unwrap().chunk_count, 2);

        let new_kb = KnowledgeBase {
            metadata: KbMetadata {
                total_chunks: 1,
                total_tokens: 3,
                embedding_model: "text-embedding-3-small".into(),
                vision_model: "gpt-4o".into(),
            },
            chunks: vec![Chunk {
                text: "replacement generation".into(),
                embedding: vec![1.0, 1.0],
                page_number: 1,
                chunk_index: 0,
                token_count: 3,
            }],
        };
        let status = store.rebuild(new_kb).await.unwrap();
        assert_eq!(status.chunk_count, 1);

        // no chunk from the prior generation is ever returned
        let results = store.nearest(&[1.0, 1.0], 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "replacement generation");

        // the file on disk is the new generation too
        let reloaded = FlatFileStore::new(&path);
        assert_eq!(reloaded.load().await.unwrap().chunk_count, 1);
    }

    #[tokio::test]
    async fn test_rebuild_rejects_mixed_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path().join("kb.json"));
        let mut kb = sample_kb();
        kb.chunks[0].embedding = vec![1.0, 0.0, 0.0];
        assert!(store.rebuild(kb).await.is_err());
    }
}
