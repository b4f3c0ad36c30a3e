//! Qdrant-backed knowledge store.
//!
//! Embeddings live out-of-process in a Qdrant collection and similarity
//! search is delegated to the service over its REST API. The collection is
//! created with cosine distance — the canonical metric — so rankings match
//! the flat-file store for the same inputs.
//!
//! `rebuild` is delete-then-create-then-bulk-insert. Unlike the flat store
//! there is an intermediate window in which the collection is absent or
//! partially filled; during that window the cached status is cleared and
//! health reports the store as unavailable.

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use guidebot_core::error::{GuideBotError, Result};
use guidebot_core::traits::store::KnowledgeStore;
use guidebot_core::types::{KnowledgeBase, RankedResult, StoreStatus};

/// Points per bulk-insert request.
const UPSERT_BATCH: usize = 64;

enum CacheState {
    Unloaded,
    Ready(StoreStatus),
    Failed,
}

pub struct QdrantStore {
    base_url: String,
    collection: String,
    /// Dimension the collection is created with; chunk sets must match.
    dimension: usize,
    client: reqwest::Client,
    cache: RwLock<CacheState>,
}

impl QdrantStore {
    pub fn new(base_url: &str, collection: &str, dimension: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            dimension,
            client: reqwest::Client::new(),
            cache: RwLock::new(CacheState::Unloaded),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// One probe of the collection; `None` when the service is unreachable
    /// or the collection does not exist.
    async fn fetch_status(&self) -> Option<StoreStatus> {
        let url = self.collection_url();
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Qdrant unreachable ({url}): {e}");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                "Qdrant collection '{}' not available: {}",
                self.collection,
                resp.status()
            );
            return None;
        }
        let body: Value = resp.json().await.ok()?;
        let chunk_count = body["result"]["points_count"].as_u64().unwrap_or(0) as usize;
        Some(StoreStatus {
            chunk_count,
            embedding_model: None,
        })
    }
}

#[async_trait]
impl KnowledgeStore for QdrantStore {
    fn name(&self) -> &str {
        "qdrant"
    }

    async fn load(&self) -> Option<StoreStatus> {
        {
            let cache = self.cache.read().await;
            match &*cache {
                CacheState::Ready(status) => return Some(status.clone()),
                CacheState::Failed => return None,
                CacheState::Unloaded => {}
            }
        }

        let mut cache = self.cache.write().await;
        match &*cache {
            CacheState::Ready(status) => return Some(status.clone()),
            CacheState::Failed => return None,
            CacheState::Unloaded => {}
        }

        match self.fetch_status().await {
            Some(status) => {
                tracing::info!(
                    "📚 Qdrant collection '{}' ready: {} chunks",
                    self.collection,
                    status.chunk_count
                );
                *cache = CacheState::Ready(status.clone());
                Some(status)
            }
            None => {
                *cache = CacheState::Failed;
                None
            }
        }
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Vec<RankedResult> {
        if self.load().await.is_none() {
            return Vec::new();
        }

        let body = json!({
            "vector": query,
            "limit": k,
            "with_payload": true,
        });
        let url = format!("{}/points/search", self.collection_url());
        let resp = match self.client.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!("Qdrant search failed: {}", resp.status());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Qdrant search failed: {e}");
                return Vec::new();
            }
        };

        let Ok(body) = resp.json::<Value>().await else {
            return Vec::new();
        };
        let Some(hits) = body["result"].as_array() else {
            return Vec::new();
        };

        hits.iter()
            .map(|hit| RankedResult {
                text: hit["payload"]["text"].as_str().unwrap_or("").to_string(),
                page_number: hit["payload"]["page_number"].as_u64().unwrap_or(0) as u32,
                chunk_index: hit["payload"]["chunk_index"].as_u64().unwrap_or(0) as usize,
                similarity: hit["score"].as_f64().unwrap_or(0.0) as f32,
            })
            .collect()
    }

    async fn rebuild(&self, kb: KnowledgeBase) -> Result<StoreStatus> {
        if !kb.dimensions_consistent() {
            return Err(GuideBotError::Knowledge(
                "new chunk set mixes embedding dimensions".into(),
            ));
        }
        if let Some(dim) = kb.embedding_dimension() {
            if dim != self.dimension {
                return Err(GuideBotError::Knowledge(format!(
                    "chunk dimension {dim} does not match collection dimension {}",
                    self.dimension
                )));
            }
        }

        // the collection is about to disappear; report unavailable until
        // the new generation is fully written
        *self.cache.write().await = CacheState::Failed;

        // best-effort delete — absence of a prior collection is not an error
        match self.client.delete(self.collection_url()).send().await {
            Ok(resp) => {
                tracing::debug!("delete collection '{}': {}", self.collection, resp.status())
            }
            Err(e) => tracing::debug!("delete collection '{}' failed: {e}", self.collection),
        }

        let create = json!({
            "vectors": {"size": self.dimension, "distance": "Cosine"},
        });
        let resp = self
            .client
            .put(self.collection_url())
            .json(&create)
            .send()
            .await
            .map_err(|e| GuideBotError::Http(format!("Qdrant connection failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(GuideBotError::Knowledge(format!(
                "failed to create collection '{}': {}",
                self.collection,
                resp.status()
            )));
        }

        let url = format!("{}/points?wait=true", self.collection_url());
        for batch in kb.chunks.chunks(UPSERT_BATCH) {
            let points: Vec<Value> = batch
                .iter()
                .map(|chunk| {
                    json!({
                        "id": chunk.chunk_index as u64,
                        "vector": chunk.embedding,
                        "payload": {
                            "text": chunk.text,
                            "page_number": chunk.page_number,
                            "chunk_index": chunk.chunk_index,
                        },
                    })
                })
                .collect();
            let resp = self
                .client
                .put(&url)
                .json(&json!({"points": points}))
                .send()
                .await
                .map_err(|e| GuideBotError::Http(format!("Qdrant connection failed: {e}")))?;
            if !resp.status().is_success() {
                return Err(GuideBotError::Knowledge(format!(
                    "bulk insert into '{}' failed: {}",
                    self.collection,
                    resp.status()
                )));
            }
        }

        let status = StoreStatus {
            chunk_count: kb.chunk_count(),
            embedding_model: if kb.metadata.embedding_model.is_empty() {
                None
            } else {
                Some(kb.metadata.embedding_model.clone())
            },
        };
        *self.cache.write().await = CacheState::Ready(status.clone());
        tracing::info!(
            "💾 Qdrant collection '{}' rebuilt: {} chunks",
            self.collection,
            status.chunk_count
        );
        Ok(status)
    }
}
