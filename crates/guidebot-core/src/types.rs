//! Shared data types for the retrieval pipeline.
//!
//! `Chunk` and `KnowledgeBase` mirror the persisted `knowledge_base.json`
//! schema produced by the ingestion pipeline — that file format is a wire
//! contract, existing knowledge bases must keep loading.

use serde::{Deserialize, Serialize};

/// The atomic retrievable unit: a span of manual text plus its embedding
/// and provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Natural-language content of the chunk.
    pub text: String,
    /// Fixed-dimension embedding vector; comparable only to vectors from
    /// the same model.
    pub embedding: Vec<f32>,
    /// Source page, for citation. 0 = unknown.
    #[serde(default)]
    pub page_number: u32,
    /// Ordinal position within the ingestion run. Traceability only.
    #[serde(default)]
    pub chunk_index: usize,
    /// Informational token count; not load-bearing for retrieval.
    #[serde(default)]
    pub token_count: usize,
}

/// Metadata block of the persisted knowledge base.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KbMetadata {
    #[serde(default)]
    pub total_chunks: usize,
    #[serde(default)]
    pub total_tokens: usize,
    #[serde(default)]
    pub embedding_model: String,
    #[serde(default)]
    pub vision_model: String,
}

/// A complete, versioned knowledge base: metadata plus the ordered chunk set.
///
/// Built once per ingestion run and replaced wholesale on re-ingestion —
/// partial overwrites could mix incompatible embedding spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub metadata: KbMetadata,
    pub chunks: Vec<Chunk>,
}

impl KnowledgeBase {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embedding dimension declared by the first chunk, `None` when empty.
    pub fn embedding_dimension(&self) -> Option<usize> {
        self.chunks.first().map(|c| c.embedding.len())
    }

    /// Every chunk must carry an embedding of the same dimension.
    pub fn dimensions_consistent(&self) -> bool {
        match self.embedding_dimension() {
            Some(dim) => self.chunks.iter().all(|c| c.embedding.len() == dim),
            None => true,
        }
    }
}

/// An ephemeral pairing of chunk content and its similarity to a query.
/// Never persisted; embeddings are not carried along.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub text: String,
    pub page_number: u32,
    pub chunk_index: usize,
    /// Cosine similarity in [-1, 1].
    pub similarity: f32,
}

/// Response-facing citation record — a redacted view of a chunk.
/// Field names are the public JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub page: u32,
    pub similarity: f32,
}

/// The engine's output: generated answer text plus trimmed citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Summary a knowledge store reports once loaded, for health/status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub chunk_count: usize,
    pub embedding_model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_defaults_on_missing_fields() {
        // page_number / chunk_index / token_count may be absent in old files
        let json = r#"{"text": "hello", "embedding": [0.1, 0.2]}"#;
        let chunk: Chunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.page_number, 0);
        assert_eq!(chunk.chunk_index, 0);
        assert_eq!(chunk.token_count, 0);
    }

    #[test]
    fn test_knowledge_base_file_schema() {
        let json = r#"{
            "metadata": {
                "total_chunks": 1,
                "total_tokens": 7,
                "embedding_model": "text-embedding-3-small",
                "vision_model": "gpt-4o"
            },
            "chunks": [
                {"text": "press the red key", "embedding": [1.0, 0.0], "page_number": 3, "chunk_index": 0, "token_count": 7}
            ]
        }"#;
        let kb: KnowledgeBase = serde_json::from_str(json).unwrap();
        assert_eq!(kb.chunk_count(), 1);
        assert_eq!(kb.metadata.embedding_model, "text-embedding-3-small");
        assert_eq!(kb.embedding_dimension(), Some(2));
        assert!(kb.dimensions_consistent());
    }

    #[test]
    fn test_dimension_consistency_detects_mismatch() {
        let kb = KnowledgeBase {
            metadata: KbMetadata::default(),
            chunks: vec![
                Chunk {
                    text: "a".into(),
                    embedding: vec![1.0, 0.0],
                    page_number: 1,
                    chunk_index: 0,
                    token_count: 1,
                },
                Chunk {
                    text: "b".into(),
                    embedding: vec![1.0, 0.0, 0.0],
                    page_number: 1,
                    chunk_index: 1,
                    token_count: 1,
                },
            ],
        };
        assert!(!kb.dimensions_consistent());
    }
}
