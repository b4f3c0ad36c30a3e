//! Cosine similarity ranking — the canonical retrieval metric.
//!
//! A query is ranked against every candidate chunk with a full linear scan:
//! O(n·d) for n chunks of dimension d, no partial sums cached across
//! queries. For the corpus sizes a single product manual produces (hundreds
//! of chunks) this beats any index structure on simplicity.

use guidebot_core::types::{Chunk, RankedResult};

/// Cosine similarity between two vectors, in [-1, 1].
///
/// A zero-norm vector (or a dimension mismatch) yields exactly 0.0 rather
/// than NaN, so degenerate chunks sort last instead of poisoning the
/// comparator.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Rank all chunks against a query embedding, best first, truncated to `k`.
///
/// The sort is stable and descending, so equal scores keep insertion order.
pub fn rank(chunks: &[Chunk], query: &[f32], k: usize) -> Vec<RankedResult> {
    let mut scored: Vec<(usize, f32)> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| (i, cosine_similarity(&chunk.embedding, query)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(i, similarity)| {
            let chunk = &chunks[i];
            RankedResult {
                text: chunk.text.clone(),
                page_number: chunk.page_number,
                chunk_index: chunk.chunk_index,
                similarity,
            }
        })
        .collect()
}
