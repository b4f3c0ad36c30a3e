//! Word-window chunking of extracted manual pages.

use serde::{Deserialize, Serialize};

use guidebot_core::config::IngestConfig;

/// One extracted page: text content plus combined vision analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: u32,
    pub content: String,
}

/// The extractor's output document consumed by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPages {
    /// Vision model used by the extractor, recorded in KB metadata.
    #[serde(default)]
    pub vision_model: String,
    pub pages: Vec<PageContent>,
}

/// A chunk awaiting its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftChunk {
    pub text: String,
    pub page_number: u32,
    /// Global ordinal across the whole ingestion run.
    pub chunk_index: usize,
}

/// Split pages into overlapping word windows.
///
/// Windows are `chunk_size` words, stepping `chunk_size - chunk_overlap`;
/// fragments of `min_chunk_chars` characters or fewer are dropped. A chunk
/// never spans pages, so page provenance stays exact.
pub fn chunk_pages(pages: &[PageContent], cfg: &IngestConfig) -> Vec<DraftChunk> {
    let step = cfg.chunk_size.saturating_sub(cfg.chunk_overlap).max(1);
    let mut chunks = Vec::new();

    for page in pages {
        let words: Vec<&str> = page.content.split_whitespace().collect();
        let mut start = 0;
        while start < words.len() {
            let end = (start + cfg.chunk_size).min(words.len());
            let text = words[start..end].join(" ");
            if text.chars().count() > cfg.min_chunk_chars {
                chunks.push(DraftChunk {
                    text,
                    page_number: page.page_number,
                    chunk_index: chunks.len(),
                });
            }
            start += step;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(chunk_size: usize, chunk_overlap: usize, min_chunk_chars: usize) -> IngestConfig {
        IngestConfig {
            chunk_size,
            chunk_overlap,
            min_chunk_chars,
        }
    }

    fn page(n: u32, content: &str) -> PageContent {
        PageContent {
            page_number: n,
            content: content.into(),
        }
    }

    #[test]
    fn test_empty_pages_yield_no_chunks() {
        assert!(chunk_pages(&[], &cfg(10, 2, 0)).is_empty());
        assert!(chunk_pages(&[page(1, "   ")], &cfg(10, 2, 0)).is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        // 10 words, window 5, overlap 2 -> starts at 0, 3, 6, 9
        let content = "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9";
        let chunks = chunk_pages(&[page(1, content)], &cfg(5, 2, 0));
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text, "w0 w1 w2 w3 w4");
        assert_eq!(chunks[1].text, "w3 w4 w5 w6 w7");
        assert_eq!(chunks[3].text, "w9");
    }

    #[test]
    fn test_short_fragments_are_dropped() {
        let chunks = chunk_pages(&[page(1, "tiny bits of text")], &cfg(2, 0, 100));
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_index_is_global_across_pages() {
        let pages = vec![page(1, "a b c d e f"), page(2, "g h i j k l")];
        let chunks = chunk_pages(&pages, &cfg(3, 0, 0));
        let indexes: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[2].page_number, 2);
    }

    #[test]
    fn test_extracted_pages_schema() {
        let json = r#"{
            "vision_model": "gpt-4o",
            "pages": [{"page_number": 1, "content": "press the mode key"}]
        }"#;
        let doc: ExtractedPages = serde_json::from_str(json).unwrap();
        assert_eq!(doc.vision_model, "gpt-4o");
        assert_eq!(doc.pages.len(), 1);

        // vision_model may be absent
        let json = r#"{"pages": []}"#;
        let doc: ExtractedPages = serde_json::from_str(json).unwrap();
        assert!(doc.vision_model.is_empty());
    }
}
