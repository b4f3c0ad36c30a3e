//! # GuideBot Ingest
//!
//! Turns pre-extracted manual pages into an embedded knowledge base.
//!
//! PDF parsing and vision analysis run out-of-process; what arrives here is
//! their output — plain per-page text. This crate chunks it, embeds each
//! chunk, and assembles the `KnowledgeBase` document a store can be rebuilt
//! from.

pub mod chunker;
pub mod pipeline;

pub use chunker::{DraftChunk, ExtractedPages, PageContent, chunk_pages};
pub use pipeline::{build_knowledge_base, embed_chunks, knowledge_base_from_chunks};
