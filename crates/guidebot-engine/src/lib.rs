//! # GuideBot Engine
//!
//! The question-answering pipeline: embed the question, rank the knowledge
//! base, build a grounded prompt, invoke the completion model, and package
//! the answer with trimmed sources. One engine serves every store backend —
//! the store arrives as a trait object, never as a code path.
//!
//! The engine is stateless per question: no conversation memory, no session
//! state. Its one hard promise is that `ask` always returns something
//! renderable — upstream failures become answers carrying the error text,
//! not exceptions.

pub mod engine;
pub mod prompt;

pub use engine::{EngineOptions, RagEngine};
