//! # GuideBot Gateway
//!
//! The HTTP surface a chat UI talks to: `POST /ask` for questions,
//! `GET /health` and `GET /status` for monitoring, `POST /rebuild` for
//! re-ingestion. Everything interesting happens in `guidebot-engine`; this
//! crate is routing, validation, CORS, and request tracing.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
