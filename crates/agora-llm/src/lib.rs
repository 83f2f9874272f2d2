//! # agora-llm
//!
//! Text generation backend for the Agora debate board.
//!
//! Exposes the [`TextBackend`] trait the engine generates through, plus
//! the Anthropic Messages API implementation. Calls are plain
//! request/response (no streaming); the engine issues them strictly
//! sequentially, one voice at a time.

#![deny(unsafe_code)]

pub mod anthropic;
pub mod backend;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use backend::{BackendError, BackendResult, TextBackend};
