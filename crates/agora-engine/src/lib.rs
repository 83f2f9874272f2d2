//! # agora-engine
//!
//! The discussion-state engine for the Agora debate board.
//!
//! The persisted HTML page is the only store of conversation state, so
//! every run round-trips it: parse the existing thread back into
//! structured posts, decide what this tick should produce, generate the
//! bodies one voice at a time, and splice the rendered fragments back in
//! at their marker-addressed insertion points.
//!
//! Pipeline: [`schedule resolution`](agora_core::schedule) →
//! [`parser`] → [`synthesizer`] (which consults [`selector`]) →
//! [`mutator`] → persisted document.
//!
//! Concurrent invocations against the same document are unsafe: the
//! read-modify-write cycle has no locking and no transactional update.
//! The external scheduler must guarantee runs never overlap.

#![deny(unsafe_code)]

pub mod markup;
pub mod mutator;
pub mod parser;
pub mod prompts;
pub mod runner;
pub mod selector;
pub mod synthesizer;

pub use runner::{Engine, RunReport};
