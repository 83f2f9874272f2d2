//! # agora-core
//!
//! Foundation types for the Agora debate board engine.
//!
//! This crate provides the shared vocabulary the other Agora crates depend on:
//!
//! - **Voices**: [`Voice`], the fixed set of contributor identities
//! - **Posts**: [`Post`], [`PostId`], [`TimeSlot`], the thread data model
//! - **Schedule**: [`ScheduleAction`] and the pure [`schedule::resolve`] function
//! - **Topics**: [`Topic`] and the week-indexed [`TopicCatalog`]
//! - **Text**: HTML body escaping and generation-output cleanup
//! - **Errors**: [`ConfigurationError`] and the top-level [`EngineError`]

#![deny(unsafe_code)]

pub mod errors;
pub mod post;
pub mod schedule;
pub mod text;
pub mod topic;
pub mod voice;

pub use errors::{ConfigurationError, EngineError};
pub use post::{Post, PostId, PostKind, TimeSlot};
pub use schedule::ScheduleAction;
pub use topic::{Topic, TopicCatalog};
pub use voice::Voice;
