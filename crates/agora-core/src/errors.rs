//! Error hierarchy for the Agora engine.
//!
//! The taxonomy follows the run's failure semantics:
//!
//! - [`ConfigurationError`]: fatal, aborts the run before any document
//!   mutation (missing credential, unusable catalog)
//! - [`EngineError`]: top-level enum the binary reports on; wraps
//!   configuration and I/O failures
//!
//! Per-voice generation failures, malformed document fragments, and
//! orphaned replies are deliberately *not* here: they are recovered
//! in place (placeholder body, skipped fragment, degraded insertion)
//! and surfaced as counters in the run report.

use thiserror::Error;

/// Fatal configuration problem; nothing is mutated when one is raised.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Required credential environment variable is unset or empty.
    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    /// The topic catalog contains no topics.
    #[error("topic catalog is empty")]
    EmptyCatalog,

    /// The cycled week lookup found no topic (gapped catalog).
    #[error("topic catalog has no entry for week {0}")]
    MissingWeek(u32),

    /// The topic catalog file could not be parsed.
    #[error("failed to parse topic catalog: {0}")]
    InvalidCatalog(#[source] serde_json::Error),
}

/// Top-level error type for a run of the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Fatal configuration problem.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Reading or writing the document failed.
    #[error("document I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
