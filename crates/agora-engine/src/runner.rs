//! One engine tick, end to end.
//!
//! Resolve the schedule, parse the document, plan and execute the
//! round's generations, splice the results back in, and hand the
//! mutated document to the caller for persistence. Configuration
//! problems abort before any mutation; everything downstream degrades
//! and the tick still completes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use agora_core::errors::EngineError;
use agora_core::post::Post;
use agora_core::schedule::{ScheduleAction, resolve_at};
use agora_core::topic::TopicCatalog;
use agora_llm::TextBackend;

use crate::mutator::{apply, clear_section, update_banner};
use crate::parser::parse_document;
use crate::synthesizer::{Synthesizer, plan_turns};

/// Default pause between backend calls.
pub const DEFAULT_API_DELAY: Duration = Duration::from_millis(500);

/// What a tick did, for the caller's logs and exit reporting.
#[derive(Clone, Copy, Debug)]
pub struct RunReport {
    /// The action the schedule resolved to.
    pub action: ScheduleAction,
    /// Posts written into the document.
    pub posts_added: usize,
    /// Replies degraded to top-level because their parent was missing.
    pub degraded_replies: usize,
    /// Malformed fragments skipped while parsing.
    pub skipped_fragments: usize,
    /// Generations that failed and became placeholders.
    pub failed_generations: usize,
}

/// The discussion-state engine.
pub struct Engine {
    synthesizer: Synthesizer,
}

impl Engine {
    /// Create an engine with the default inter-call delay.
    #[must_use]
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self::with_api_delay(backend, DEFAULT_API_DELAY)
    }

    /// Create an engine with an explicit inter-call delay.
    #[must_use]
    pub fn with_api_delay(backend: Arc<dyn TextBackend>, api_delay: Duration) -> Self {
        Self {
            synthesizer: Synthesizer::new(backend, api_delay),
        }
    }

    /// Run one tick at `now` over `document`.
    ///
    /// Returns the mutated document and a report. The document is
    /// always returned for persistence, even on `Idle`, because the
    /// banner may have changed. The only error path is configuration
    /// (empty or gapped catalog), which fires before any mutation.
    pub async fn run_tick(
        &self,
        now: DateTime<Utc>,
        document: &str,
        catalog: &TopicCatalog,
    ) -> Result<(String, RunReport), EngineError> {
        let action = resolve_at(now);
        // The Sunday reset prepares the incoming week, so it banners
        // and introduces the next topic, not the outgoing one.
        let topic = match action {
            ScheduleAction::ResetForNextTopic => catalog.next(now)?,
            _ => catalog.current(now)?,
        };
        info!(?action, week = topic.week, topic = %topic.title, "tick");

        let parsed = parse_document(document);
        debug!(
            posts = parsed.posts.len(),
            skipped = parsed.skipped,
            "document parsed"
        );

        let mut working = document.to_owned();
        if action == ScheduleAction::ResetForNextTopic {
            working = clear_section(&working);
        }
        working = update_banner(&working, topic);

        let posts: &[Post] = match action {
            ScheduleAction::ResetForNextTopic => &[],
            _ => parsed.posts.as_slice(),
        };
        let turns = plan_turns(action, topic, posts);
        if turns.is_empty() {
            debug!("no posts planned for this tick");
        }
        let outcome = self.synthesizer.execute(&turns).await;
        let mutation = apply(&working, &outcome.posts);

        let report = RunReport {
            action,
            posts_added: mutation.inserted,
            degraded_replies: mutation.degraded_replies,
            skipped_fragments: parsed.skipped,
            failed_generations: outcome.failed_generations,
        };
        info!(
            posts_added = report.posts_added,
            degraded = report.degraded_replies,
            skipped = report.skipped_fragments,
            failed = report.failed_generations,
            "tick complete"
        );
        Ok((mutation.document, report))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
