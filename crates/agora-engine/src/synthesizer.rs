//! Turns a schedule action into generated posts.
//!
//! Planning and execution are split: [`plan_turns`] is a pure function
//! that lays out every turn of the round before any backend call is
//! made, so the batch is inspectable and testable without a backend.
//! [`Synthesizer::execute`] then walks the plan one call at a time with
//! a fixed pause between calls. A failed generation becomes a
//! placeholder post; it never aborts the rest of the round.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use agora_core::post::{Post, PostId, TimeSlot};
use agora_core::schedule::{OPENING_HOUR, ScheduleAction, WEEKEND_SLOT};
use agora_core::text::strip_voice_intro;
use agora_core::topic::Topic;
use agora_core::voice::Voice;
use agora_llm::TextBackend;

use crate::prompts::{
    DEFAULT_MAX_TOKENS, INTRO_MAX_TOKENS, RECENT_WINDOW, SUMMARY_MAX_TOKENS, intro_prompt,
    opening_prompt, reply_prompt, summary_prompt,
};
use crate::selector::select_parent;

/// Body written in place of a post whose generation failed.
pub const PLACEHOLDER_BODY: &str = "[generation unavailable]";

/// One generation the engine intends to perform.
#[derive(Clone, Debug)]
pub struct PlannedTurn {
    /// The voice speaking.
    pub voice: Voice,
    /// Slot stamped on the resulting post.
    pub slot: TimeSlot,
    /// Parent post when the turn is a reply.
    pub parent_id: Option<PostId>,
    /// Full prompt handed to the backend.
    pub prompt: String,
    /// Token budget for this turn.
    pub max_tokens: u32,
}

/// Lay out the full ordered batch of turns for an action.
///
/// Pure over its inputs; no backend is consulted. `Idle` and `OpenWeek`
/// plan nothing. A dialogue round at the opening hour, or over an empty
/// wall, is an opening round: every perspective voice gets a fresh
/// top-level turn. Any later round plans one reply per perspective,
/// threading through the selector with a batch-local tally so the
/// voices spread across the wall.
#[must_use]
pub fn plan_turns(action: ScheduleAction, topic: &Topic, posts: &[Post]) -> Vec<PlannedTurn> {
    match action {
        ScheduleAction::Idle | ScheduleAction::OpenWeek => Vec::new(),
        ScheduleAction::DialogueRound(slot) => {
            let no_threads = !posts.iter().any(Post::is_top_level);
            if slot.hour() == OPENING_HOUR || no_threads {
                plan_opening_round(slot, topic)
            } else {
                plan_reply_round(slot, topic, posts)
            }
        }
        ScheduleAction::WeeklySummary => vec![PlannedTurn {
            voice: Voice::Referee,
            slot: WEEKEND_SLOT,
            parent_id: None,
            prompt: summary_prompt(topic, posts),
            max_tokens: SUMMARY_MAX_TOKENS,
        }],
        ScheduleAction::ResetForNextTopic => vec![PlannedTurn {
            voice: Voice::Referee,
            slot: WEEKEND_SLOT,
            parent_id: None,
            prompt: intro_prompt(topic),
            max_tokens: INTRO_MAX_TOKENS,
        }],
    }
}

fn plan_opening_round(slot: TimeSlot, topic: &Topic) -> Vec<PlannedTurn> {
    Voice::PERSPECTIVES
        .into_iter()
        .map(|voice| PlannedTurn {
            voice,
            slot,
            parent_id: None,
            prompt: opening_prompt(voice, topic),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
        .collect()
}

fn plan_reply_round(slot: TimeSlot, topic: &Topic, posts: &[Post]) -> Vec<PlannedTurn> {
    let mut pending: HashMap<PostId, usize> = HashMap::new();
    let mut turns = Vec::with_capacity(Voice::PERSPECTIVES.len());

    for voice in Voice::PERSPECTIVES {
        let Some(parent) = select_parent(voice, posts, &pending) else {
            // No thread by another voice to answer; open one instead.
            turns.push(PlannedTurn {
                voice,
                slot,
                parent_id: None,
                prompt: opening_prompt(voice, topic),
                max_tokens: DEFAULT_MAX_TOKENS,
            });
            continue;
        };

        // The wall is newest-first, so document order is already
        // most-recent-first.
        let recent: Vec<&Post> = posts
            .iter()
            .filter(|post| post.id != parent.id)
            .take(RECENT_WINDOW)
            .collect();

        turns.push(PlannedTurn {
            voice,
            slot,
            parent_id: Some(parent.id.clone()),
            prompt: reply_prompt(voice, topic, parent, &recent),
            max_tokens: DEFAULT_MAX_TOKENS,
        });
        *pending.entry(parent.id.clone()).or_insert(0) += 1;
    }
    turns
}

/// Result of executing a planned batch.
#[derive(Debug)]
pub struct SynthesisOutcome {
    /// One post per planned turn, in plan order.
    pub posts: Vec<Post>,
    /// Turns whose generation failed and became placeholders.
    pub failed_generations: usize,
}

/// Executes planned turns against a text backend, sequentially.
pub struct Synthesizer {
    backend: Arc<dyn TextBackend>,
    api_delay: Duration,
}

impl Synthesizer {
    /// Create a synthesizer pausing `api_delay` between backend calls.
    #[must_use]
    pub fn new(backend: Arc<dyn TextBackend>, api_delay: Duration) -> Self {
        Self { backend, api_delay }
    }

    /// Run every turn in order, one backend call at a time.
    ///
    /// Produces exactly one post per turn; failed generations carry
    /// [`PLACEHOLDER_BODY`] and are counted, never skipped.
    pub async fn execute(&self, turns: &[PlannedTurn]) -> SynthesisOutcome {
        let mut posts = Vec::with_capacity(turns.len());
        let mut failed_generations = 0;

        for (i, turn) in turns.iter().enumerate() {
            if i > 0 && !self.api_delay.is_zero() {
                tokio::time::sleep(self.api_delay).await;
            }
            debug!(
                voice = %turn.voice,
                slot = %turn.slot,
                max_tokens = turn.max_tokens,
                reply = turn.parent_id.is_some(),
                "generating post"
            );

            let body = match self.backend.generate(&turn.prompt, turn.max_tokens).await {
                Ok(text) => strip_voice_intro(&text, turn.voice),
                Err(err) => {
                    warn!(voice = %turn.voice, category = err.category(), %err,
                        "generation failed, writing placeholder");
                    failed_generations += 1;
                    PLACEHOLDER_BODY.to_owned()
                }
            };

            let post = match &turn.parent_id {
                Some(parent) => Post::reply(turn.voice, turn.slot, body, parent.clone()),
                None => Post::top_level(turn.voice, turn.slot, body),
            };
            posts.push(post);
        }

        SynthesisOutcome {
            posts,
            failed_generations,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use agora_core::post::PostKind;
    use agora_llm::{BackendError, BackendResult};

    fn topic() -> Topic {
        Topic {
            week: 1,
            title: "Universal basic income".into(),
            category: "Economy".into(),
        }
    }

    fn slot(hour: u8) -> TimeSlot {
        TimeSlot::new(hour).unwrap()
    }

    fn openings() -> Vec<Post> {
        Voice::PERSPECTIVES
            .into_iter()
            .map(|voice| Post::top_level(voice, slot(8), format!("{voice} opens")))
            .collect()
    }

    // ── plan_turns ───────────────────────────────────────────────────────

    #[test]
    fn opening_hour_plans_four_top_level_turns() {
        let turns = plan_turns(
            ScheduleAction::DialogueRound(slot(8)),
            &topic(),
            &openings(),
        );
        assert_eq!(turns.len(), 4);
        for (turn, voice) in turns.iter().zip(Voice::PERSPECTIVES) {
            assert_eq!(turn.voice, voice);
            assert!(turn.parent_id.is_none());
            assert_eq!(turn.max_tokens, DEFAULT_MAX_TOKENS);
            assert!(turn.prompt.contains("Universal basic income"));
        }
    }

    #[test]
    fn empty_wall_turns_any_round_into_an_opening_round() {
        let turns = plan_turns(ScheduleAction::DialogueRound(slot(18)), &topic(), &[]);
        assert_eq!(turns.len(), 4);
        assert!(turns.iter().all(|turn| turn.parent_id.is_none()));
    }

    #[test]
    fn reply_round_spreads_over_distinct_parents() {
        let posts = openings();
        let turns = plan_turns(ScheduleAction::DialogueRound(slot(12)), &topic(), &posts);
        assert_eq!(turns.len(), 4);

        let parents: Vec<&PostId> = turns
            .iter()
            .map(|turn| turn.parent_id.as_ref().unwrap())
            .collect();
        // With four fresh threads and a batch-local tally, each voice
        // answers a different one, and never its own.
        for (turn, parent) in turns.iter().zip(&parents) {
            assert_ne!(parent.as_str(), PostId::top_level(turn.voice, slot(8)).as_str());
        }
        let mut unique = parents.clone();
        unique.sort_by_key(|id| id.as_str().to_owned());
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn reply_round_falls_back_to_opening_without_candidates() {
        // Only North has a thread, so North itself has nothing to
        // answer and opens again, while the others reply to it.
        let posts = vec![Post::top_level(Voice::North, slot(8), "solo".into())];
        let turns = plan_turns(ScheduleAction::DialogueRound(slot(12)), &topic(), &posts);
        assert_eq!(turns.len(), 4);
        assert!(turns[0].parent_id.is_none());
        assert!(turns[1..].iter().all(|turn| turn.parent_id.is_some()));
    }

    #[test]
    fn summary_plans_one_referee_turn() {
        let turns = plan_turns(ScheduleAction::WeeklySummary, &topic(), &openings());
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].voice, Voice::Referee);
        assert_eq!(turns[0].slot, WEEKEND_SLOT);
        assert_eq!(turns[0].max_tokens, SUMMARY_MAX_TOKENS);
        assert!(turns[0].prompt.contains("weekly summary"));
    }

    #[test]
    fn reset_plans_one_intro_turn() {
        let turns = plan_turns(ScheduleAction::ResetForNextTopic, &topic(), &[]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].voice, Voice::Referee);
        assert_eq!(turns[0].max_tokens, INTRO_MAX_TOKENS);
        assert!(turns[0].prompt.contains("introduction post"));
    }

    #[test]
    fn idle_and_open_week_plan_nothing() {
        assert!(plan_turns(ScheduleAction::Idle, &topic(), &openings()).is_empty());
        assert!(plan_turns(ScheduleAction::OpenWeek, &topic(), &openings()).is_empty());
    }

    // ── execute ──────────────────────────────────────────────────────────

    /// Backend that pops scripted responses in order.
    struct ScriptedBackend {
        script: Mutex<VecDeque<BackendResult<String>>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<BackendResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
            })
        }
    }

    #[async_trait]
    impl TextBackend for ScriptedBackend {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str, _max_tokens: u32) -> BackendResult<String> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(BackendError::EmptyCompletion))
        }
    }

    fn turn(voice: Voice, parent_id: Option<PostId>) -> PlannedTurn {
        PlannedTurn {
            voice,
            slot: slot(12),
            parent_id,
            prompt: "p".into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[tokio::test]
    async fn execute_builds_posts_and_strips_intros() {
        let backend = ScriptedBackend::new(vec![
            Ok("As NORTH AI, the data is clear.".to_owned()),
            Ok("Markets disagree.".to_owned()),
        ]);
        let synth = Synthesizer::new(backend, Duration::ZERO);
        let parent = PostId::from("post-north-0800");
        let outcome = synth
            .execute(&[
                turn(Voice::North, None),
                turn(Voice::East, Some(parent.clone())),
            ])
            .await;

        assert_eq!(outcome.failed_generations, 0);
        assert_eq!(outcome.posts.len(), 2);
        assert_eq!(outcome.posts[0].body, "the data is clear.");
        assert_eq!(outcome.posts[0].kind, PostKind::TopLevel);
        assert_eq!(outcome.posts[1].body, "Markets disagree.");
        assert_eq!(outcome.posts[1].parent_id, Some(parent));
    }

    #[tokio::test]
    async fn execute_recovers_failures_with_placeholders() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::Api {
                status: 429,
                body: "rate limited".into(),
            }),
            Ok("still speaking".to_owned()),
        ]);
        let synth = Synthesizer::new(backend, Duration::ZERO);
        let outcome = synth
            .execute(&[turn(Voice::North, None), turn(Voice::East, None)])
            .await;

        assert_eq!(outcome.failed_generations, 1);
        assert_eq!(outcome.posts[0].body, PLACEHOLDER_BODY);
        assert_eq!(outcome.posts[1].body, "still speaking");
    }
}
