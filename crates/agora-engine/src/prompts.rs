//! Prompt assembly for every kind of generated post.
//!
//! Each perspective voice carries a fixed persona block; the task
//! section below it varies with the schedule action. Prompts are plain
//! strings handed to the backend unchanged.

use agora_core::post::Post;
use agora_core::text::{truncate_with_suffix, TRUNCATION_SUFFIX};
use agora_core::topic::Topic;
use agora_core::voice::Voice;

/// Token budget for ordinary dialogue posts.
pub const DEFAULT_MAX_TOKENS: u32 = 300;
/// Token budget for the week-opening introduction.
pub const INTRO_MAX_TOKENS: u32 = 400;
/// Token budget for the weekly summary.
pub const SUMMARY_MAX_TOKENS: u32 = 600;

/// How many recent bodies a reply prompt may quote.
pub const RECENT_WINDOW: usize = 6;
/// Byte cap per quoted recent body.
pub const RECENT_TRUNCATE: usize = 280;
/// Byte cap per voice in the weekly summary aggregate.
pub const VOICE_AGGREGATE_TRUNCATE: usize = 600;

/// The fixed persona block for a voice.
#[must_use]
pub fn persona(voice: Voice) -> &'static str {
    match voice {
        Voice::North => {
            "You are NORTH AI, the urgency perspective.\n\n\
             CORE VALUES:\n\
             - Scientific consensus leads\n\
             - Climate and environment demand immediate action\n\
             - Precaution over economic interest\n\
             - Collective responsibility over individual freedom\n\
             - Strong government intervention is necessary\n\n\
             TONE:\n\
             - Direct and urgent, frustrated with delay\n\
             - Cites figures and data\n\
             - Impatient but respectful\n\n\
             Answer in at most 70 words."
        }
        Voice::East => {
            "You are EAST AI, the economic perspective.\n\n\
             CORE VALUES:\n\
             - Market mechanisms find the best solutions\n\
             - Technological innovation is the key\n\
             - Economic feasibility is essential\n\
             - Skeptical of government intervention\n\
             - Always weigh costs against benefits\n\n\
             TONE:\n\
             - Analytical and data-driven\n\
             - Pragmatic, businesslike, constructive\n\n\
             Answer in at most 70 words."
        }
        Voice::South => {
            "You are SOUTH AI, the systems perspective.\n\n\
             CORE VALUES:\n\
             - Everything is connected to everything\n\
             - Inclusivity and diverse voices\n\
             - Balance between economy, ecology, and society\n\
             - Local knowledge and communities\n\
             - Integrated solutions\n\n\
             TONE:\n\
             - Nuanced and bridging, seeks consensus\n\
             - Empathic, brings perspectives together\n\n\
             Answer in at most 70 words."
        }
        Voice::West => {
            "You are WEST AI, the philosophical perspective.\n\n\
             CORE VALUES:\n\
             - Problems are rooted in deeper cultural crises\n\
             - Question the underlying values\n\
             - Challenge growth assumptions\n\
             - Harmony with nature as the goal\n\
             - Inner transformation is needed\n\n\
             TONE:\n\
             - Contemplative and reflective\n\
             - Asks fundamental questions, thinks long-term\n\n\
             Answer in at most 70 words."
        }
        Voice::Referee => {
            "You are the REFEREE, the neutral moderator.\n\n\
             ROLE:\n\
             - Objective and fair, no position of your own\n\
             - Treat all perspectives equally\n\
             - Provide synthesis, structure, and overview\n\n\
             TONE:\n\
             - Neutral, balanced, clear"
        }
    }
}

/// Opening statement at the start of a topic week.
#[must_use]
pub fn opening_prompt(voice: Voice, topic: &Topic) -> String {
    format!(
        "{persona}\n\n\
         THIS WEEK'S TOPIC: \"{title}\"\n\
         CATEGORY: {category}\n\n\
         TASK: Give your opening statement on this topic.\n\
         - What is your position?\n\
         - What are the key points from your perspective?\n\
         - Which concerns or opportunities do you see?\n\n\
         This is your first contribution to the debate. Be clear about \
         where you stand.",
        persona = persona(voice),
        title = topic.title,
        category = topic.category,
    )
}

/// Reply to a chosen parent, with a window of recent context.
///
/// `recent` must be most-recent-first; anything past [`RECENT_WINDOW`]
/// is dropped and each quoted body is capped at [`RECENT_TRUNCATE`]
/// bytes.
#[must_use]
pub fn reply_prompt(voice: Voice, topic: &Topic, parent: &Post, recent: &[&Post]) -> String {
    let mut context = String::new();
    for post in recent.iter().take(RECENT_WINDOW) {
        let quoted = truncate_with_suffix(&post.body, RECENT_TRUNCATE, TRUNCATION_SUFFIX);
        context.push_str(&format!("- {}: {quoted}\n", post.voice.display_name()));
    }
    if context.is_empty() {
        context.push_str("(no other posts yet)\n");
    }

    format!(
        "{persona}\n\n\
         TOPIC: \"{title}\"\n\n\
         YOU ARE REPLYING TO {parent_name}:\n\
         \"{parent_body}\"\n\n\
         RECENT DISCUSSION (newest first):\n\
         {context}\n\
         TASK: Respond to {parent_name}'s post.\n\
         - Deepen or qualify your earlier position\n\
         - Engage with their argument directly\n\
         - Bring in new insight or examples\n\
         - Stay true to your core values but show that you listen\n\n\
         Be constructive and add something new to the discussion.",
        persona = persona(voice),
        title = topic.title,
        parent_name = parent.voice.display_name(),
        parent_body = parent.body,
    )
}

/// Weekly summary by the referee, grouped per voice.
#[must_use]
pub fn summary_prompt(topic: &Topic, posts: &[Post]) -> String {
    let mut sections = String::new();
    for voice in Voice::PERSPECTIVES {
        let aggregate: String = posts
            .iter()
            .filter(|post| post.voice == voice)
            .map(|post| post.body.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let capped = truncate_with_suffix(&aggregate, VOICE_AGGREGATE_TRUNCATE, TRUNCATION_SUFFIX);
        sections.push_str(&format!("{}:\n{capped}\n\n", voice.display_name()));
    }

    format!(
        "{persona}\n\n\
         TASK: Write the weekly summary of this debate.\n\n\
         TOPIC: \"{title}\"\n\
         CATEGORY: {category}\n\
         WEEK: {week}\n\n\
         WHAT EACH VOICE SAID:\n\n\
         {sections}\
         Structure your summary as follows:\n\n\
         1. MAIN POINTS PER PERSPECTIVE\n\
         2. COMMON GROUND: where did the perspectives (partly) agree?\n\
         3. KEY DIFFERENCES: which disagreements remain?\n\
         4. INSIGHTS: what new insights emerged?\n\
         5. OUTLOOK: a short teaser for next week.\n\n\
         At most 300 words. Stay strictly neutral.",
        persona = persona(Voice::Referee),
        title = topic.title,
        category = topic.category,
        week = topic.week,
    )
}

/// Introduction post for an incoming topic week.
#[must_use]
pub fn intro_prompt(topic: &Topic) -> String {
    format!(
        "{persona}\n\n\
         TASK: Write an introduction post for the new weekly topic.\n\n\
         TOPIC: \"{title}\"\n\
         CATEGORY: {category}\n\
         WEEK: {week}\n\n\
         Write an engaging introduction that:\n\
         1. Briefly explains the topic\n\
         2. Says why it is relevant right now\n\
         3. Names the questions that are central this week\n\
         4. Invites the four perspectives to respond\n\n\
         At most 150 words. Be enthusiastic but neutral.",
        persona = persona(Voice::Referee),
        title = topic.title,
        category = topic.category,
        week = topic.week,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::post::TimeSlot;

    fn topic() -> Topic {
        Topic {
            week: 3,
            title: "Nuclear power in the energy mix".into(),
            category: "Energy".into(),
        }
    }

    fn post(voice: Voice, body: &str) -> Post {
        Post::top_level(voice, TimeSlot::new(8).unwrap(), body.into())
    }

    #[test]
    fn opening_prompt_carries_persona_and_topic() {
        let prompt = opening_prompt(Voice::North, &topic());
        assert!(prompt.starts_with("You are NORTH AI"));
        assert!(prompt.contains("Nuclear power in the energy mix"));
        assert!(prompt.contains("CATEGORY: Energy"));
    }

    #[test]
    fn reply_prompt_quotes_parent_and_context() {
        let parent = post(Voice::East, "Markets will price this in.");
        let ctx = post(Voice::South, "We should hear local communities.");
        let prompt = reply_prompt(Voice::North, &topic(), &parent, &[&ctx]);
        assert!(prompt.contains("YOU ARE REPLYING TO EAST AI"));
        assert!(prompt.contains("Markets will price this in."));
        assert!(prompt.contains("- SOUTH AI: We should hear local communities."));
    }

    #[test]
    fn reply_prompt_caps_the_context_window() {
        let parent = post(Voice::East, "parent");
        let extras: Vec<Post> = (0..10)
            .map(|i| post(Voice::South, &format!("context-{i}")))
            .collect();
        let refs: Vec<&Post> = extras.iter().collect();
        let prompt = reply_prompt(Voice::North, &topic(), &parent, &refs);
        assert!(prompt.contains("context-5"));
        assert!(!prompt.contains("context-6"));
    }

    #[test]
    fn reply_prompt_truncates_long_context_bodies() {
        let parent = post(Voice::East, "parent");
        let long = post(Voice::West, &"x".repeat(400));
        let prompt = reply_prompt(Voice::North, &topic(), &parent, &[&long]);
        assert!(!prompt.contains(&"x".repeat(300)));
        assert!(prompt.contains(&"x".repeat(200)));
    }

    #[test]
    fn summary_prompt_groups_by_voice_and_skips_referee() {
        let posts = vec![
            post(Voice::North, "act now"),
            post(Voice::North, "and faster"),
            post(Voice::Referee, "moderating note"),
        ];
        let prompt = summary_prompt(&topic(), &posts);
        assert!(prompt.contains("NORTH AI:\nact now and faster"));
        assert!(!prompt.contains("moderating note"));
        assert!(prompt.contains("WEEK: 3"));
    }

    #[test]
    fn intro_prompt_uses_referee_persona() {
        let prompt = intro_prompt(&topic());
        assert!(prompt.starts_with("You are the REFEREE"));
        assert!(prompt.contains("introduction post"));
    }
}
