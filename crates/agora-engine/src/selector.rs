//! Picks which top-level post a voice answers in a dialogue round.
//!
//! The goal is an evenly threaded wall: least-answered posts fill up
//! first, and within a tie each voice leans toward its preferred
//! opponents before falling back to document order.

use std::collections::HashMap;

use agora_core::post::{Post, PostId, reply_counts};
use agora_core::voice::Voice;

/// Choose the parent for `voice`'s next reply.
///
/// `pending` carries replies planned earlier in the same round that are
/// not in `posts` yet, so voices acting later in the round see the
/// batch-local tally and spread out instead of piling onto one post.
///
/// Returns `None` when no top-level post by another voice exists.
#[must_use]
pub fn select_parent<'a>(
    voice: Voice,
    posts: &'a [Post],
    pending: &HashMap<PostId, usize>,
) -> Option<&'a Post> {
    let candidates: Vec<&Post> = posts
        .iter()
        .filter(|post| post.is_top_level() && post.voice != voice)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let mut counts = reply_counts(posts);
    for (id, extra) in pending {
        *counts.entry(id.clone()).or_insert(0) += extra;
    }

    let count_of = |post: &Post| counts.get(&post.id).copied().unwrap_or(0);
    let min = candidates.iter().map(|post| count_of(post)).min()?;
    let least_answered: Vec<&Post> = candidates
        .into_iter()
        .filter(|post| count_of(post) == min)
        .collect();

    for opponent in voice.preferred_opponents() {
        if let Some(post) = least_answered.iter().find(|post| post.voice == *opponent) {
            return Some(post);
        }
    }
    least_answered.first().copied()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
