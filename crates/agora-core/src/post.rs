//! The thread data model: posts, ids, and time slots.
//!
//! Post ids are derived, not random: a top-level post by `north` in the
//! 08:00 slot is always `post-north-0800`, so a re-run of the same slot
//! produces a detectable duplicate rather than a silent second post.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::voice::Voice;

/// Sentinel id of the welcome/placeholder card; excluded from parse results.
pub const WELCOME_POST_ID: &str = "post-welcome";

/// Unique post identifier within the document.
///
/// Derived deterministically from `(voice, slot)`, with a `post-` prefix
/// for top-level posts and `reply-` for replies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Id for a top-level post: `post-{voice}-{HH}00`.
    #[must_use]
    pub fn top_level(voice: Voice, slot: TimeSlot) -> Self {
        Self(format!("post-{voice}-{:02}00", slot.hour()))
    }

    /// Id for a reply: `reply-{voice}-{HH}00`.
    #[must_use]
    pub fn reply(voice: Voice, slot: TimeSlot) -> Self {
        Self(format!("reply-{voice}-{:02}00", slot.hour()))
    }

    /// Wrap an id read back from the document.
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// The inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A whole-hour time slot, displayed as `HH:00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot(u8);

impl TimeSlot {
    /// Create a slot from an hour of day (0..=23).
    ///
    /// Returns `None` for out-of-range hours.
    #[must_use]
    pub const fn new(hour: u8) -> Option<Self> {
        if hour <= 23 { Some(Self(hour)) } else { None }
    }

    /// The hour of day.
    #[must_use]
    pub fn hour(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// Error returned when a string is not a valid `HH:00` slot marker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid time slot: {0}")]
pub struct InvalidTimeSlot(pub String);

impl FromStr for TimeSlot {
    type Err = InvalidTimeSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTimeSlot(s.to_owned());
        let (hh, mm) = s.split_once(':').ok_or_else(invalid)?;
        if mm != "00" || hh.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hh.parse().map_err(|_| invalid())?;
        Self::new(hour).ok_or_else(invalid)
    }
}

/// Whether a post opens a thread or replies to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    /// A thread-opening post in the main feed.
    TopLevel,
    /// A reply nested inside a top-level post's replies region.
    Reply,
}

/// One contribution to the discussion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique id within the document.
    pub id: PostId,
    /// Contributor identity.
    pub voice: Voice,
    /// Display hour marker, also part of the id.
    pub slot: TimeSlot,
    /// Plain-text body (unescaped).
    pub body: String,
    /// Top-level or reply.
    pub kind: PostKind,
    /// Parent post id; present only when `kind` is [`PostKind::Reply`].
    pub parent_id: Option<PostId>,
}

impl Post {
    /// Create a top-level post.
    #[must_use]
    pub fn top_level(voice: Voice, slot: TimeSlot, body: String) -> Self {
        Self {
            id: PostId::top_level(voice, slot),
            voice,
            slot,
            body,
            kind: PostKind::TopLevel,
            parent_id: None,
        }
    }

    /// Create a reply to an existing top-level post.
    #[must_use]
    pub fn reply(voice: Voice, slot: TimeSlot, body: String, parent_id: PostId) -> Self {
        Self {
            id: PostId::reply(voice, slot),
            voice,
            slot,
            body,
            kind: PostKind::Reply,
            parent_id: Some(parent_id),
        }
    }

    /// Whether this post is top-level.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.kind == PostKind::TopLevel
    }
}

/// Count replies per parent id across a set of posts.
///
/// The reply count is derived, never stored; recompute it from whatever
/// the document currently contains.
#[must_use]
pub fn reply_counts(posts: &[Post]) -> HashMap<PostId, usize> {
    let mut counts = HashMap::new();
    for post in posts {
        if let Some(parent) = &post.parent_id {
            *counts.entry(parent.clone()).or_insert(0) += 1;
        }
    }
    counts
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(hour: u8) -> TimeSlot {
        TimeSlot::new(hour).unwrap()
    }

    #[test]
    fn top_level_id_is_deterministic() {
        let id = PostId::top_level(Voice::North, slot(8));
        assert_eq!(id.as_str(), "post-north-0800");
        assert_eq!(id, PostId::top_level(Voice::North, slot(8)));
    }

    #[test]
    fn reply_id_uses_reply_prefix() {
        let id = PostId::reply(Voice::East, slot(12));
        assert_eq!(id.as_str(), "reply-east-1200");
    }

    #[test]
    fn time_slot_display_pads_hour() {
        assert_eq!(slot(8).to_string(), "08:00");
        assert_eq!(slot(22).to_string(), "22:00");
    }

    #[test]
    fn time_slot_parses_display_form() {
        assert_eq!("08:00".parse::<TimeSlot>().unwrap(), slot(8));
        assert_eq!("22:00".parse::<TimeSlot>().unwrap(), slot(22));
    }

    #[test]
    fn time_slot_rejects_malformed_markers() {
        for bad in ["8:00", "08:30", "0800", "24:00", "ab:00", ""] {
            assert!(bad.parse::<TimeSlot>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn time_slot_rejects_out_of_range_hour() {
        assert!(TimeSlot::new(24).is_none());
        assert!(TimeSlot::new(23).is_some());
    }

    #[test]
    fn reply_constructor_sets_parent() {
        let parent = PostId::top_level(Voice::North, slot(8));
        let post = Post::reply(Voice::East, slot(12), "body".into(), parent.clone());
        assert_eq!(post.kind, PostKind::Reply);
        assert_eq!(post.parent_id, Some(parent));
        assert!(!post.is_top_level());
    }

    #[test]
    fn reply_counts_groups_by_parent() {
        let a = Post::top_level(Voice::North, slot(8), "a".into());
        let b = Post::top_level(Voice::East, slot(8), "b".into());
        let r1 = Post::reply(Voice::South, slot(12), "r1".into(), a.id.clone());
        let r2 = Post::reply(Voice::West, slot(12), "r2".into(), a.id.clone());
        let r3 = Post::reply(Voice::North, slot(12), "r3".into(), b.id.clone());

        let counts = reply_counts(&[a.clone(), b.clone(), r1, r2, r3]);
        assert_eq!(counts.get(&a.id), Some(&2));
        assert_eq!(counts.get(&b.id), Some(&1));
    }

    #[test]
    fn reply_counts_empty_for_no_replies() {
        let a = Post::top_level(Voice::North, slot(8), "a".into());
        assert!(reply_counts(&[a]).is_empty());
    }
}
