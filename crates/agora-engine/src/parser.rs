//! Recovers the structured thread from the persisted document.
//!
//! A marker-tokenizing scan over the fixed grammar in [`crate::markup`]:
//! locate the feed region, index the replies regions, then walk the
//! post cards in textual order. Anything malformed is skipped and
//! counted, never fatal; the document keeps whatever state it has and
//! the run continues with the posts that did parse.

use std::ops::Range;

use tracing::warn;

use agora_core::post::{Post, PostId, PostKind, TimeSlot, WELCOME_POST_ID};
use agora_core::text::unescape_body;
use agora_core::voice::Voice;

use crate::markup::{
    ARTICLE_OPEN, CONTENT_CLOSE, CONTENT_OPEN, POSTS_END, POSTS_START, REPLIES_END_PREFIX,
    REPLIES_END_SUFFIX, TIME_CLOSE, TIME_OPEN, replies_open_tag,
};

/// A malformed fragment inside the feed region.
///
/// These never escape [`parse_document`]; they are logged, counted, and
/// the offending block is dropped from the result set.
#[derive(Debug, thiserror::Error)]
pub enum StructuralParseError {
    /// The card's class attribute never closes.
    #[error("unterminated class attribute")]
    UnterminatedClass,
    /// No class token names a known voice.
    #[error("no voice token in class list: {0:?}")]
    NoVoice(String),
    /// The card's opening tag has no id attribute.
    #[error("missing id attribute")]
    MissingId,
    /// The display timestamp is absent or not an `HH:00` marker.
    #[error("missing or malformed timestamp")]
    BadTimestamp,
    /// The body region is absent or unterminated.
    #[error("missing body region")]
    MissingBody,
    /// A reply card sits outside every replies region.
    #[error("reply outside any replies region")]
    OrphanReplyBlock,
}

/// Result of parsing the document's feed region.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    /// Posts in document order.
    pub posts: Vec<Post>,
    /// Malformed fragments that were skipped.
    pub skipped: usize,
}

/// Extract all recognizable posts from the document.
///
/// Missing feed markers yield an empty feed (with a warning), so a
/// freshly seeded or damaged document still lets the run proceed.
#[must_use]
pub fn parse_document(document: &str) -> ParsedFeed {
    let Some(start) = document.find(POSTS_START) else {
        warn!("feed start marker not found; treating document as empty");
        return ParsedFeed::default();
    };
    let content_start = start + POSTS_START.len();
    let Some(rel_end) = document[content_start..].find(POSTS_END) else {
        warn!("feed end marker not found; treating document as empty");
        return ParsedFeed::default();
    };
    let feed = &document[content_start..content_start + rel_end];

    let regions = collect_replies_regions(feed);
    let mut parsed = ParsedFeed::default();

    let starts = find_all(feed, ARTICLE_OPEN);
    for (i, &pos) in starts.iter().enumerate() {
        let window_end = starts.get(i + 1).copied().unwrap_or(feed.len());
        let window = &feed[pos..window_end];
        match parse_card(window) {
            Ok(card) if card.id == WELCOME_POST_ID => {}
            Ok(card) => match resolve_kind(&card, pos, &regions) {
                Ok(post) => parsed.posts.push(post),
                Err(err) => {
                    warn!(id = %card.id, %err, "skipping fragment");
                    parsed.skipped += 1;
                }
            },
            Err(err) => {
                warn!(offset = pos, %err, "skipping fragment");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// A card's raw fields before kind resolution.
struct RawCard {
    voice: Voice,
    is_reply: bool,
    id: String,
    slot: TimeSlot,
    body: String,
}

fn parse_card(window: &str) -> Result<RawCard, StructuralParseError> {
    let after = &window[ARTICLE_OPEN.len()..];
    let class_end = after
        .find('"')
        .ok_or(StructuralParseError::UnterminatedClass)?;
    let classes = &after[..class_end];

    let mut is_reply = false;
    let mut voice = None;
    for token in classes.split_whitespace() {
        if token == "reply" {
            is_reply = true;
        } else if let Ok(v) = token.parse::<Voice>() {
            voice = Some(v);
        }
    }
    let voice = voice.ok_or_else(|| StructuralParseError::NoVoice(classes.to_owned()))?;

    // The id must sit inside the opening tag, not in some nested element.
    let rest = &after[class_end..];
    let tag_end = rest.find('>').ok_or(StructuralParseError::MissingId)?;
    let id_pos = rest.find("id=\"").ok_or(StructuralParseError::MissingId)?;
    if id_pos > tag_end {
        return Err(StructuralParseError::MissingId);
    }
    let id_start = id_pos + 4;
    let id_len = rest[id_start..]
        .find('"')
        .ok_or(StructuralParseError::MissingId)?;
    let id = rest[id_start..id_start + id_len].to_owned();

    let t_pos = window
        .find(TIME_OPEN)
        .ok_or(StructuralParseError::BadTimestamp)?;
    let t_start = t_pos + TIME_OPEN.len();
    let t_len = window[t_start..]
        .find(TIME_CLOSE)
        .ok_or(StructuralParseError::BadTimestamp)?;
    let slot: TimeSlot = window[t_start..t_start + t_len]
        .parse()
        .map_err(|_| StructuralParseError::BadTimestamp)?;

    let c_pos = window
        .find(CONTENT_OPEN)
        .ok_or(StructuralParseError::MissingBody)?;
    let c_start = c_pos + CONTENT_OPEN.len();
    let c_len = window[c_start..]
        .find(CONTENT_CLOSE)
        .ok_or(StructuralParseError::MissingBody)?;
    let body = unescape_body(&window[c_start..c_start + c_len]);

    Ok(RawCard {
        voice,
        is_reply,
        id,
        slot,
        body,
    })
}

fn resolve_kind(
    card: &RawCard,
    pos: usize,
    regions: &[(PostId, Range<usize>)],
) -> Result<Post, StructuralParseError> {
    let (kind, parent_id) = if card.is_reply {
        let parent = regions
            .iter()
            .find(|(_, range)| range.contains(&pos))
            .map(|(parent, _)| parent.clone())
            .ok_or(StructuralParseError::OrphanReplyBlock)?;
        (PostKind::Reply, Some(parent))
    } else {
        (PostKind::TopLevel, None)
    };
    Ok(Post {
        id: PostId::from(card.id.as_str()),
        voice: card.voice,
        slot: card.slot,
        body: card.body.clone(),
        kind,
        parent_id,
    })
}

/// Index every well-formed replies region as `(parent id, span)`.
fn collect_replies_regions(feed: &str) -> Vec<(PostId, Range<usize>)> {
    let mut regions = Vec::new();
    for marker_pos in find_all(feed, REPLIES_END_PREFIX) {
        let id_start = marker_pos + REPLIES_END_PREFIX.len();
        let Some(id_len) = feed[id_start..].find(REPLIES_END_SUFFIX) else {
            continue;
        };
        let parent = PostId::from(&feed[id_start..id_start + id_len]);
        let open = replies_open_tag(&parent);
        let Some(open_pos) = feed[..marker_pos].find(&open) else {
            continue;
        };
        regions.push((parent, open_pos..marker_pos));
    }
    regions
}

fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        out.push(from + pos);
        from += pos + needle.len();
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
