//! Splices rendered posts and banner text into the document.
//!
//! Every mutation is a marker-addressed string splice: top-level cards
//! go right after the feed start marker (newest on top), replies go in
//! front of their parent's `REPLIES_END` marker. All failure modes
//! degrade, none abort; the run persists whatever document state the
//! mutator could produce.

use tracing::warn;

use agora_core::post::{Post, PostKind};
use agora_core::text::escape_body;
use agora_core::topic::Topic;

use crate::markup::{POSTS_END, POSTS_START, render_reply, render_top_level, replies_end_marker};

/// What a batch of insertions did to the document.
#[derive(Debug)]
pub struct MutationOutcome {
    /// The mutated document.
    pub document: String,
    /// Posts written into the document.
    pub inserted: usize,
    /// Replies whose parent was missing, written as top-level instead.
    pub degraded_replies: usize,
}

/// Insert a batch of posts into the document, in batch order.
///
/// A reply whose parent's replies region cannot be found is not
/// dropped: its kind flips to top-level and it lands in the main feed,
/// with a warning and a counter bump.
#[must_use]
pub fn apply(document: &str, posts: &[Post]) -> MutationOutcome {
    let mut outcome = MutationOutcome {
        document: document.to_owned(),
        inserted: 0,
        degraded_replies: 0,
    };
    if posts.is_empty() {
        return outcome;
    }

    let Some(start) = outcome.document.find(POSTS_START) else {
        warn!("feed start marker not found; dropping {} posts", posts.len());
        return outcome;
    };
    // Insertion point for top-level cards; advances so a batch keeps
    // its own order while still sitting above older posts.
    let mut cursor = start + POSTS_START.len();

    for post in posts {
        match post.kind {
            PostKind::TopLevel => {
                let rendered = render_top_level(post);
                outcome.document.insert_str(cursor, &rendered);
                cursor += rendered.len();
            }
            PostKind::Reply => {
                let marker = post
                    .parent_id
                    .as_ref()
                    .map(|parent| replies_end_marker(parent));
                let marker_pos =
                    marker.as_ref().and_then(|m| outcome.document.find(m.as_str()));
                match marker_pos {
                    Some(pos) => {
                        let rendered = format!("{}\n    ", render_reply(post));
                        outcome.document.insert_str(pos, &rendered);
                        if pos < cursor {
                            cursor += rendered.len();
                        }
                    }
                    None => {
                        warn!(
                            id = %post.id,
                            parent = ?post.parent_id,
                            "reply parent not found, inserting as top-level"
                        );
                        let degraded = Post {
                            kind: PostKind::TopLevel,
                            parent_id: None,
                            ..post.clone()
                        };
                        let rendered = render_top_level(&degraded);
                        outcome.document.insert_str(cursor, &rendered);
                        cursor += rendered.len();
                        outcome.degraded_replies += 1;
                    }
                }
            }
        }
        outcome.inserted += 1;
    }
    outcome
}

/// Remove everything strictly between the feed markers.
///
/// The region is normalized to a single newline, so clearing an
/// already-clear document changes nothing.
#[must_use]
pub fn clear_section(document: &str) -> String {
    let Some(start) = document.find(POSTS_START) else {
        warn!("feed start marker not found; nothing to clear");
        return document.to_owned();
    };
    let content_start = start + POSTS_START.len();
    let Some(rel_end) = document[content_start..].find(POSTS_END) else {
        warn!("feed end marker not found; nothing to clear");
        return document.to_owned();
    };
    let mut cleared = String::with_capacity(document.len());
    cleared.push_str(&document[..content_start]);
    cleared.push('\n');
    cleared.push_str(&document[content_start + rel_end..]);
    cleared
}

/// Rewrite the topic banner for `topic`.
///
/// The three regions are replaced independently; a region the document
/// does not carry is left untouched, never invented.
#[must_use]
pub fn update_banner(document: &str, topic: &Topic) -> String {
    let mut updated = document.to_owned();
    let label = escape_body(&format!("Week {} \u{2022} {}", topic.week, topic.category));
    replace_region(&mut updated, "<div class=\"topic-label\">", "</div>", &label);
    replace_region(
        &mut updated,
        "<h1 class=\"topic-title\">",
        "</h1>",
        &escape_body(&topic.title),
    );
    replace_region(
        &mut updated,
        "<div class=\"topic-week\">",
        "</div>",
        "Ongoing debate",
    );
    updated
}

/// Replace the text between the first `open` tag and the next `close`.
fn replace_region(document: &mut String, open: &str, close: &str, content: &str) {
    let Some(open_pos) = document.find(open) else {
        warn!(region = open, "banner region not found, leaving as is");
        return;
    };
    let inner_start = open_pos + open.len();
    let Some(rel_close) = document[inner_start..].find(close) else {
        warn!(region = open, "banner region unterminated, leaving as is");
        return;
    };
    document.replace_range(inner_start..inner_start + rel_close, content);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::post::{PostId, TimeSlot};
    use agora_core::voice::Voice;

    use crate::parser::parse_document;

    fn slot(hour: u8) -> TimeSlot {
        TimeSlot::new(hour).unwrap()
    }

    fn seed() -> String {
        format!(
            "<html><main>\n\
             <div class=\"topic-banner\">\n\
             <div class=\"topic-label\">Week 1 \u{2022} Energy</div>\n\
             <h1 class=\"topic-title\">Old title</h1>\n\
             <div class=\"topic-week\">Ongoing debate</div>\n\
             </div>\n\
             <section class=\"wall\">{POSTS_START}\n{POSTS_END}</section>\n\
             </main></html>"
        )
    }

    #[test]
    fn inserts_top_level_posts_newest_first() {
        let older = Post::top_level(Voice::North, slot(8), "older".into());
        let first = apply(&seed(), &[older.clone()]);
        assert_eq!(first.inserted, 1);

        let newer = Post::top_level(Voice::East, slot(12), "newer".into());
        let second = apply(&first.document, &[newer.clone()]);

        let parsed = parse_document(&second.document);
        assert_eq!(parsed.posts, vec![newer, older]);
    }

    #[test]
    fn batch_keeps_its_own_order_above_older_posts() {
        let older = Post::top_level(Voice::West, slot(8), "older".into());
        let base = apply(&seed(), &[older.clone()]).document;

        let a = Post::top_level(Voice::North, slot(12), "a".into());
        let b = Post::top_level(Voice::East, slot(12), "b".into());
        let out = apply(&base, &[a.clone(), b.clone()]);

        let parsed = parse_document(&out.document);
        assert_eq!(parsed.posts, vec![a, b, older]);
    }

    #[test]
    fn replies_land_inside_the_parent_region_in_order() {
        let parent = Post::top_level(Voice::North, slot(8), "opening".into());
        let base = apply(&seed(), &[parent.clone()]).document;

        let r1 = Post::reply(Voice::East, slot(12), "first".into(), parent.id.clone());
        let r2 = Post::reply(Voice::South, slot(12), "second".into(), parent.id.clone());
        let out = apply(&base, &[r1.clone(), r2.clone()]);

        assert_eq!(out.degraded_replies, 0);
        let parsed = parse_document(&out.document);
        assert_eq!(parsed.posts, vec![parent, r1, r2]);
    }

    #[test]
    fn orphan_reply_degrades_to_top_level() {
        let stray = Post::reply(
            Voice::East,
            slot(12),
            "stray".into(),
            PostId::from("post-gone-0800"),
        );
        let out = apply(&seed(), &[stray.clone()]);

        assert_eq!(out.inserted, 1);
        assert_eq!(out.degraded_replies, 1);

        let parsed = parse_document(&out.document);
        assert_eq!(parsed.posts.len(), 1);
        assert!(parsed.posts[0].is_top_level());
        assert_eq!(parsed.posts[0].id, stray.id);
        assert_eq!(parsed.posts[0].body, "stray");
    }

    #[test]
    fn missing_feed_marker_drops_posts_without_panicking() {
        let post = Post::top_level(Voice::North, slot(8), "x".into());
        let out = apply("<html>no markers</html>", &[post]);
        assert_eq!(out.inserted, 0);
        assert_eq!(out.document, "<html>no markers</html>");
    }

    #[test]
    fn clear_section_is_idempotent() {
        let post = Post::top_level(Voice::North, slot(8), "x".into());
        let filled = apply(&seed(), &[post]).document;

        let cleared = clear_section(&filled);
        assert!(parse_document(&cleared).posts.is_empty());
        assert_eq!(clear_section(&cleared), cleared);
        assert_eq!(cleared, seed());
    }

    #[test]
    fn update_banner_rewrites_all_three_regions() {
        let topic = Topic {
            week: 7,
            title: "AI & society".into(),
            category: "Technology".into(),
        };
        let updated = update_banner(&seed(), &topic);
        assert!(updated.contains("<div class=\"topic-label\">Week 7 \u{2022} Technology</div>"));
        assert!(updated.contains("<h1 class=\"topic-title\">AI &amp; society</h1>"));
        assert!(!updated.contains("Old title"));
    }

    #[test]
    fn update_banner_skips_missing_regions() {
        let doc = format!(
            "<h1 class=\"topic-title\">Old</h1>{POSTS_START}\n{POSTS_END}"
        );
        let topic = Topic {
            week: 2,
            title: "New".into(),
            category: "Misc".into(),
        };
        let updated = update_banner(&doc, &topic);
        assert!(updated.contains("<h1 class=\"topic-title\">New</h1>"));
        assert!(!updated.contains("topic-label"));
    }
}
