//! The document's structural grammar: markers and fragment rendering.
//!
//! The parser and mutator must agree on this byte-for-byte, so every
//! marker string and rendered shape lives here and nowhere else. The
//! feed region sits between [`POSTS_START`] and [`POSTS_END`]; each
//! top-level card owns a replies region closed by a per-post
//! `REPLIES_END` marker that doubles as the reply insertion point.

use agora_core::post::{Post, PostId};
use agora_core::text::escape_body;

/// Start of the feed region; new top-level posts are inserted right after it.
pub const POSTS_START: &str = "<!-- POSTS_START -->";

/// End of the feed region.
pub const POSTS_END: &str = "<!-- POSTS_END -->";

/// Opening of every post card's class attribute.
pub const ARTICLE_OPEN: &str = "<article class=\"message-card ";

/// Closing tag of a post card.
pub const ARTICLE_CLOSE: &str = "</article>";

/// Opening tag of the display timestamp.
pub const TIME_OPEN: &str = "<time class=\"message-time\">";

/// Closing tag of the display timestamp.
pub const TIME_CLOSE: &str = "</time>";

/// Opening tag of the body region.
pub const CONTENT_OPEN: &str = "<div class=\"message-content\">";

/// Closing tag of the body region.
pub const CONTENT_CLOSE: &str = "</div>";

/// Prefix of a replies-region end marker; the parent id follows.
pub const REPLIES_END_PREFIX: &str = "<!-- REPLIES_END:";

/// Suffix closing a replies-region end marker.
pub const REPLIES_END_SUFFIX: &str = " -->";

/// Derived id of a post's replies region.
#[must_use]
pub fn replies_region_id(parent: &PostId) -> String {
    format!("replies-{parent}")
}

/// Opening tag of a post's replies region.
#[must_use]
pub fn replies_open_tag(parent: &PostId) -> String {
    format!("<div class=\"message-replies\" id=\"{}\">", replies_region_id(parent))
}

/// End marker of a post's replies region; replies are inserted before it.
#[must_use]
pub fn replies_end_marker(parent: &PostId) -> String {
    format!("{REPLIES_END_PREFIX}{parent}{REPLIES_END_SUFFIX}")
}

/// Render a top-level post card, replies region included.
#[must_use]
pub fn render_top_level(post: &Post) -> String {
    format!(
        "\n<article class=\"message-card {voice}\" id=\"{id}\">\n    \
         <header class=\"message-header\">\n        \
         <span class=\"author-name\">{name}</span>\n        \
         {TIME_OPEN}{slot}{TIME_CLOSE}\n    \
         </header>\n    \
         {CONTENT_OPEN}{body}{CONTENT_CLOSE}\n    \
         {replies_open}\n    \
         {replies_end}\n    \
         </div>\n\
         {ARTICLE_CLOSE}",
        voice = post.voice,
        id = post.id,
        name = post.voice.display_name(),
        slot = post.slot,
        body = escape_body(&post.body),
        replies_open = replies_open_tag(&post.id),
        replies_end = replies_end_marker(&post.id),
    )
}

/// Render a reply card. No replies region: threads are one level deep.
#[must_use]
pub fn render_reply(post: &Post) -> String {
    format!(
        "\n<article class=\"message-card reply {voice}\" id=\"{id}\">\n    \
         <header class=\"message-header\">\n        \
         <span class=\"author-name\">{name}</span>\n        \
         {TIME_OPEN}{slot}{TIME_CLOSE}\n    \
         </header>\n    \
         {CONTENT_OPEN}{body}{CONTENT_CLOSE}\n\
         {ARTICLE_CLOSE}",
        voice = post.voice,
        id = post.id,
        name = post.voice.display_name(),
        slot = post.slot,
        body = escape_body(&post.body),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
