//! Body text transforms shared by the parser, mutator, and synthesizer.
//!
//! Escaping must round-trip exactly: whatever the mutator writes into a
//! `message-content` region, the parser must recover byte for byte. The
//! replacement order is load-bearing on both sides (`&` first on write,
//! last on read).

use crate::voice::Voice;

/// Escape a plain-text body for embedding in a content region.
///
/// `&` is escaped first so entity prefixes in later replacements are
/// never double-processed. Newlines become `<br>` line breaks.
#[must_use]
pub fn escape_body(body: &str) -> String {
    body.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br>")
}

/// Reverse [`escape_body`] exactly.
///
/// `&amp;` is unescaped last, mirroring the write order.
#[must_use]
pub fn unescape_body(content: &str) -> String {
    content
        .replace("<br>", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Suffix appended when a quoted body is cut short.
pub const TRUNCATION_SUFFIX: &str = "...";

/// Truncate a string to at most `max_bytes` bytes at a char boundary.
#[must_use]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    // Walk backward to find a char boundary.
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate `s` and append a suffix (e.g. `"..."`) if it exceeds `max_bytes`.
#[must_use]
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let body_budget = max_bytes.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_str(s, body_budget))
}

/// How far into the body a self-identification clause may reach before
/// we stop treating it as boilerplate.
const INTRO_SCAN_BYTES: usize = 60;

/// Strip a leading voice-introduction clause from generated text.
///
/// Models habitually open with `As NORTH AI, ...` or `NORTH AI here: ...`
/// even when told not to. If the text up to the first clause separator
/// mentions the voice's display name, the clause is dropped.
/// Returns the body unchanged when stripping would leave it empty.
#[must_use]
pub fn strip_voice_intro(body: &str, voice: Voice) -> String {
    let trimmed = body.trim_start();
    let scan = truncate_str(trimmed, INTRO_SCAN_BYTES);
    let Some(sep) = scan.find([',', ':', '!', '.']) else {
        return body.to_owned();
    };
    let clause = scan[..sep].to_lowercase();
    if !clause.contains(&voice.display_name().to_lowercase()) {
        return body.to_owned();
    }
    let rest = trimmed[sep + 1..].trim_start();
    if rest.is_empty() {
        body.to_owned()
    } else {
        rest.to_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
