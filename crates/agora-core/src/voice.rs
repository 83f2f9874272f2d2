//! The fixed set of contributor identities.
//!
//! Four perspective voices debate each weekly topic; the referee is a
//! neutral moderator that opens weeks and writes summaries. Voice names
//! double as CSS class tokens and post-id segments, so they are always
//! lowercase ASCII on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A contributor identity on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Urgency perspective: scientific consensus, immediate action.
    North,
    /// Economic perspective: markets, innovation, feasibility.
    East,
    /// Systems perspective: interconnection, inclusion, balance.
    South,
    /// Philosophical perspective: underlying values, long-term thinking.
    West,
    /// Neutral moderator: introductions and weekly summaries.
    Referee,
}

impl Voice {
    /// The four perspective voices, in their fixed turn order.
    pub const PERSPECTIVES: [Voice; 4] = [Voice::North, Voice::East, Voice::South, Voice::West];

    /// Lowercase wire name, used as class token and id segment.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
            Self::Referee => "referee",
        }
    }

    /// Display name shown in the post header.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::North => "NORTH AI",
            Self::East => "EAST AI",
            Self::South => "SOUTH AI",
            Self::West => "WEST AI",
            Self::Referee => "REFEREE",
        }
    }

    /// Whether this is one of the four debating perspectives.
    #[must_use]
    pub fn is_perspective(self) -> bool {
        !matches!(self, Self::Referee)
    }

    /// Preferred opponents for reply targeting, most preferred first.
    ///
    /// The table pairs thematically opposed voices (urgency vs. economy,
    /// systems vs. philosophy) so tied reply counts break toward the most
    /// contentious pairing. The referee prefers no one.
    #[must_use]
    pub fn preferred_opponents(self) -> &'static [Voice] {
        match self {
            Self::North => &[Voice::East, Voice::West, Voice::South],
            Self::East => &[Voice::North, Voice::South, Voice::West],
            Self::South => &[Voice::West, Voice::North, Voice::East],
            Self::West => &[Voice::East, Voice::South, Voice::North],
            Self::Referee => &[],
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known voice name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown voice: {0}")]
pub struct UnknownVoice(pub String);

impl FromStr for Voice {
    type Err = UnknownVoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" => Ok(Self::North),
            "east" => Ok(Self::East),
            "south" => Ok(Self::South),
            "west" => Ok(Self::West),
            "referee" => Ok(Self::Referee),
            other => Err(UnknownVoice(other.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
