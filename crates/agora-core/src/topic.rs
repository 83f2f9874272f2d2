//! Week-indexed topic catalog.
//!
//! Topics are keyed by week number counted from a fixed epoch (the Sunday
//! week 1 began). Once the week number runs past the catalog the lookup
//! cycles, so a finite catalog serves the board indefinitely.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::schedule::TIMEZONE;

/// The Sunday on which week 1 began, in board-local time.
const WEEK_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2025, 12, 14) {
    Some(d) => d,
    None => panic!("invalid week epoch"),
};

/// One weekly debate topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Catalog week number this topic is keyed by.
    pub week: u32,
    /// Topic title shown in the banner.
    pub title: String,
    /// Topic category shown in the banner label.
    pub category: String,
}

/// The static, ordered list of week-keyed topics.
#[derive(Clone, Debug, Deserialize)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Build a catalog from an in-memory topic list.
    #[must_use]
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// Parse the catalog file format: `{"topics": [{"week", "title", "category"}]}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(ConfigurationError::InvalidCatalog)
    }

    /// Number of topics in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Resolve the topic for a week number.
    ///
    /// Exact week match first; otherwise cycle modulo the catalog length.
    /// An empty catalog is a configuration error, never a silent default.
    pub fn topic_for_week(&self, week_number: u32) -> Result<&Topic, ConfigurationError> {
        if self.topics.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }
        if let Some(topic) = self.topics.iter().find(|t| t.week == week_number) {
            return Ok(topic);
        }
        let cycled = ((week_number - 1) % self.topics.len() as u32) + 1;
        self.topics
            .iter()
            .find(|t| t.week == cycled)
            .ok_or(ConfigurationError::MissingWeek(cycled))
    }

    /// The topic for the week containing `now`.
    pub fn current(&self, now: DateTime<Utc>) -> Result<&Topic, ConfigurationError> {
        self.topic_for_week(week_number_at(now))
    }

    /// The topic for the week after the one containing `now`.
    pub fn next(&self, now: DateTime<Utc>) -> Result<&Topic, ConfigurationError> {
        self.topic_for_week(week_number_at(now) + 1)
    }
}

/// Week number for an instant: days since the epoch divided by seven,
/// one-based, floored to a minimum of 1 before the epoch.
#[must_use]
pub fn week_number_at(now: DateTime<Utc>) -> u32 {
    let local_date = now.with_timezone(&TIMEZONE).date_naive();
    let days = (local_date - WEEK_EPOCH).num_days();
    if days < 0 {
        return 1;
    }
    (days / 7) as u32 + 1
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
