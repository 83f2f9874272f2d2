//! Maps a point in time to the action the engine should take.
//!
//! The board runs on a fixed weekly cadence in a fixed timezone. The
//! resolver is a pure function of `(day_of_week, hour_of_day)` so the
//! schedule is testable without touching the system clock; callers
//! convert an injected UTC instant via [`resolve_at`] exactly once.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::post::TimeSlot;

/// The board's fixed timezone. Every schedule decision is made in this
/// zone, never in system-local time; the external scheduler's own clock
/// may differ.
pub const TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

/// Weekday dialogue slots (hours of day).
pub const DIALOGUE_HOURS: [u8; 4] = [8, 12, 18, 22];

/// The weekday slot in which voices open fresh threads.
pub const OPENING_HOUR: u8 = 8;

/// Hour of the Saturday summary and the Sunday reset.
pub const WEEKEND_HOUR: u8 = 9;

/// The slot stamped on summary and introduction posts.
pub const WEEKEND_SLOT: TimeSlot = match TimeSlot::new(WEEKEND_HOUR) {
    Some(slot) => slot,
    None => panic!("weekend hour out of range"),
};

/// What the engine should do for the current tick.
///
/// Exactly one action is active per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScheduleAction {
    /// Nothing scheduled; the banner is still refreshed.
    Idle,
    /// Refresh the banner for a new week without generating posts.
    /// Never produced by [`resolve`]; reserved for forced invocations.
    OpenWeek,
    /// A weekday dialogue round at the given slot.
    DialogueRound(TimeSlot),
    /// The referee's Saturday synthesis of the week's debate.
    WeeklySummary,
    /// Sunday reset: clear the feed and introduce the next topic.
    ResetForNextTopic,
}

/// Resolve the action for a `(day_of_week, hour_of_day)` pair.
///
/// `day_of_week` follows the 0 = Sunday .. 6 = Saturday convention.
/// Pure and total over `(0..=6, 0..=23)`; rules apply in priority order,
/// first match wins.
#[must_use]
pub fn resolve(day_of_week: u8, hour_of_day: u8) -> ScheduleAction {
    let slot = TimeSlot::new(hour_of_day);
    match (day_of_week, hour_of_day) {
        (1..=5, h) if DIALOGUE_HOURS.contains(&h) => {
            // Slot is a valid hour by construction of DIALOGUE_HOURS.
            slot.map_or(ScheduleAction::Idle, ScheduleAction::DialogueRound)
        }
        (6, WEEKEND_HOUR) => ScheduleAction::WeeklySummary,
        (0, WEEKEND_HOUR) => ScheduleAction::ResetForNextTopic,
        _ => ScheduleAction::Idle,
    }
}

/// Resolve the action for an instant, converting through [`TIMEZONE`].
#[must_use]
pub fn resolve_at(now: DateTime<Utc>) -> ScheduleAction {
    let local = now.with_timezone(&TIMEZONE);
    let day = local.weekday().num_days_from_sunday() as u8;
    let hour = local.hour() as u8;
    resolve(day, hour)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weekday_dialogue_slots() {
        for day in 1..=5 {
            for hour in DIALOGUE_HOURS {
                assert_eq!(
                    resolve(day, hour),
                    ScheduleAction::DialogueRound(TimeSlot::new(hour).unwrap()),
                    "day {day} hour {hour}"
                );
            }
        }
    }

    #[test]
    fn saturday_nine_is_summary() {
        assert_eq!(resolve(6, 9), ScheduleAction::WeeklySummary);
    }

    #[test]
    fn sunday_nine_is_reset() {
        assert_eq!(resolve(0, 9), ScheduleAction::ResetForNextTopic);
    }

    #[test]
    fn everything_else_is_idle() {
        for day in 0..=6u8 {
            for hour in 0..=23u8 {
                let expected_active = (1..=5).contains(&day) && DIALOGUE_HOURS.contains(&hour)
                    || (day == 6 || day == 0) && hour == WEEKEND_HOUR;
                let action = resolve(day, hour);
                if expected_active {
                    assert_ne!(action, ScheduleAction::Idle, "day {day} hour {hour}");
                } else {
                    assert_eq!(action, ScheduleAction::Idle, "day {day} hour {hour}");
                }
            }
        }
    }

    #[test]
    fn weekend_dialogue_hours_are_idle() {
        // Dialogue slots only fire Monday through Friday.
        for hour in DIALOGUE_HOURS {
            assert_eq!(resolve(0, hour), ScheduleAction::Idle);
            assert_eq!(resolve(6, hour), ScheduleAction::Idle);
        }
    }

    #[test]
    fn resolve_never_returns_open_week() {
        for day in 0..=6u8 {
            for hour in 0..=23u8 {
                assert_ne!(resolve(day, hour), ScheduleAction::OpenWeek);
            }
        }
    }

    #[test]
    fn resolve_at_converts_to_amsterdam() {
        // 2026-01-05 is a Monday. 07:00 UTC is 08:00 in Amsterdam (CET),
        // so the UTC hour alone would miss the opening slot.
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap();
        assert_eq!(
            resolve_at(now),
            ScheduleAction::DialogueRound(TimeSlot::new(8).unwrap())
        );
    }

    #[test]
    fn resolve_at_sunday_reset() {
        // 2026-01-04 is a Sunday; 08:00 UTC is 09:00 CET.
        let now = Utc.with_ymd_and_hms(2026, 1, 4, 8, 0, 0).unwrap();
        assert_eq!(resolve_at(now), ScheduleAction::ResetForNextTopic);
    }
}
