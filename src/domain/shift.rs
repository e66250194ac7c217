// ==========================================
// Shift Engine - Shift Entity & Time Window
// ==========================================
// A shift is a bookable time window at a place on a specific
// date. The time window is stored as a single "HH:MM-HH:MM"
// token; a window whose end is at or before its start runs
// past midnight.
// ==========================================

use crate::domain::types::{ParticipantId, PlaceId, ShiftId};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes in a day; circular window arithmetic works modulo this.
const DAY_MINUTES: i64 = 24 * 60;

/// Time-window token parse failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeTokenError {
    #[error("malformed time range token: {0} (expected HH:MM-HH:MM)")]
    Malformed(String),

    #[error("invalid time of day in token: {0}")]
    InvalidTime(String),
}

// ==========================================
// TimeRange - "HH:MM-HH:MM" window
// ==========================================

/// A clock-time window within one day, possibly wrapping past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the window runs past midnight (end at or before start).
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Window length in minutes; a wrapping window counts the portion
    /// after midnight, and an end equal to the start means a full day.
    pub fn duration_minutes(&self) -> i64 {
        let d = (minute_of_day(self.end) - minute_of_day(self.start)).rem_euclid(DAY_MINUTES);
        if d == 0 {
            DAY_MINUTES
        } else {
            d
        }
    }

    /// Whether this window lies fully inside `outer`.
    ///
    /// Both windows are treated as arcs on the 24h clock circle, so
    /// containment is well-defined even when either side wraps.
    pub fn contained_in(&self, outer: &TimeRange) -> bool {
        let offset =
            (minute_of_day(self.start) - minute_of_day(outer.start)).rem_euclid(DAY_MINUTES);
        offset + self.duration_minutes() <= outer.duration_minutes()
    }

    /// Whether this window and `other` share any instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        let from_self =
            (minute_of_day(other.start) - minute_of_day(self.start)).rem_euclid(DAY_MINUTES);
        let from_other =
            (minute_of_day(self.start) - minute_of_day(other.start)).rem_euclid(DAY_MINUTES);
        from_self < self.duration_minutes() || from_other < other.duration_minutes()
    }

    /// Morning test: the window must end by `cutoff` without wrapping.
    pub fn ends_by(&self, cutoff: NaiveTime) -> bool {
        !self.wraps() && self.end <= cutoff
    }

    /// Afternoon test: the window must start at or after `cutoff`.
    pub fn starts_from(&self, cutoff: NaiveTime) -> bool {
        self.start >= cutoff
    }
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeRange {
    type Err = TimeTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start_s, end_s) = s
            .split_once('-')
            .ok_or_else(|| TimeTokenError::Malformed(s.to_string()))?;
        let start = NaiveTime::parse_from_str(start_s.trim(), "%H:%M")
            .map_err(|_| TimeTokenError::InvalidTime(start_s.to_string()))?;
        let end = NaiveTime::parse_from_str(end_s.trim(), "%H:%M")
            .map_err(|_| TimeTokenError::InvalidTime(end_s.to_string()))?;
        Ok(TimeRange { start, end })
    }
}

impl TryFrom<String> for TimeRange {
    type Error = TimeTokenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeRange> for String {
    fn from(r: TimeRange) -> Self {
        r.to_string()
    }
}

// ==========================================
// Shift entity
// ==========================================

/// A bookable time window at a place, loaded together with its
/// current assignment set and the place capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub date: NaiveDate,
    pub time_range: TimeRange,
    pub place_id: PlaceId,
    /// Capacity joined from the place; None = unbounded.
    pub place_capacity: Option<u32>,
    /// Currently assigned participants, sorted by id.
    pub assigned: Vec<ParticipantId>,
}

impl Shift {
    pub fn assigned_count(&self) -> u32 {
        self.assigned.len() as u32
    }

    pub fn is_assigned(&self, participant_id: &ParticipantId) -> bool {
        self.assigned.iter().any(|id| id == participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> TimeRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let r = range("08:30-12:00");
        assert_eq!(r.start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(r.end, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(r.to_string(), "08:30-12:00");
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        assert!(matches!(
            "0830/1200".parse::<TimeRange>(),
            Err(TimeTokenError::Malformed(_))
        ));
        assert!(matches!(
            "08:30-25:00".parse::<TimeRange>(),
            Err(TimeTokenError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_wrapping_window_duration() {
        let r = range("22:00-02:00");
        assert!(r.wraps());
        assert_eq!(r.duration_minutes(), 240);
    }

    #[test]
    fn test_containment_plain_and_wrapping() {
        assert!(range("09:00-11:00").contained_in(&range("08:00-12:00")));
        assert!(!range("07:00-11:00").contained_in(&range("08:00-12:00")));
        // wrapping outer admits a window on either side of midnight
        assert!(range("23:00-01:00").contained_in(&range("20:00-06:00")));
        assert!(!range("19:00-21:00").contained_in(&range("20:00-06:00")));
    }

    #[test]
    fn test_overlap_plain_and_wrapping() {
        assert!(range("10:00-14:00").overlaps(&range("12:00-16:00")));
        assert!(!range("08:00-10:00").overlaps(&range("10:00-12:00")));
        assert!(range("22:00-02:00").overlaps(&range("01:00-03:00")));
    }

    #[test]
    fn test_morning_afternoon_tests() {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert!(range("08:00-12:00").ends_by(noon));
        assert!(!range("08:00-12:30").ends_by(noon));
        assert!(range("12:00-18:00").starts_from(noon));
        // a wrapping window never qualifies as a morning window
        assert!(!range("22:00-02:00").ends_by(noon));
    }
}
