// ==========================================
// Shift Engine - Availability Rules
// ==========================================
// Per-month declarations of when a participant may be
// assigned. The rule payload is a closed tagged-variant
// type, exhaustively matched; no runtime shape-guessing.
// ==========================================

use crate::domain::shift::TimeRange;
use crate::domain::types::ParticipantId;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// YearMonth - "YYYY-MM" calendar month
// ==========================================

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed month token: {0} (expected YYYY-MM)")]
pub struct YearMonthParseError(String);

/// A calendar month, the scope of availability rules and quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // month is validated at construction via FromStr / from_date
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch"))
    }

    /// First day of the following month (exclusive upper bound).
    pub fn next_month_first_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch"))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| YearMonthParseError(s.to_string()))?;
        let year: i32 = y.parse().map_err(|_| YearMonthParseError(s.to_string()))?;
        let month: u32 = m.parse().map_err(|_| YearMonthParseError(s.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(YearMonthParseError(s.to_string()));
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = YearMonthParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<YearMonth> for String {
    fn from(m: YearMonth) -> Self {
        m.to_string()
    }
}

// ==========================================
// Period - half-day or custom window
// ==========================================

/// The period qualifier carried by availability rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "period")]
pub enum Period {
    Morning,
    Afternoon,
    Custom { window: TimeRange },
}

impl Period {
    /// Whether a shift window satisfies this period for a positive rule.
    ///
    /// Rules:
    /// - Morning: shift ends at or before the midday cutoff
    /// - Afternoon: shift starts at or after the midday cutoff
    /// - Custom: shift window fully contained in the custom window
    pub fn admits(&self, shift_window: &TimeRange, midday: NaiveTime) -> bool {
        match self {
            Period::Morning => shift_window.ends_by(midday),
            Period::Afternoon => shift_window.starts_from(midday),
            Period::Custom { window } => shift_window.contained_in(window),
        }
    }

    /// Whether this period touches the shift window at all.
    ///
    /// Used by Unavailable rules: any overlap forbids the assignment.
    pub fn overlaps(&self, shift_window: &TimeRange, midday: NaiveTime) -> bool {
        match self {
            Period::Morning => shift_window.start < midday || shift_window.wraps(),
            Period::Afternoon => shift_window.end > midday || shift_window.wraps(),
            Period::Custom { window } => shift_window.overlaps(window),
        }
    }
}

// ==========================================
// RuleKind - closed tagged-variant payload
// ==========================================

/// Availability rule payload, one variant per rule kind.
///
/// Stored in the database as a tagged JSON payload; the tag is the
/// `kind` field. Evaluation semantics live in the engine layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    /// Available every afternoon of the month, optionally narrowed
    /// to a custom sub-window that must contain the shift window.
    AllAfternoons { window: Option<TimeRange> },
    /// Available every morning of the month, same sub-window option.
    AllMornings { window: Option<TimeRange> },
    /// Available on the listed weekdays for the given period.
    WeekdaySet { days: Vec<Weekday>, period: Period },
    /// Available on one specific date for the given period.
    SpecificDate { date: NaiveDate, period: Period },
    /// Unavailable on one specific date/period; overrides all
    /// positive rules for that date.
    Unavailable { date: NaiveDate, period: Period },
}

impl RuleKind {
    /// Whether this is the blocking variant.
    pub fn is_negative(&self) -> bool {
        matches!(self, RuleKind::Unavailable { .. })
    }

    /// Stable tag for logs and denial reasons.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::AllAfternoons { .. } => "ALL_AFTERNOONS",
            RuleKind::AllMornings { .. } => "ALL_MORNINGS",
            RuleKind::WeekdaySet { .. } => "WEEKDAY_SET",
            RuleKind::SpecificDate { .. } => "SPECIFIC_DATE",
            RuleKind::Unavailable { .. } => "UNAVAILABLE",
        }
    }

    /// Structural validation applied before a rule is stored.
    ///
    /// # Rules
    /// - WeekdaySet must name at least one day
    /// - a Custom period window must have nonzero length (guaranteed by
    ///   TimeRange semantics) and distinct endpoints unless a full-day
    ///   wrap is intended; here we only reject the empty day set
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RuleKind::WeekdaySet { days, .. } if days.is_empty() => {
                Err("weekday set names no days".to_string())
            }
            _ => Ok(()),
        }
    }
}

// ==========================================
// AvailabilityRule entity
// ==========================================

/// One availability declaration for one participant and one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub participant_id: ParticipantId,
    pub month: YearMonth,
    pub kind: RuleKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parse_and_bounds() {
        let m: YearMonth = "2026-02".parse().unwrap();
        assert_eq!(m, YearMonth::new(2026, 2));
        assert_eq!(m.to_string(), "2026-02");
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(
            m.next_month_first_day(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("202602".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_december_rollover() {
        let m: YearMonth = "2025-12".parse().unwrap();
        assert_eq!(
            m.next_month_first_day(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_rule_payload_json_roundtrip() {
        let rule = RuleKind::WeekdaySet {
            days: vec![Weekday::Mon, Weekday::Thu],
            period: Period::Afternoon,
        };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("WEEKDAY_SET"));
        let back: RuleKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_validate_rejects_empty_weekday_set() {
        let rule = RuleKind::WeekdaySet {
            days: vec![],
            period: Period::Morning,
        };
        assert!(rule.validate().is_err());
    }
}
