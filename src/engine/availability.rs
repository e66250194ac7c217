// ==========================================
// Shift Engine - Availability Matcher
// ==========================================
// Decides whether a participant's declared rules cover a
// shift's date and time window. Deny-by-default: with no
// matching positive rule the participant is unavailable.
// Every denial carries a reason.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::availability::RuleKind;
use crate::domain::participant::Participant;
use crate::domain::shift::Shift;
use crate::domain::types::ParticipantId;
use crate::domain::YearMonth;
use crate::engine::quota::QuotaTracker;
use crate::repository::availability_repo::AvailabilityRuleRepository;
use crate::repository::error::RepositoryResult;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// Verdict types
// ==========================================

/// Why a participant cannot take a shift.
///
/// Structured so the planner can map denials onto distinct error
/// kinds instead of parsing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// An Unavailable rule for the shift date overlaps the window.
    ExcludedByRule { date: NaiveDate },
    /// No positive rule matched (including zero rules for the month).
    NoMatchingRule,
    /// Monthly quota already met.
    QuotaReached { quota: u32 },
    /// The forbidden partner is already on the shift.
    ForbiddenPairing { blocked_by: ParticipantId },
    /// Already holding another shift that day.
    SameDayConflict { date: NaiveDate },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::ExcludedByRule { date } => {
                write!(f, "declared unavailable on {}", date)
            }
            DenialReason::NoMatchingRule => write!(f, "no availability rule covers this shift"),
            DenialReason::QuotaReached { quota } => {
                write!(f, "monthly quota of {} already reached", quota)
            }
            DenialReason::ForbiddenPairing { blocked_by } => {
                write!(f, "forbidden partner {} already on shift", blocked_by)
            }
            DenialReason::SameDayConflict { date } => {
                write!(f, "already assigned to another shift on {}", date)
            }
        }
    }
}

/// Availability verdict for one participant and one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(DenialReason),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

// ==========================================
// AvailabilityMatcher
// ==========================================
pub struct AvailabilityMatcher {
    rules: Arc<AvailabilityRuleRepository>,
    quota: QuotaTracker,
    config: EngineConfig,
}

impl AvailabilityMatcher {
    pub fn new(
        rules: Arc<AvailabilityRuleRepository>,
        quota: QuotaTracker,
        config: EngineConfig,
    ) -> Self {
        Self {
            rules,
            quota,
            config,
        }
    }

    /// Full availability verdict for the participant on the shift.
    ///
    /// Evaluation order:
    /// 1. forbidden-pairing gate (partner already on the shift)
    /// 2. monthly quota gate
    /// 3. Unavailable rules for the shift date (override all positives)
    /// 4. positive rules; at least one must match
    pub fn is_available(
        &self,
        participant: &Participant,
        shift: &Shift,
    ) -> RepositoryResult<Availability> {
        if let Some(blocked_by) = &participant.must_not_pair_with {
            if shift.is_assigned(blocked_by) {
                return Ok(self.deny(
                    participant,
                    shift,
                    DenialReason::ForbiddenPairing {
                        blocked_by: blocked_by.clone(),
                    },
                ));
            }
        }

        let month = YearMonth::from_date(shift.date);
        if self.quota.is_exhausted(participant, month)? {
            // quota is Some here, is_exhausted is false otherwise
            let quota = participant.monthly_quota.unwrap_or(0);
            return Ok(self.deny(participant, shift, DenialReason::QuotaReached { quota }));
        }

        let rules = self
            .rules
            .find_by_participant_and_month(&participant.id, month)?;

        let midday = self.config.midday_cutoff;

        // Negative rules short-circuit: an overlap on the shift date
        // forbids the assignment no matter what positives say.
        for rule in &rules {
            if let RuleKind::Unavailable { date, period } = &rule.kind {
                if *date == shift.date && period.overlaps(&shift.time_range, midday) {
                    return Ok(self.deny(
                        participant,
                        shift,
                        DenialReason::ExcludedByRule { date: *date },
                    ));
                }
            }
        }

        let matched = rules
            .iter()
            .any(|rule| Self::positive_rule_matches(&rule.kind, shift, midday));

        if matched {
            Ok(Availability::Available)
        } else {
            Ok(self.deny(participant, shift, DenialReason::NoMatchingRule))
        }
    }

    /// Positive-rule matching; Unavailable never matches here.
    fn positive_rule_matches(
        kind: &RuleKind,
        shift: &Shift,
        midday: chrono::NaiveTime,
    ) -> bool {
        let window = &shift.time_range;
        match kind {
            RuleKind::AllAfternoons { window: sub } => {
                window.starts_from(midday)
                    && sub.map_or(true, |w| window.contained_in(&w))
            }
            RuleKind::AllMornings { window: sub } => {
                window.ends_by(midday) && sub.map_or(true, |w| window.contained_in(&w))
            }
            RuleKind::WeekdaySet { days, period } => {
                days.contains(&shift.date.weekday()) && period.admits(window, midday)
            }
            RuleKind::SpecificDate { date, period } => {
                *date == shift.date && period.admits(window, midday)
            }
            RuleKind::Unavailable { .. } => false,
        }
    }

    fn deny(&self, participant: &Participant, shift: &Shift, reason: DenialReason) -> Availability {
        debug!(
            participant_id = %participant.id,
            shift_id = %shift.id,
            reason = %reason,
            "availability denied"
        );
        Availability::Unavailable(reason)
    }
}
