// ==========================================
// Shift Engine - Quota Tracker
// ==========================================
// Monthly assignment counts, always recomputed from the
// store per call. No process-wide caches: stale counters
// across concurrent callers are exactly the bug this
// design rules out.
// ==========================================

use crate::domain::availability::YearMonth;
use crate::domain::participant::Participant;
use crate::domain::types::ParticipantId;
use crate::repository::error::RepositoryResult;
use crate::repository::shift_repo::ShiftRepository;
use std::sync::Arc;

// ==========================================
// QuotaTracker
// ==========================================
#[derive(Clone)]
pub struct QuotaTracker {
    shift_repo: Arc<ShiftRepository>,
}

impl QuotaTracker {
    pub fn new(shift_repo: Arc<ShiftRepository>) -> Self {
        Self { shift_repo }
    }

    /// Count of the participant's assignments whose shift date falls
    /// in the month.
    pub fn used(&self, participant_id: &ParticipantId, month: YearMonth) -> RepositoryResult<u32> {
        self.shift_repo
            .count_assignments_in_month(participant_id, month)
    }

    /// Seats left under the participant's monthly cap.
    ///
    /// # Returns
    /// - Ok(None): no quota set, unlimited
    /// - Ok(Some(n)): n more assignments allowed this month (saturating)
    pub fn remaining(
        &self,
        participant: &Participant,
        month: YearMonth,
    ) -> RepositoryResult<Option<u32>> {
        match participant.monthly_quota {
            None => Ok(None),
            Some(quota) => {
                let used = self.used(&participant.id, month)?;
                Ok(Some(quota.saturating_sub(used)))
            }
        }
    }

    /// Quota gate: true when a quota exists and is already met.
    pub fn is_exhausted(
        &self,
        participant: &Participant,
        month: YearMonth,
    ) -> RepositoryResult<bool> {
        match participant.monthly_quota {
            None => Ok(false),
            Some(quota) => Ok(self.used(&participant.id, month)? >= quota),
        }
    }
}
