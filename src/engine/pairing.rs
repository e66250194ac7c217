// ==========================================
// Shift Engine - Pairing Resolver
// ==========================================
// Mandatory-pairing constraints at assignment time, and the
// all-or-nothing removal rule. Pairing references are id
// lookups, never in-memory back-references (A↔B mutual
// pairing is a valid configuration).
// ==========================================

use crate::domain::participant::Participant;
use crate::domain::shift::Shift;
use crate::domain::types::ParticipantId;
use crate::engine::availability::{Availability, AvailabilityMatcher, DenialReason};
use crate::engine::capacity::CapacityLedger;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::participant_repo::ParticipantRepository;
use crate::repository::shift_repo::ShiftRepository;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// PairingPlan
// ==========================================

/// Outcome of pairing resolution: who gets committed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingPlan {
    /// Only the requesting participant is assigned.
    Single(ParticipantId),
    /// Primary and mandatory partner are assigned as one atomic unit.
    Pair {
        primary: ParticipantId,
        partner: ParticipantId,
    },
}

impl PairingPlan {
    /// Participants the plan will seat.
    pub fn members(&self) -> Vec<ParticipantId> {
        match self {
            PairingPlan::Single(id) => vec![id.clone()],
            PairingPlan::Pair { primary, partner } => vec![primary.clone(), partner.clone()],
        }
    }
}

// ==========================================
// PairingResolver
// ==========================================
pub struct PairingResolver {
    participants: Arc<ParticipantRepository>,
    shifts: Arc<ShiftRepository>,
}

impl PairingResolver {
    pub fn new(participants: Arc<ParticipantRepository>, shifts: Arc<ShiftRepository>) -> Self {
        Self {
            participants,
            shifts,
        }
    }

    /// Resolve the pairing constraint for an assignment request.
    ///
    /// Always starts from the requesting participant; resolving the
    /// partner's mirror constraint would double-trigger, so it never
    /// happens here.
    ///
    /// # Rules
    /// - no mandatory partner → Single
    /// - partner already on the shift → Single
    /// - no room for two → InsufficientCapacityForPair (all-or-nothing)
    /// - partner unavailable or already booked that day → PartnerUnavailable
    pub fn resolve(
        &self,
        primary: &Participant,
        shift: &Shift,
        matcher: &AvailabilityMatcher,
    ) -> EngineResult<PairingPlan> {
        let Some(partner_id) = &primary.must_pair_with else {
            return Ok(PairingPlan::Single(primary.id.clone()));
        };

        if shift.is_assigned(partner_id) {
            debug!(
                primary = %primary.id,
                partner = %partner_id,
                shift_id = %shift.id,
                "mandatory partner already seated, single assignment"
            );
            return Ok(PairingPlan::Single(primary.id.clone()));
        }

        if !CapacityLedger::has_room_for(shift, 2) {
            return Err(EngineError::InsufficientCapacityForPair {
                shift_id: shift.id.clone(),
            });
        }

        let partner = self
            .participants
            .find_by_id(partner_id)?
            .ok_or_else(|| EngineError::ParticipantNotFound(partner_id.clone()))?;

        // The partner joining must not break the no-same-day invariant
        // either; an existing booking that day rejects the pair.
        let other_shifts = self
            .shifts
            .find_by_participant_and_date(partner_id, shift.date)?;
        if other_shifts.iter().any(|id| id != &shift.id) {
            return Err(EngineError::PartnerUnavailable {
                partner_id: partner_id.clone(),
                reason: DenialReason::SameDayConflict { date: shift.date }.to_string(),
            });
        }

        match matcher.is_available(&partner, shift)? {
            Availability::Available => Ok(PairingPlan::Pair {
                primary: primary.id.clone(),
                partner: partner.id.clone(),
            }),
            Availability::Unavailable(reason) => Err(EngineError::PartnerUnavailable {
                partner_id: partner_id.clone(),
                reason: reason.to_string(),
            }),
        }
    }

    /// Who leaves together when `removed` is released from the shift.
    ///
    /// Never leaves an orphaned mandatory partner: the rule fires both
    /// when the removed participant points at a seated partner and when
    /// a seated participant points at the removed one.
    pub fn removal_set(
        &self,
        removed: &Participant,
        shift: &Shift,
    ) -> EngineResult<Vec<ParticipantId>> {
        let mut set = vec![removed.id.clone()];

        if let Some(partner_id) = &removed.must_pair_with {
            if shift.is_assigned(partner_id) && !set.contains(partner_id) {
                set.push(partner_id.clone());
            }
        }

        for assigned_id in &shift.assigned {
            if set.contains(assigned_id) {
                continue;
            }
            let assigned = self
                .participants
                .find_by_id(assigned_id)?
                .ok_or_else(|| EngineError::ParticipantNotFound(assigned_id.clone()))?;
            if assigned.must_pair_with.as_ref() == Some(&removed.id) {
                set.push(assigned_id.clone());
            }
        }

        set.sort();
        Ok(set)
    }
}
