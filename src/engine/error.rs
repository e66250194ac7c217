// ==========================================
// Shift Engine - Engine Error Types
// ==========================================
// One variant per constraint violation; every denial carries
// enough context to surface an actionable message.
// All variants are terminal for the call except
// StorageUnavailable, which the caller may retry as-is.
// ==========================================

use crate::domain::types::{ParticipantId, ShiftId};
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// Constraint-engine error type.
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== Lookup errors =====
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("shift not found: {0}")]
    ShiftNotFound(ShiftId),

    // ===== Numeric limit violations =====
    #[error("capacity exceeded: shift={shift_id}, assigned={assigned}, capacity={capacity}")]
    CapacityExceeded {
        shift_id: ShiftId,
        assigned: u32,
        capacity: u32,
    },

    #[error("insufficient capacity for mandatory pair: shift={shift_id}")]
    InsufficientCapacityForPair { shift_id: ShiftId },

    #[error("monthly quota exceeded: participant={participant_id}, quota={quota}")]
    QuotaExceeded {
        participant_id: ParticipantId,
        quota: u32,
    },

    // ===== Temporal/relational violations =====
    #[error("participant unavailable: participant={participant_id}, reason={reason}")]
    Unavailable {
        participant_id: ParticipantId,
        reason: String,
    },

    #[error("mandatory partner unavailable: partner={partner_id}, reason={reason}")]
    PartnerUnavailable {
        partner_id: ParticipantId,
        reason: String,
    },

    #[error("forbidden partner already on shift: participant={participant_id}, blocked_by={blocked_by}")]
    ForbiddenPairingPresent {
        participant_id: ParticipantId,
        blocked_by: ParticipantId,
    },

    #[error(
        "participant already holds a shift that day: participant={participant_id}, date={date}, other_shift={other_shift_id}"
    )]
    DuplicateDateConflict {
        participant_id: ParticipantId,
        date: NaiveDate,
        other_shift_id: ShiftId,
    },

    // ===== Authorization =====
    #[error("actor not authorized: {actor}")]
    NotAuthorized { actor: String },

    // ===== Storage (transient) =====
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl EngineError {
    /// Only storage failures are safe to retry with the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StorageUnavailable(_))
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        EngineError::StorageUnavailable(err.to_string())
    }
}

/// Engine-layer result alias.
pub type EngineResult<T> = Result<T, EngineError>;
