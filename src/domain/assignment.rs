// ==========================================
// Shift Engine - Assignment Entity
// ==========================================
// Join of participant and shift. Creation and removal are the
// only mutations; occupancy is always recounted from live rows.
// ==========================================

use crate::domain::types::{ParticipantId, ShiftId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One participant seated on one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub participant_id: ParticipantId,
    pub shift_id: ShiftId,
    pub assigned_at: NaiveDateTime,
}
