// ==========================================
// Shift Engine - Participant Entity
// ==========================================
// Pairing constraints are stored as id references, resolved
// through a lookup; never as in-memory back-references
// (A pairs with B, B pairs with A is a valid configuration).
// ==========================================

use crate::domain::types::{ParticipantId, SexCategory};
use serde::{Deserialize, Serialize};

/// A volunteer eligible to be assigned to shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// Optimization-constraint tag only.
    pub sex: SexCategory,
    pub has_vehicle: bool,
    /// Mandatory partner: assignments are all-or-nothing with this
    /// participant. Symmetric in intent, stored one-directionally.
    pub must_pair_with: Option<ParticipantId>,
    /// Forbidden partner: never share a shift with this participant.
    pub must_not_pair_with: Option<ParticipantId>,
    /// Monthly assignment cap; None = unlimited.
    pub monthly_quota: Option<u32>,
}

impl Participant {
    /// Minimal participant with no constraints, for seeding and tests.
    pub fn unconstrained(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.into(),
            sex: SexCategory::Unspecified,
            has_vehicle: false,
            must_pair_with: None,
            must_not_pair_with: None,
            monthly_quota: None,
        }
    }
}
