// ==========================================
// Shift Engine - Domain Type Definitions
// ==========================================
// Identity newtypes, derived shift state, actor roles
// and domain event kinds.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Identity newtypes
// ==========================================
// Stored as opaque strings; the engine never parses them.

/// Participant identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shift identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(pub String);

impl ShiftId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Place identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// Shift state (derived)
// ==========================================
// Always computed from the live assignment count at read time.
// Never persisted as a separate source of truth.
// Serialization format: SCREAMING_SNAKE_CASE (matches the database)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftState {
    Free,            // no assignments
    PartiallyFilled, // some seats taken, room remains
    Full,            // at or above capacity (undefined capacity = single slot)
}

impl fmt::Display for ShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftState::Free => write!(f, "FREE"),
            ShiftState::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            ShiftState::Full => write!(f, "FULL"),
        }
    }
}

// ==========================================
// Sex category
// ==========================================
// Optimization-constraint tag only; never used as a policy field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SexCategory {
    Female,
    Male,
    Unspecified,
}

impl fmt::Display for SexCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SexCategory::Female => write!(f, "FEMALE"),
            SexCategory::Male => write!(f, "MALE"),
            SexCategory::Unspecified => write!(f, "UNSPECIFIED"),
        }
    }
}

// ==========================================
// Actor
// ==========================================
// Caller identity for authorization at the planner boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A participant acting on their own assignments.
    Participant(ParticipantId),
    /// An administrator; may release any assignment and empty shifts.
    Administrator,
}

impl Actor {
    /// Whether this actor may release the given participant's assignment.
    pub fn may_release(&self, participant_id: &ParticipantId) -> bool {
        match self {
            Actor::Administrator => true,
            Actor::Participant(id) => id == participant_id,
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Actor::Administrator)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Participant(id) => write!(f, "participant:{}", id),
            Actor::Administrator => write!(f, "administrator"),
        }
    }
}

// ==========================================
// Domain event kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Assigned,
    Released,
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Assigned => "ASSIGNED",
            EventKind::Released => "RELEASED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
