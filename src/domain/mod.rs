// ==========================================
// Shift Engine - Domain Model Layer
// ==========================================
// Entities, value types and business-rule vocabulary.
// Contains no data access and no engine logic.
// ==========================================

pub mod assignment;
pub mod availability;
pub mod participant;
pub mod place;
pub mod shift;
pub mod types;

// Re-export core types
pub use assignment::Assignment;
pub use availability::{AvailabilityRule, Period, RuleKind, YearMonth, YearMonthParseError};
pub use participant::Participant;
pub use place::Place;
pub use shift::{Shift, TimeRange, TimeTokenError};
pub use types::{Actor, EventKind, ParticipantId, PlaceId, SexCategory, ShiftId, ShiftState};
