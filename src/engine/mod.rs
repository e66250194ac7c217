// ==========================================
// Shift Engine - Engine Layer
// ==========================================
// Business-rule engines. No SQL is assembled here; every
// denial carries an explicit reason.
// ==========================================

pub mod availability;
pub mod capacity;
pub mod error;
pub mod events;
pub mod pairing;
pub mod planner;
pub mod quota;
pub mod repositories;

// Re-export core engines
pub use availability::{Availability, AvailabilityMatcher, DenialReason};
pub use capacity::{CapacityLedger, Occupancy};
pub use error::{EngineError, EngineResult};
pub use events::{
    AssignmentEvent, AssignmentEventPublisher, NoOpEventPublisher, OptionalEventPublisher,
};
pub use pairing::{PairingPlan, PairingResolver};
pub use planner::{
    AssignmentOutcome, AssignmentPlanner, AutoFillReport, ReleaseOutcome, SkippedCandidate,
};
pub use quota::QuotaTracker;
pub use repositories::EngineRepositories;
