// ==========================================
// Shift Engine - Core Library
// ==========================================
// Volunteer shift availability & assignment constraint
// engine: capacity bounds, pairing constraints, monthly
// quotas, and time-window matching against per-month
// availability rules. Storage: SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Data repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / shared PRAGMA)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-export core types
// ==========================================

// Domain types
pub use domain::{
    Actor, AvailabilityRule, EventKind, Participant, ParticipantId, Period, Place, PlaceId,
    RuleKind, Shift, ShiftId, ShiftState, TimeRange, YearMonth,
};

// Engine surface
pub use engine::{
    AssignmentEvent, AssignmentEventPublisher, AssignmentOutcome, AssignmentPlanner,
    AutoFillReport, AvailabilityMatcher, CapacityLedger, EngineError, EngineRepositories,
    EngineResult, NoOpEventPublisher, Occupancy, OptionalEventPublisher, PairingPlan,
    PairingResolver, QuotaTracker, ReleaseOutcome, SkippedCandidate,
};

// Configuration
pub use config::{ConfigManager, EngineConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
