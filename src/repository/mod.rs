// ==========================================
// Shift Engine - Data Repository Layer
// ==========================================
// Data access interfaces only; no business logic lives here.
// All queries are parameterized.
// ==========================================

pub mod availability_repo;
pub mod error;
pub mod participant_repo;
pub mod place_repo;
pub mod shift_repo;

// Re-export core repositories
pub use availability_repo::AvailabilityRuleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use participant_repo::ParticipantRepository;
pub use place_repo::PlaceRepository;
pub use shift_repo::ShiftRepository;
