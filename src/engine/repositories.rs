// ==========================================
// Shift Engine - Engine Repository Aggregation
// ==========================================
// Bundles the repositories the planner needs, cutting the
// constructor down to one injection point and making the
// whole data layer mockable in one place.
// ==========================================

use crate::repository::{
    AvailabilityRuleRepository, ParticipantRepository, PlaceRepository, ShiftRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Repository set consumed by the assignment planner.
#[derive(Clone)]
pub struct EngineRepositories {
    pub participant_repo: Arc<ParticipantRepository>,
    pub place_repo: Arc<PlaceRepository>,
    pub shift_repo: Arc<ShiftRepository>,
    pub availability_repo: Arc<AvailabilityRuleRepository>,
}

impl EngineRepositories {
    pub fn new(
        participant_repo: Arc<ParticipantRepository>,
        place_repo: Arc<PlaceRepository>,
        shift_repo: Arc<ShiftRepository>,
        availability_repo: Arc<AvailabilityRuleRepository>,
    ) -> Self {
        Self {
            participant_repo,
            place_repo,
            shift_repo,
            availability_repo,
        }
    }

    /// Build all repositories over one shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            participant_repo: Arc::new(ParticipantRepository::from_connection(conn.clone())),
            place_repo: Arc::new(PlaceRepository::from_connection(conn.clone())),
            shift_repo: Arc::new(ShiftRepository::from_connection(conn.clone())),
            availability_repo: Arc::new(AvailabilityRuleRepository::from_connection(conn)),
        }
    }
}
