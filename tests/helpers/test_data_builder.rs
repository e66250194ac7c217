// ==========================================
// Test data builders and engine fixture
// ==========================================
// In-memory SQLite, schema from db::init_schema, planner
// wired with default configuration.
// ==========================================

use chrono::NaiveDate;
use rusqlite::Connection;
use shift_engine::config::EngineConfig;
use shift_engine::domain::availability::{AvailabilityRule, RuleKind, YearMonth};
use shift_engine::domain::participant::Participant;
use shift_engine::domain::place::Place;
use shift_engine::domain::types::{ParticipantId, PlaceId, SexCategory, ShiftId};
use shift_engine::engine::events::{
    AssignmentEvent, AssignmentEventPublisher, OptionalEventPublisher,
};
use shift_engine::engine::{AssignmentPlanner, EngineRepositories};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// Capturing event publisher
// ==========================================

/// Records every published event for assertions.
#[derive(Default)]
pub struct CapturingPublisher {
    pub events: Mutex<Vec<AssignmentEvent>>,
}

impl AssignmentEventPublisher for CapturingPublisher {
    fn publish(&self, event: AssignmentEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.events.lock().unwrap().push(event);
        Ok(String::new())
    }
}

// ==========================================
// Engine fixture
// ==========================================

pub struct EngineFixture {
    pub repos: EngineRepositories,
    pub planner: Arc<AssignmentPlanner>,
    pub published: Option<Arc<CapturingPublisher>>,
}

impl EngineFixture {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Fixture with a capturing event publisher attached.
    pub fn with_event_capture() -> Self {
        Self::build(true)
    }

    fn build(capture_events: bool) -> Self {
        let conn = Connection::open_in_memory().unwrap();
        shift_engine::db::configure_sqlite_connection(&conn).unwrap();
        shift_engine::db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let repos = EngineRepositories::from_connection(conn);

        let (publisher, published) = if capture_events {
            let capture = Arc::new(CapturingPublisher::default());
            (
                OptionalEventPublisher::with_publisher(capture.clone()),
                Some(capture),
            )
        } else {
            (OptionalEventPublisher::none(), None)
        };

        let planner = Arc::new(AssignmentPlanner::new(
            repos.clone(),
            EngineConfig::default(),
            publisher,
        ));
        Self {
            repos,
            planner,
            published,
        }
    }

    pub fn add_place(&self, id: &str, capacity: Option<u32>) {
        self.repos
            .place_repo
            .insert(&Place {
                id: PlaceId::new(id),
                name: format!("Place {id}"),
                capacity,
            })
            .unwrap();
    }

    pub fn add_shift(&self, id: &str, date: &str, time_range: &str, place_id: &str) {
        self.repos
            .shift_repo
            .insert(
                &ShiftId::new(id),
                date.parse::<NaiveDate>().unwrap(),
                &time_range.parse().unwrap(),
                &PlaceId::new(place_id),
            )
            .unwrap();
    }

    pub fn add_participant(&self, participant: &Participant) {
        self.repos.participant_repo.insert(participant).unwrap();
    }

    pub fn add_rule(&self, participant_id: &str, month: &str, kind: RuleKind) {
        self.repos
            .availability_repo
            .insert(&AvailabilityRule {
                participant_id: ParticipantId::new(participant_id),
                month: month.parse::<YearMonth>().unwrap(),
                kind,
            })
            .unwrap();
    }

    pub fn events(&self) -> Vec<AssignmentEvent> {
        self.published
            .as_ref()
            .map(|p| p.events.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

// ==========================================
// ParticipantBuilder
// ==========================================

pub struct ParticipantBuilder {
    participant: Participant,
}

impl ParticipantBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            participant: Participant {
                id: ParticipantId::new(id),
                display_name: id.to_uppercase(),
                sex: SexCategory::Unspecified,
                has_vehicle: false,
                must_pair_with: None,
                must_not_pair_with: None,
                monthly_quota: None,
            },
        }
    }

    pub fn quota(mut self, quota: u32) -> Self {
        self.participant.monthly_quota = Some(quota);
        self
    }

    pub fn pair_with(mut self, partner: &str) -> Self {
        self.participant.must_pair_with = Some(ParticipantId::new(partner));
        self
    }

    pub fn not_pair_with(mut self, blocked: &str) -> Self {
        self.participant.must_not_pair_with = Some(ParticipantId::new(blocked));
        self
    }

    pub fn has_vehicle(mut self) -> Self {
        self.participant.has_vehicle = true;
        self
    }

    pub fn build(self) -> Participant {
        self.participant
    }
}

/// Shorthand ids used across scenario tests.
pub fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

pub fn sid(id: &str) -> ShiftId {
    ShiftId::new(id)
}
