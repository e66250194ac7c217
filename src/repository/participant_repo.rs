// ==========================================
// Shift Engine - Participant Repository
// ==========================================
// Data access only; no business logic.
// All queries parameterized.
// ==========================================

use crate::domain::participant::Participant;
use crate::domain::types::{ParticipantId, SexCategory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ParticipantRepository
// ==========================================

/// Manages the participant table.
pub struct ParticipantRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ParticipantRepository {
    /// Build a repository over an existing shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
        let sex: String = row.get(2)?;
        Ok(Participant {
            id: ParticipantId::new(row.get::<_, String>(0)?),
            display_name: row.get(1)?,
            sex: match sex.as_str() {
                "FEMALE" => SexCategory::Female,
                "MALE" => SexCategory::Male,
                _ => SexCategory::Unspecified,
            },
            has_vehicle: row.get::<_, i64>(3)? != 0,
            must_pair_with: row.get::<_, Option<String>>(4)?.map(ParticipantId::new),
            must_not_pair_with: row.get::<_, Option<String>>(5)?.map(ParticipantId::new),
            monthly_quota: row.get::<_, Option<u32>>(6)?,
        })
    }

    const SELECT_COLS: &'static str = "participant_id, display_name, sex, has_vehicle, \
         must_pair_with, must_not_pair_with, monthly_quota";

    /// Look up a single participant.
    ///
    /// # Returns
    /// - Ok(Some(Participant)): found
    /// - Ok(None): no such participant
    pub fn find_by_id(&self, id: &ParticipantId) -> RepositoryResult<Option<Participant>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM participant WHERE participant_id = ?1",
            Self::SELECT_COLS
        ))?;
        let participant = stmt
            .query_row(params![id.as_str()], Self::map_row)
            .optional()?;
        Ok(participant)
    }

    /// All participants, ordered by id for deterministic candidate pools.
    pub fn find_all(&self) -> RepositoryResult<Vec<Participant>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM participant ORDER BY participant_id",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?);
        }
        Ok(participants)
    }

    /// Insert a participant (seed/admin path).
    pub fn insert(&self, participant: &Participant) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO participant (
                participant_id, display_name, sex, has_vehicle,
                must_pair_with, must_not_pair_with, monthly_quota
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                participant.id.as_str(),
                participant.display_name,
                participant.sex.to_string(),
                participant.has_vehicle as i64,
                participant.must_pair_with.as_ref().map(|p| p.as_str()),
                participant.must_not_pair_with.as_ref().map(|p| p.as_str()),
                participant.monthly_quota,
            ],
        )?;
        Ok(())
    }
}
