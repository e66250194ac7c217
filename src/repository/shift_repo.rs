// ==========================================
// Shift Engine - Shift & Assignment Repository
// ==========================================
// Loads shifts with place capacity and the current assignment
// set joined; owns all assignment row mutations so they can run
// inside one transaction where atomicity demands it.
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::availability::YearMonth;
use crate::domain::shift::{Shift, TimeRange};
use crate::domain::types::{ParticipantId, PlaceId, ShiftId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DATE_FMT: &str = "%Y-%m-%d";
const TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ShiftRepository
// ==========================================

/// Manages the shift and assignment tables.
pub struct ShiftRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftRepository {
    /// Build a repository over an existing shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a shift row (seed/admin path).
    pub fn insert(
        &self,
        id: &ShiftId,
        date: NaiveDate,
        time_range: &TimeRange,
        place_id: &PlaceId,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO shift (shift_id, shift_date, time_range, place_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                id.as_str(),
                date.format(DATE_FMT).to_string(),
                time_range.to_string(),
                place_id.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Load a shift with its place capacity and current assignment set.
    ///
    /// # Returns
    /// - Ok(Some(Shift)): found; `assigned` is sorted by participant id
    /// - Ok(None): no such shift
    pub fn find_by_id(&self, id: &ShiftId) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT s.shift_id, s.shift_date, s.time_range, s.place_id, p.capacity
                FROM shift s
                JOIN place p ON p.place_id = s.place_id
                WHERE s.shift_id = ?1
                "#,
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<u32>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((shift_id, date_s, range_s, place_id, capacity)) = header else {
            return Ok(None);
        };

        let date = NaiveDate::parse_from_str(&date_s, DATE_FMT)
            .map_err(|e| RepositoryError::InvalidPayload(format!("shift_date {date_s}: {e}")))?;
        let time_range: TimeRange = range_s
            .parse()
            .map_err(|e| RepositoryError::InvalidPayload(format!("time_range {range_s}: {e}")))?;

        let mut stmt = conn.prepare(
            "SELECT participant_id FROM assignment WHERE shift_id = ?1 ORDER BY participant_id",
        )?;
        let rows = stmt.query_map(params![id.as_str()], |row| row.get::<_, String>(0))?;
        let mut assigned = Vec::new();
        for row in rows {
            assigned.push(ParticipantId::new(row?));
        }

        Ok(Some(Shift {
            id: ShiftId::new(shift_id),
            date,
            time_range,
            place_id: PlaceId::new(place_id),
            place_capacity: capacity,
            assigned,
        }))
    }

    /// Assignment rows of one shift, sorted by participant id.
    pub fn find_assignments(&self, shift_id: &ShiftId) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT participant_id, shift_id, assigned_at
            FROM assignment
            WHERE shift_id = ?1
            ORDER BY participant_id
            "#,
        )?;
        let rows = stmt.query_map(params![shift_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut assignments = Vec::new();
        for row in rows {
            let (participant_id, shift_id, assigned_at) = row?;
            let assigned_at = NaiveDateTime::parse_from_str(&assigned_at, TS_FMT)
                .map_err(|e| RepositoryError::InvalidPayload(format!("assigned_at {assigned_at}: {e}")))?;
            assignments.push(Assignment {
                participant_id: ParticipantId::new(participant_id),
                shift_id: ShiftId::new(shift_id),
                assigned_at,
            });
        }
        Ok(assignments)
    }

    /// Ids of shifts the participant holds on the given date.
    ///
    /// Used for the no-same-day-double-booking check.
    pub fn find_by_participant_and_date(
        &self,
        participant_id: &ParticipantId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ShiftId>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.shift_id
            FROM assignment a
            JOIN shift s ON s.shift_id = a.shift_id
            WHERE a.participant_id = ?1 AND s.shift_date = ?2
            ORDER BY s.shift_id
            "#,
        )?;
        let rows = stmt.query_map(
            params![participant_id.as_str(), date.format(DATE_FMT).to_string()],
            |row| row.get::<_, String>(0),
        )?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(ShiftId::new(row?));
        }
        Ok(ids)
    }

    /// Count of the participant's assignments whose shift date falls
    /// in the given month. Always recomputed, never cached.
    pub fn count_assignments_in_month(
        &self,
        participant_id: &ParticipantId,
        month: YearMonth,
    ) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM assignment a
            JOIN shift s ON s.shift_id = a.shift_id
            WHERE a.participant_id = ?1
              AND s.shift_date >= ?2
              AND s.shift_date < ?3
            "#,
            params![
                participant_id.as_str(),
                month.first_day().format(DATE_FMT).to_string(),
                month.next_month_first_day().format(DATE_FMT).to_string(),
            ],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// Insert one assignment row.
    ///
    /// The UNIQUE(participant_id, shift_id) constraint backs the
    /// planner's idempotency guarantee.
    pub fn insert_assignment(
        &self,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_assignment_row(&conn, participant_id, shift_id)
    }

    /// Insert two assignment rows in one transaction.
    ///
    /// Mandatory-pairing commits go through here: either both rows
    /// land or neither does.
    pub fn insert_assignment_pair(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        shift_id: &ShiftId,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Self::insert_assignment_row(&tx, first, shift_id)?;
        Self::insert_assignment_row(&tx, second, shift_id)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn insert_assignment_row(
        conn: &Connection,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO assignment (assignment_id, participant_id, shift_id, assigned_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                Uuid::new_v4().to_string(),
                participant_id.as_str(),
                shift_id.as_str(),
                Utc::now().naive_utc().format(TS_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// Delete one assignment row.
    ///
    /// # Returns
    /// - Ok(true): a row was removed
    /// - Ok(false): no such assignment existed
    pub fn delete_assignment(
        &self,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            "DELETE FROM assignment WHERE participant_id = ?1 AND shift_id = ?2",
            params![participant_id.as_str(), shift_id.as_str()],
        )?;
        Ok(n > 0)
    }

    /// Delete several assignment rows of one shift in one transaction.
    ///
    /// Pairing removal goes through here: a mandatory pair leaves
    /// together or not at all.
    pub fn delete_assignments(
        &self,
        participant_ids: &[ParticipantId],
        shift_id: &ShiftId,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        for participant_id in participant_ids {
            tx.execute(
                "DELETE FROM assignment WHERE participant_id = ?1 AND shift_id = ?2",
                params![participant_id.as_str(), shift_id.as_str()],
            )?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Remove every assignment of the shift.
    ///
    /// # Returns
    /// Participant ids that were assigned, sorted.
    pub fn delete_all_assignments(&self, shift_id: &ShiftId) -> RepositoryResult<Vec<ParticipantId>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut removed = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT participant_id FROM assignment WHERE shift_id = ?1 ORDER BY participant_id",
            )?;
            let rows = stmt.query_map(params![shift_id.as_str()], |row| row.get::<_, String>(0))?;
            for row in rows {
                removed.push(ParticipantId::new(row?));
            }
        }
        tx.execute(
            "DELETE FROM assignment WHERE shift_id = ?1",
            params![shift_id.as_str()],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::place::Place;
    use crate::repository::place_repo::PlaceRepository;
    use crate::repository::participant_repo::ParticipantRepository;
    use crate::domain::participant::Participant;

    fn setup() -> (Arc<Mutex<Connection>>, ShiftRepository) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), ShiftRepository::from_connection(conn))
    }

    fn seed(conn: &Arc<Mutex<Connection>>, repo: &ShiftRepository) {
        let places = PlaceRepository::from_connection(conn.clone());
        places
            .insert(&Place {
                id: PlaceId::new("pl1"),
                name: "Station".to_string(),
                capacity: Some(3),
            })
            .unwrap();
        let participants = ParticipantRepository::from_connection(conn.clone());
        for id in ["a", "b", "c"] {
            participants
                .insert(&Participant::unconstrained(id, id.to_uppercase()))
                .unwrap();
        }
        repo.insert(
            &ShiftId::new("s1"),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            &"09:00-12:00".parse().unwrap(),
            &PlaceId::new("pl1"),
        )
        .unwrap();
        repo.insert(
            &ShiftId::new("s2"),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            &"15:00-18:00".parse().unwrap(),
            &PlaceId::new("pl1"),
        )
        .unwrap();
    }

    #[test]
    fn test_find_by_id_joins_capacity_and_assignments() {
        let (conn, repo) = setup();
        seed(&conn, &repo);

        repo.insert_assignment(&ParticipantId::new("b"), &ShiftId::new("s1"))
            .unwrap();
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();

        let shift = repo.find_by_id(&ShiftId::new("s1")).unwrap().unwrap();
        assert_eq!(shift.place_capacity, Some(3));
        assert_eq!(
            shift.assigned,
            vec![ParticipantId::new("a"), ParticipantId::new("b")]
        );
        assert_eq!(shift.time_range.to_string(), "09:00-12:00");
    }

    #[test]
    fn test_duplicate_assignment_hits_unique_constraint() {
        let (conn, repo) = setup();
        seed(&conn, &repo);
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();
        let err = repo
            .insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_pair_insert_is_atomic() {
        let (conn, repo) = setup();
        seed(&conn, &repo);
        // "a" already seated; pairing insert containing "a" must fail
        // as a whole and leave "b" out as well
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();
        let err = repo
            .insert_assignment_pair(
                &ParticipantId::new("b"),
                &ParticipantId::new("a"),
                &ShiftId::new("s1"),
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        let shift = repo.find_by_id(&ShiftId::new("s1")).unwrap().unwrap();
        assert_eq!(shift.assigned, vec![ParticipantId::new("a")]);
    }

    #[test]
    fn test_same_day_lookup_and_month_count() {
        let (conn, repo) = setup();
        seed(&conn, &repo);
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s2"))
            .unwrap();

        let same_day = repo
            .find_by_participant_and_date(
                &ParticipantId::new("a"),
                NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            )
            .unwrap();
        assert_eq!(same_day, vec![ShiftId::new("s1"), ShiftId::new("s2")]);

        let used = repo
            .count_assignments_in_month(&ParticipantId::new("a"), YearMonth::new(2026, 3))
            .unwrap();
        assert_eq!(used, 2);
        let other_month = repo
            .count_assignments_in_month(&ParticipantId::new("a"), YearMonth::new(2026, 4))
            .unwrap();
        assert_eq!(other_month, 0);
    }

    #[test]
    fn test_find_assignments_carries_timestamps() {
        let (conn, repo) = setup();
        seed(&conn, &repo);
        repo.insert_assignment(&ParticipantId::new("b"), &ShiftId::new("s1"))
            .unwrap();
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();

        let assignments = repo.find_assignments(&ShiftId::new("s1")).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].participant_id, ParticipantId::new("a"));
        assert_eq!(assignments[1].participant_id, ParticipantId::new("b"));
        assert!(assignments.iter().all(|a| a.shift_id == ShiftId::new("s1")));
    }

    #[test]
    fn test_delete_all_returns_removed_ids() {
        let (conn, repo) = setup();
        seed(&conn, &repo);
        repo.insert_assignment(&ParticipantId::new("c"), &ShiftId::new("s1"))
            .unwrap();
        repo.insert_assignment(&ParticipantId::new("a"), &ShiftId::new("s1"))
            .unwrap();

        let removed = repo.delete_all_assignments(&ShiftId::new("s1")).unwrap();
        assert_eq!(removed, vec![ParticipantId::new("a"), ParticipantId::new("c")]);
        let shift = repo.find_by_id(&ShiftId::new("s1")).unwrap().unwrap();
        assert!(shift.assigned.is_empty());
    }
}
