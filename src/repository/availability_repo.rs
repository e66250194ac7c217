// ==========================================
// Shift Engine - Availability Rule Repository
// ==========================================
// Rule payloads are stored as tagged JSON; structural
// validation runs before insert so no unreadable payload
// ever lands in the table.
// ==========================================

use crate::domain::availability::{AvailabilityRule, RuleKind, YearMonth};
use crate::domain::types::ParticipantId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Manages the availability_rule table.
pub struct AvailabilityRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityRuleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// All rules declared by the participant for the month.
    pub fn find_by_participant_and_month(
        &self,
        participant_id: &ParticipantId,
        month: YearMonth,
    ) -> RepositoryResult<Vec<AvailabilityRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT payload_json
            FROM availability_rule
            WHERE participant_id = ?1 AND month = ?2
            ORDER BY rule_id
            "#,
        )?;
        let rows = stmt.query_map(
            params![participant_id.as_str(), month.to_string()],
            |row| row.get::<_, String>(0),
        )?;

        let mut rules = Vec::new();
        for row in rows {
            let payload = row?;
            let kind: RuleKind = serde_json::from_str(&payload)
                .map_err(|e| RepositoryError::InvalidRulePayload(format!("{payload}: {e}")))?;
            rules.push(AvailabilityRule {
                participant_id: participant_id.clone(),
                month,
                kind,
            });
        }
        Ok(rules)
    }

    /// Store one rule after structural validation.
    pub fn insert(&self, rule: &AvailabilityRule) -> RepositoryResult<()> {
        rule.kind
            .validate()
            .map_err(RepositoryError::InvalidRulePayload)?;

        let payload = serde_json::to_string(&rule.kind)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO availability_rule (rule_id, participant_id, month, payload_json)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                Uuid::new_v4().to_string(),
                rule.participant_id.as_str(),
                rule.month.to_string(),
                payload,
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::Period;
    use crate::domain::participant::Participant;
    use crate::repository::participant_repo::ParticipantRepository;
    use chrono::Weekday;

    fn setup() -> (Arc<Mutex<Connection>>, AvailabilityRuleRepository) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        ParticipantRepository::from_connection(conn.clone())
            .insert(&Participant::unconstrained("p1", "Anna"))
            .unwrap();
        (conn.clone(), AvailabilityRuleRepository::from_connection(conn))
    }

    #[test]
    fn test_insert_and_reload_by_month() {
        let (_conn, repo) = setup();
        let month: YearMonth = "2026-03".parse().unwrap();

        let rule = AvailabilityRule {
            participant_id: ParticipantId::new("p1"),
            month,
            kind: RuleKind::WeekdaySet {
                days: vec![Weekday::Sat],
                period: Period::Morning,
            },
        };
        repo.insert(&rule).unwrap();

        let loaded = repo
            .find_by_participant_and_month(&ParticipantId::new("p1"), month)
            .unwrap();
        assert_eq!(loaded, vec![rule]);

        let other = repo
            .find_by_participant_and_month(&ParticipantId::new("p1"), "2026-04".parse().unwrap())
            .unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_insert_rejects_invalid_rule() {
        let (_conn, repo) = setup();
        let rule = AvailabilityRule {
            participant_id: ParticipantId::new("p1"),
            month: YearMonth::new(2026, 3),
            kind: RuleKind::WeekdaySet {
                days: vec![],
                period: Period::Morning,
            },
        };
        let err = repo.insert(&rule).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidRulePayload(_)));
    }
}
