// ==========================================
// Shift Engine - SQLite Connection Setup
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so no module
//   runs with foreign keys off while another runs with them on
// - one busy_timeout for all connections, to reduce sporadic busy
//   errors under concurrent writes
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the shared PRAGMA configuration to a connection.
///
/// Notes:
/// - foreign_keys must be enabled per connection
/// - busy_timeout must be configured per connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the engine's tables if they do not exist yet.
///
/// Shift state is deliberately absent from the schema: it is derived
/// from live assignment rows at read time, never persisted.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS participant (
            participant_id     TEXT PRIMARY KEY,
            display_name       TEXT NOT NULL,
            sex                TEXT NOT NULL DEFAULT 'UNSPECIFIED',
            has_vehicle        INTEGER NOT NULL DEFAULT 0,
            must_pair_with     TEXT,
            must_not_pair_with TEXT,
            monthly_quota      INTEGER
        );

        CREATE TABLE IF NOT EXISTS place (
            place_id TEXT PRIMARY KEY,
            name     TEXT NOT NULL,
            capacity INTEGER
        );

        CREATE TABLE IF NOT EXISTS shift (
            shift_id   TEXT PRIMARY KEY,
            shift_date TEXT NOT NULL,
            time_range TEXT NOT NULL,
            place_id   TEXT NOT NULL REFERENCES place(place_id)
        );

        CREATE TABLE IF NOT EXISTS assignment (
            assignment_id  TEXT PRIMARY KEY,
            participant_id TEXT NOT NULL REFERENCES participant(participant_id),
            shift_id       TEXT NOT NULL REFERENCES shift(shift_id),
            assigned_at    TEXT NOT NULL,
            UNIQUE (participant_id, shift_id)
        );

        CREATE TABLE IF NOT EXISTS availability_rule (
            rule_id        TEXT PRIMARY KEY,
            participant_id TEXT NOT NULL REFERENCES participant(participant_id),
            month          TEXT NOT NULL,
            payload_json   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );

        CREATE INDEX IF NOT EXISTS idx_assignment_shift
            ON assignment (shift_id);
        CREATE INDEX IF NOT EXISTS idx_assignment_participant
            ON assignment (participant_id);
        CREATE INDEX IF NOT EXISTS idx_shift_date
            ON shift (shift_date);
        CREATE INDEX IF NOT EXISTS idx_rule_participant_month
            ON availability_rule (participant_id, month);
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='assignment'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(n, 1);
    }
}
