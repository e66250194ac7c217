// ==========================================
// Shift Engine - Configuration Manager
// ==========================================
// Loads EngineConfig from the config_kv table, falling back
// to defaults for absent keys.
// Keys: engine.midday_cutoff (HH:MM), engine.busy_timeout_ms
// ==========================================

use crate::config::EngineConfig;
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

const KEY_MIDDAY_CUTOFF: &str = "engine.midday_cutoff";
const KEY_BUSY_TIMEOUT_MS: &str = "engine.busy_timeout_ms";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a new manager on its own connection.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build a manager over an existing shared connection.
    ///
    /// Re-applies the shared PRAGMA configuration (idempotent) so the
    /// connection behaves identically no matter who opened it.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let guard = conn
                .lock()
                .map_err(|e| format!("lock acquisition failed: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// Read one value from config_kv (scope_id = 'global').
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write one global value (insert-or-replace).
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failed: {}", e))?;
        conn.execute(
            "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Assemble the engine configuration, defaults filling the gaps.
    ///
    /// Unparseable stored values are logged and ignored rather than
    /// failing the whole load.
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let mut config = EngineConfig::default();

        if let Some(raw) = self.get_config_value(KEY_MIDDAY_CUTOFF)? {
            match NaiveTime::parse_from_str(&raw, "%H:%M") {
                Ok(t) => config.midday_cutoff = t,
                Err(_) => warn!(key = KEY_MIDDAY_CUTOFF, value = %raw, "ignoring unparseable config value"),
            }
        }

        if let Some(raw) = self.get_config_value(KEY_BUSY_TIMEOUT_MS)? {
            match raw.parse::<u64>() {
                Ok(ms) => config.busy_timeout_ms = ms,
                Err(_) => warn!(key = KEY_BUSY_TIMEOUT_MS, value = %raw, "ignoring unparseable config value"),
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let mgr = setup();
        let config = mgr.load_engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_override_midday_cutoff() {
        let mgr = setup();
        mgr.set_config_value(KEY_MIDDAY_CUTOFF, "13:00").unwrap();
        let config = mgr.load_engine_config().unwrap();
        assert_eq!(
            config.midday_cutoff,
            NaiveTime::from_hms_opt(13, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unparseable_value_falls_back_to_default() {
        let mgr = setup();
        mgr.set_config_value(KEY_MIDDAY_CUTOFF, "noonish").unwrap();
        let config = mgr.load_engine_config().unwrap();
        assert_eq!(config.midday_cutoff, EngineConfig::default().midday_cutoff);
    }
}
