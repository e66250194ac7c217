// ==========================================
// Shift Engine - Configuration Layer
// ==========================================
// Engine tuning values with hard-coded defaults, overridable
// through the config_kv table (scope_id = 'global').
// ==========================================

pub mod config_manager;

pub use config_manager::ConfigManager;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Configuration consumed by the constraint engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Boundary between morning and afternoon periods.
    pub midday_cutoff: NaiveTime,
    /// SQLite busy_timeout applied to engine connections.
    pub busy_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            midday_cutoff: NaiveTime::from_hms_opt(12, 0, 0).expect("valid cutoff"),
            busy_timeout_ms: crate::db::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}
