// ==========================================
// Shift Engine - Place Entity
// ==========================================

use crate::domain::types::PlaceId;
use serde::{Deserialize, Serialize};

/// A venue with an optional maximum simultaneous-participant capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    /// None = unbounded.
    pub capacity: Option<u32>,
}
