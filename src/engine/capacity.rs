// ==========================================
// Shift Engine - Capacity Ledger
// ==========================================
// Pure occupancy/state derivation over a loaded shift.
// Stateless, no side effects, no I/O.
// ==========================================

use crate::domain::shift::Shift;
use crate::domain::types::ShiftState;
use serde::{Deserialize, Serialize};

/// Occupancy snapshot of one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub assigned: u32,
    /// None = unbounded capacity.
    pub capacity: Option<u32>,
}

// ==========================================
// CapacityLedger - pure function set
// ==========================================
pub struct CapacityLedger;

impl CapacityLedger {
    /// Current occupancy of the shift against its place capacity.
    pub fn occupancy(shift: &Shift) -> Occupancy {
        Occupancy {
            assigned: shift.assigned_count(),
            capacity: shift.place_capacity,
        }
    }

    /// Derived display state.
    ///
    /// # Rules
    /// - Full: capacity defined and assigned >= capacity, or capacity
    ///   undefined and assigned > 0 (treated as single-slot)
    /// - PartiallyFilled: assigned > 0 and not full
    /// - Free: otherwise
    pub fn state(shift: &Shift) -> ShiftState {
        let assigned = shift.assigned_count();
        let full = match shift.place_capacity {
            Some(capacity) => assigned >= capacity,
            None => assigned > 0,
        };
        if full {
            ShiftState::Full
        } else if assigned > 0 {
            ShiftState::PartiallyFilled
        } else {
            ShiftState::Free
        }
    }

    /// Whether `n` more participants fit on the shift.
    pub fn has_room_for(shift: &Shift, n: u32) -> bool {
        match shift.place_capacity {
            None => true,
            Some(capacity) => shift.assigned_count() + n <= capacity,
        }
    }

    /// Open seats remaining for auto-fill.
    ///
    /// Undefined capacity follows the single-slot reading used by
    /// `state`: one seat when empty, zero otherwise.
    pub fn seats_remaining(shift: &Shift) -> u32 {
        match shift.place_capacity {
            Some(capacity) => capacity.saturating_sub(shift.assigned_count()),
            None => {
                if shift.assigned_count() == 0 {
                    1
                } else {
                    0
                }
            }
        }
    }
}
