// ==========================================
// Shift Engine - Domain Event Publishing
// ==========================================
// The engine defines the publisher trait; the excluded
// notification and cache-invalidation layers implement it.
// The engine does not know or care who consumes the events.
// ==========================================

use crate::domain::types::{EventKind, ParticipantId, ShiftId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// Assignment event
// ==========================================

/// Emitted after every successful mutating planner call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub shift_id: ShiftId,
    pub kind: EventKind,
    /// Everyone whose assignment was created or removed by the call,
    /// sorted by id.
    pub affected_participant_ids: Vec<ParticipantId>,
}

impl AssignmentEvent {
    pub fn new(
        shift_id: ShiftId,
        kind: EventKind,
        mut affected_participant_ids: Vec<ParticipantId>,
    ) -> Self {
        affected_participant_ids.sort();
        Self {
            shift_id,
            kind,
            affected_participant_ids,
        }
    }
}

// ==========================================
// Publisher trait
// ==========================================

/// Assignment event publisher.
///
/// Defined by the engine, implemented by downstream layers.
/// Publishing failures never roll back the committed mutation;
/// the planner logs and moves on.
pub trait AssignmentEventPublisher: Send + Sync {
    /// Publish one event.
    ///
    /// # Returns
    /// - Ok(handle): consumer-specific handle (may be empty)
    /// - Err: publish failed
    fn publish(&self, event: AssignmentEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// No-op publisher for tests and callers without subscribers.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl AssignmentEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: AssignmentEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            shift_id = %event.shift_id,
            kind = %event.kind,
            "NoOpEventPublisher: skipping event publication"
        );
        Ok(String::new())
    }
}

/// Optional-publisher wrapper.
///
/// Simplifies handling of `Option<Arc<dyn AssignmentEventPublisher>>`.
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn AssignmentEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn AssignmentEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Publish if a publisher is configured.
    pub fn publish(&self, event: AssignmentEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    shift_id = %event.shift_id,
                    kind = %event.kind,
                    "no publisher configured, skipping event"
                );
                Ok(String::new())
            }
        }
    }
}
