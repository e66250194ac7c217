// ==========================================
// Shift Engine - Assignment Planner
// ==========================================
// The only mutating entry point used by external callers.
// Validates numeric limits, temporal eligibility and pairing
// constraints, then commits inside a per-shift exclusion
// scope. A rejected operation leaves zero side effects.
// ==========================================

use crate::config::EngineConfig;
use crate::domain::availability::YearMonth;
use crate::domain::shift::Shift;
use crate::domain::types::{Actor, EventKind, ParticipantId, ShiftId, ShiftState};
use crate::engine::availability::{Availability, AvailabilityMatcher, DenialReason};
use crate::engine::capacity::{CapacityLedger, Occupancy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{AssignmentEvent, OptionalEventPublisher};
use crate::engine::pairing::{PairingPlan, PairingResolver};
use crate::engine::quota::QuotaTracker;
use crate::engine::repositories::EngineRepositories;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};

// ==========================================
// Per-shift lock registry
// ==========================================

/// Mutual-exclusion scope keyed by shift id.
///
/// All mutating operations for a shift serialize on its lock, so two
/// concurrent assigns against the last remaining slot cannot both
/// pass validation. Reads never take it. Entries are evicted when the
/// last holder or waiter leaves, so the map stays bounded by the
/// number of shifts under concurrent mutation.
struct ShiftLockRegistry {
    locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ShiftLockRegistry {
    fn new() -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Enter the shift's exclusion scope. The returned guard holds the
    /// lock until dropped.
    async fn acquire(&self, shift_id: &ShiftId) -> ShiftScope<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(shift_id.as_str().to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;
        ShiftScope {
            registry: self,
            shift_id: shift_id.as_str().to_string(),
            guard: Some(guard),
        }
    }

    /// Drop the map entry once nothing outside the map references it.
    /// `acquire` clones under the same mutex, so a count of one means
    /// no holder and no parked waiter.
    fn evict_if_idle(&self, shift_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = locks.get(shift_id) {
            if Arc::strong_count(entry) == 1 {
                locks.remove(shift_id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// RAII guard for one shift's exclusion scope.
struct ShiftScope<'a> {
    registry: &'a ShiftLockRegistry,
    shift_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ShiftScope<'_> {
    fn drop(&mut self) {
        // the guard's Arc clone must go before the idle check
        self.guard.take();
        self.registry.evict_if_idle(&self.shift_id);
    }
}

// ==========================================
// Outcome types
// ==========================================

/// Result of a successful assign call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub shift_id: ShiftId,
    /// Rows committed by this call, sorted by id. Empty when the
    /// request was an idempotent duplicate.
    pub newly_assigned: Vec<ParticipantId>,
    pub occupancy: Occupancy,
    pub state: ShiftState,
}

/// Result of a successful release or empty-shift call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub shift_id: ShiftId,
    /// Rows removed by this call, sorted by id. Empty when the
    /// participant was not assigned to begin with.
    pub released: Vec<ParticipantId>,
    pub state: ShiftState,
}

/// One candidate auto-fill could not seat, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub participant_id: ParticipantId,
    pub reason: String,
}

/// Report of one auto-fill run. Partial fill is an expected,
/// reportable outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFillReport {
    pub shift_id: ShiftId,
    pub assigned: Vec<ParticipantId>,
    pub skipped: Vec<SkippedCandidate>,
    pub state: ShiftState,
}

// ==========================================
// AssignmentPlanner
// ==========================================
pub struct AssignmentPlanner {
    repos: EngineRepositories,
    matcher: AvailabilityMatcher,
    pairing: PairingResolver,
    quota: QuotaTracker,
    publisher: OptionalEventPublisher,
    locks: ShiftLockRegistry,
}

impl AssignmentPlanner {
    /// Wire the planner and its component engines.
    pub fn new(
        repos: EngineRepositories,
        config: EngineConfig,
        publisher: OptionalEventPublisher,
    ) -> Self {
        let quota = QuotaTracker::new(repos.shift_repo.clone());
        let matcher = AvailabilityMatcher::new(
            repos.availability_repo.clone(),
            quota.clone(),
            config,
        );
        let pairing = PairingResolver::new(
            repos.participant_repo.clone(),
            repos.shift_repo.clone(),
        );
        Self {
            repos,
            matcher,
            pairing,
            quota,
            publisher,
            locks: ShiftLockRegistry::new(),
        }
    }

    // ==========================================
    // Mutating operations
    // ==========================================

    /// Validate and execute one assignment request.
    ///
    /// Validation order: duplicate request (idempotent no-op success),
    /// same-day conflict, capacity, availability, pairing. All checks
    /// run inside the shift's exclusion scope; a prior read is never
    /// trusted.
    ///
    /// Exclusion is scoped to the target shift only. Two concurrent
    /// assigns of one participant to two different shifts on the same
    /// date take different locks, so the same-day check can admit
    /// both; callers needing that stronger guarantee must serialize
    /// per participant.
    #[instrument(skip(self), fields(participant_id = %participant_id, shift_id = %shift_id))]
    pub async fn assign(
        &self,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
    ) -> EngineResult<AssignmentOutcome> {
        self.assign_with_pairing(participant_id, shift_id, true)
            .await
    }

    async fn assign_with_pairing(
        &self,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
        resolve_pairing: bool,
    ) -> EngineResult<AssignmentOutcome> {
        let _scope = self.locks.acquire(shift_id).await;

        let participant = self
            .repos
            .participant_repo
            .find_by_id(participant_id)?
            .ok_or_else(|| EngineError::ParticipantNotFound(participant_id.clone()))?;
        let shift = self.load_shift(shift_id)?;

        // Duplicate assign against an existing identical assignment is
        // a no-op success, so retries after storage errors are safe.
        if shift.is_assigned(participant_id) {
            info!(
                participant_id = %participant_id,
                shift_id = %shift_id,
                "already assigned, idempotent no-op"
            );
            return Ok(AssignmentOutcome {
                shift_id: shift.id.clone(),
                newly_assigned: Vec::new(),
                occupancy: CapacityLedger::occupancy(&shift),
                state: CapacityLedger::state(&shift),
            });
        }

        let same_day = self
            .repos
            .shift_repo
            .find_by_participant_and_date(participant_id, shift.date)?;
        if let Some(other) = same_day.into_iter().find(|id| id != shift_id) {
            return Err(EngineError::DuplicateDateConflict {
                participant_id: participant_id.clone(),
                date: shift.date,
                other_shift_id: other,
            });
        }

        if !CapacityLedger::has_room_for(&shift, 1) {
            let occupancy = CapacityLedger::occupancy(&shift);
            return Err(EngineError::CapacityExceeded {
                shift_id: shift.id.clone(),
                assigned: occupancy.assigned,
                // has_room_for can only fail with a defined capacity
                capacity: occupancy.capacity.unwrap_or(0),
            });
        }

        match self.matcher.is_available(&participant, &shift)? {
            Availability::Available => {}
            Availability::Unavailable(reason) => {
                return Err(Self::denial_to_error(participant_id, reason))
            }
        }

        let plan = if resolve_pairing {
            self.pairing.resolve(&participant, &shift, &self.matcher)?
        } else {
            PairingPlan::Single(participant.id.clone())
        };

        match &plan {
            PairingPlan::Single(id) => {
                self.repos.shift_repo.insert_assignment(id, shift_id)?;
            }
            PairingPlan::Pair { primary, partner } => {
                self.repos
                    .shift_repo
                    .insert_assignment_pair(primary, partner, shift_id)?;
            }
        }

        let committed = self.load_shift(shift_id)?;
        let mut newly_assigned = plan.members();
        newly_assigned.sort();

        info!(
            shift_id = %shift_id,
            newly_assigned = ?newly_assigned,
            state = %CapacityLedger::state(&committed),
            "assignment committed"
        );
        self.emit(AssignmentEvent::new(
            shift_id.clone(),
            EventKind::Assigned,
            newly_assigned.clone(),
        ));

        Ok(AssignmentOutcome {
            shift_id: shift_id.clone(),
            newly_assigned,
            occupancy: CapacityLedger::occupancy(&committed),
            state: CapacityLedger::state(&committed),
        })
    }

    /// Release one participant from a shift.
    ///
    /// The actor must be the participant themself or an administrator.
    /// A seated mandatory partner leaves together with the released
    /// participant, in one transaction.
    #[instrument(skip(self), fields(participant_id = %participant_id, shift_id = %shift_id, actor = %actor))]
    pub async fn release(
        &self,
        participant_id: &ParticipantId,
        shift_id: &ShiftId,
        actor: &Actor,
    ) -> EngineResult<ReleaseOutcome> {
        if !actor.may_release(participant_id) {
            return Err(EngineError::NotAuthorized {
                actor: actor.to_string(),
            });
        }

        let _scope = self.locks.acquire(shift_id).await;

        let participant = self
            .repos
            .participant_repo
            .find_by_id(participant_id)?
            .ok_or_else(|| EngineError::ParticipantNotFound(participant_id.clone()))?;
        let shift = self.load_shift(shift_id)?;

        if !shift.is_assigned(participant_id) {
            return Ok(ReleaseOutcome {
                shift_id: shift.id.clone(),
                released: Vec::new(),
                state: CapacityLedger::state(&shift),
            });
        }

        let removal_set = self.pairing.removal_set(&participant, &shift)?;
        self.repos
            .shift_repo
            .delete_assignments(&removal_set, shift_id)?;

        let committed = self.load_shift(shift_id)?;
        info!(
            shift_id = %shift_id,
            released = ?removal_set,
            state = %CapacityLedger::state(&committed),
            "release committed"
        );
        self.emit(AssignmentEvent::new(
            shift_id.clone(),
            EventKind::Released,
            removal_set.clone(),
        ));

        Ok(ReleaseOutcome {
            shift_id: shift_id.clone(),
            released: removal_set,
            state: CapacityLedger::state(&committed),
        })
    }

    /// Release every current assignment of the shift.
    ///
    /// Administrator only.
    #[instrument(skip(self), fields(shift_id = %shift_id, actor = %actor))]
    pub async fn empty_shift(
        &self,
        shift_id: &ShiftId,
        actor: &Actor,
    ) -> EngineResult<ReleaseOutcome> {
        if !actor.is_administrator() {
            return Err(EngineError::NotAuthorized {
                actor: actor.to_string(),
            });
        }

        let _scope = self.locks.acquire(shift_id).await;

        // existence check first, so emptying a ghost shift is an error
        // rather than a silent no-op
        self.load_shift(shift_id)?;
        let removed = self.repos.shift_repo.delete_all_assignments(shift_id)?;

        let committed = self.load_shift(shift_id)?;
        info!(shift_id = %shift_id, removed = ?removed, "shift emptied");
        if !removed.is_empty() {
            self.emit(AssignmentEvent::new(
                shift_id.clone(),
                EventKind::Released,
                removed.clone(),
            ));
        }

        Ok(ReleaseOutcome {
            shift_id: shift_id.clone(),
            released: removed,
            state: CapacityLedger::state(&committed),
        })
    }

    /// Plan and execute automatic fill-in of the shift's open seats.
    ///
    /// Candidates are everyone not already on the shift who passes the
    /// availability matcher, prioritized by fewest assignments this
    /// month (fairness), ties broken by id for determinism. Each seat
    /// is its own atomic `assign`; a candidate rejected by a
    /// mid-sequence state change is skipped and reported. Pairing is
    /// not expanded here: auto-fill seats individuals independently.
    #[instrument(skip(self), fields(shift_id = %shift_id))]
    pub async fn plan_auto_fill(&self, shift_id: &ShiftId) -> EngineResult<AutoFillReport> {
        let shift = self.load_shift(shift_id)?;
        let needed = CapacityLedger::seats_remaining(&shift);
        if needed == 0 {
            return Ok(AutoFillReport {
                shift_id: shift_id.clone(),
                assigned: Vec::new(),
                skipped: Vec::new(),
                state: CapacityLedger::state(&shift),
            });
        }

        let month = YearMonth::from_date(shift.date);
        let mut pool = Vec::new();
        for candidate in self.repos.participant_repo.find_all()? {
            if shift.is_assigned(&candidate.id) {
                continue;
            }
            if !self.matcher.is_available(&candidate, &shift)?.is_available() {
                continue;
            }
            let used = self.quota.used(&candidate.id, month)?;
            pool.push((used, candidate.id));
        }
        // fewest assignments this month first; id breaks ties
        pool.sort();

        let mut assigned = Vec::new();
        let mut skipped = Vec::new();
        for (_, candidate_id) in pool.into_iter().take(needed as usize) {
            // each candidate is one atomic unit; earlier commits stay
            // in place whatever happens later in the sequence
            match self
                .assign_with_pairing(&candidate_id, shift_id, false)
                .await
            {
                Ok(outcome) => assigned.extend(outcome.newly_assigned),
                Err(err) if err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(
                        candidate_id = %candidate_id,
                        shift_id = %shift_id,
                        reason = %err,
                        "auto-fill candidate skipped"
                    );
                    skipped.push(SkippedCandidate {
                        participant_id: candidate_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let committed = self.load_shift(shift_id)?;
        Ok(AutoFillReport {
            shift_id: shift_id.clone(),
            assigned,
            skipped,
            state: CapacityLedger::state(&committed),
        })
    }

    // ==========================================
    // Read-only accessors (lock-free)
    // ==========================================

    /// Occupancy of the shift against its place capacity.
    pub fn occupancy(&self, shift_id: &ShiftId) -> EngineResult<Occupancy> {
        Ok(CapacityLedger::occupancy(&self.load_shift(shift_id)?))
    }

    /// Derived display state of the shift.
    pub fn state(&self, shift_id: &ShiftId) -> EngineResult<ShiftState> {
        Ok(CapacityLedger::state(&self.load_shift(shift_id)?))
    }

    /// Assignments the participant holds in the month.
    pub fn used(&self, participant_id: &ParticipantId, month: YearMonth) -> EngineResult<u32> {
        Ok(self.quota.used(participant_id, month)?)
    }

    /// Seats left under the participant's monthly cap (None = unlimited).
    pub fn remaining(
        &self,
        participant_id: &ParticipantId,
        month: YearMonth,
    ) -> EngineResult<Option<u32>> {
        let participant = self
            .repos
            .participant_repo
            .find_by_id(participant_id)?
            .ok_or_else(|| EngineError::ParticipantNotFound(participant_id.clone()))?;
        Ok(self.quota.remaining(&participant, month)?)
    }

    // ==========================================
    // Internals
    // ==========================================

    fn load_shift(&self, shift_id: &ShiftId) -> EngineResult<Shift> {
        self.repos
            .shift_repo
            .find_by_id(shift_id)?
            .ok_or_else(|| EngineError::ShiftNotFound(shift_id.clone()))
    }

    fn denial_to_error(participant_id: &ParticipantId, reason: DenialReason) -> EngineError {
        match reason {
            DenialReason::QuotaReached { quota } => EngineError::QuotaExceeded {
                participant_id: participant_id.clone(),
                quota,
            },
            DenialReason::ForbiddenPairing { blocked_by } => {
                EngineError::ForbiddenPairingPresent {
                    participant_id: participant_id.clone(),
                    blocked_by,
                }
            }
            other => EngineError::Unavailable {
                participant_id: participant_id.clone(),
                reason: other.to_string(),
            },
        }
    }

    /// Publish a domain event; failures are logged, never propagated,
    /// because the mutation is already committed.
    fn emit(&self, event: AssignmentEvent) {
        if let Err(err) = self.publisher.publish(event) {
            warn!(error = %err, "event publication failed");
        }
    }
}
