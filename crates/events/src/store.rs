use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cyberday_core::{SessionId, StoreResult, Tick, Ttl};

use crate::event::CartEvent;
use crate::session::{Session, SessionOutcome};

/// One consistent point-in-time view of the event store.
///
/// Everything the reconciler will ever see from this store comes out of a
/// single `get_all_active` call; expiry between two reads can therefore
/// never double-count or half-count a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub sessions: Vec<Session>,
    pub events: Vec<CartEvent>,
}

impl ActiveSnapshot {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.events.is_empty()
    }
}

/// Append-oriented event store with per-record TTL.
///
/// ## Design principles
///
/// - **No storage assumptions**: works for the in-memory adapter here and
///   for an external TTL store (Redis-style expiry) alike.
/// - **Store-managed expiry**: records written with a TTL become invisible
///   to reads once it elapses; engines never delete anything themselves.
/// - **Append-only events**: cart events are immutable facts; the only
///   mutation the store accepts is the one-shot session outcome.
///
/// ## Visibility
///
/// A record written at tick `t` with TTL `d` is visible to
/// `get_all_active(as_of)` iff `as_of < t + d`.
///
/// ## Timeouts
///
/// Adapter timeouts are caller-supplied at adapter construction and surface
/// as `StoreError::Timeout`; the simulation retries them with its bounded
/// policy, the reconciler fails the whole call.
pub trait EventStore: Send + Sync {
    /// Record a newly spawned session with its record TTL.
    fn begin_session(&self, session: Session, ttl: Ttl) -> StoreResult<()>;

    /// Append one cart event with its record TTL.
    ///
    /// Implementations must reject non-monotonic sequence numbers within a
    /// session stream.
    fn append_event(&self, event: CartEvent, ttl: Ttl) -> StoreResult<()>;

    /// Record the terminal outcome for a session.
    ///
    /// Outcomes transition at most once; a second write is an
    /// `OutcomeConflict`.
    fn set_session_outcome(&self, session_id: SessionId, outcome: SessionOutcome) -> StoreResult<()>;

    /// Read all sessions and events still visible at `as_of`, in one call.
    fn get_all_active(&self, as_of: Tick) -> StoreResult<ActiveSnapshot>;
}

impl<S> EventStore for &S
where
    S: EventStore + ?Sized,
{
    fn begin_session(&self, session: Session, ttl: Ttl) -> StoreResult<()> {
        (**self).begin_session(session, ttl)
    }

    fn append_event(&self, event: CartEvent, ttl: Ttl) -> StoreResult<()> {
        (**self).append_event(event, ttl)
    }

    fn set_session_outcome(&self, session_id: SessionId, outcome: SessionOutcome) -> StoreResult<()> {
        (**self).set_session_outcome(session_id, outcome)
    }

    fn get_all_active(&self, as_of: Tick) -> StoreResult<ActiveSnapshot> {
        (**self).get_all_active(as_of)
    }
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn begin_session(&self, session: Session, ttl: Ttl) -> StoreResult<()> {
        (**self).begin_session(session, ttl)
    }

    fn append_event(&self, event: CartEvent, ttl: Ttl) -> StoreResult<()> {
        (**self).append_event(event, ttl)
    }

    fn set_session_outcome(&self, session_id: SessionId, outcome: SessionOutcome) -> StoreResult<()> {
        (**self).set_session_outcome(session_id, outcome)
    }

    fn get_all_active(&self, as_of: Tick) -> StoreResult<ActiveSnapshot> {
        (**self).get_all_active(as_of)
    }
}
