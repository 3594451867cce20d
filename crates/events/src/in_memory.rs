use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use cyberday_core::{SessionId, StoreError, StoreResult, Tick, Ttl};

use crate::event::CartEvent;
use crate::session::{Session, SessionOutcome};
use crate::store::{ActiveSnapshot, EventStore};

#[derive(Debug, Clone)]
struct SessionRecord {
    session: Session,
    expires_at: Tick,
}

#[derive(Debug, Clone)]
struct EventRecord {
    event: CartEvent,
    expires_at: Tick,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, SessionRecord>,
    /// Per-session event streams, append-only.
    streams: HashMap<SessionId, Vec<EventRecord>>,
}

/// In-memory TTL event store.
///
/// Reference implementation of the adapter contract (tests, local runs).
/// Expiry is evaluated lazily on read against the caller's `as_of` tick, so
/// the same store can serve reads at different points in virtual time.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: RwLock<Inner>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn begin_session(&self, session: Session, ttl: Ttl) -> StoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::invalid("event store lock poisoned"))?;

        if inner.sessions.contains_key(&session.id) {
            return Err(StoreError::invalid(format!(
                "session {} already exists",
                session.id
            )));
        }

        let expires_at = ttl.expires_at(session.started_at);
        inner.sessions.insert(
            session.id,
            SessionRecord {
                session,
                expires_at,
            },
        );
        Ok(())
    }

    fn append_event(&self, event: CartEvent, ttl: Ttl) -> StoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::invalid("event store lock poisoned"))?;

        let stream = inner.streams.entry(event.session_id).or_default();

        // Sequence numbers are monotonic per session stream.
        let last = stream.last().map(|r| r.event.sequence).unwrap_or(0);
        if event.sequence <= last {
            return Err(StoreError::invalid(format!(
                "non-monotonic sequence for session {} (last={last}, found={})",
                event.session_id, event.sequence
            )));
        }

        let expires_at = ttl.expires_at(event.at);
        stream.push(EventRecord { event, expires_at });
        Ok(())
    }

    fn set_session_outcome(&self, session_id: SessionId, outcome: SessionOutcome) -> StoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::invalid("event store lock poisoned"))?;

        let record = inner.sessions.get_mut(&session_id).ok_or_else(|| {
            StoreError::invalid(format!("unknown session {session_id}"))
        })?;

        if record.session.is_terminal() {
            return Err(StoreError::outcome_conflict(format!(
                "session {session_id} already {:?}",
                record.session.outcome
            )));
        }

        record.session.outcome = Some(outcome);
        Ok(())
    }

    fn get_all_active(&self, as_of: Tick) -> StoreResult<ActiveSnapshot> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::invalid("event store lock poisoned"))?;

        let mut sessions: Vec<Session> = inner
            .sessions
            .values()
            .filter(|r| as_of < r.expires_at)
            .map(|r| r.session.clone())
            .collect();

        let mut events: Vec<CartEvent> = inner
            .streams
            .values()
            .flatten()
            .filter(|r| as_of < r.expires_at)
            .map(|r| r.event.clone())
            .collect();

        // Deterministic snapshot order regardless of map iteration.
        sessions.sort_by(|a, b| (a.started_at, a.id).cmp(&(b.started_at, b.id)));
        events.sort_by(|a, b| {
            (a.at, a.session_id, a.sequence).cmp(&(b.at, b.session_id, b.sequence))
        });

        debug!(
            as_of = as_of.value(),
            sessions = sessions.len(),
            events = events.len(),
            "event store snapshot"
        );

        Ok(ActiveSnapshot { sessions, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use cyberday_core::{CartEventId, ProductId};

    fn session_at(tick: u64) -> Session {
        Session::open(SessionId::new(), Tick(tick), "Electronics")
    }

    fn event(session_id: SessionId, id: u64, sequence: u32, at: u64) -> CartEvent {
        CartEvent {
            id: CartEventId::new(id),
            session_id,
            sequence,
            product_id: ProductId::new("P1"),
            kind: EventKind::Add,
            quantity: 1,
            at: Tick(at),
        }
    }

    #[test]
    fn expired_records_are_invisible() {
        let store = InMemoryEventStore::new();
        let session = session_at(0);
        let sid = session.id;
        store.begin_session(session, Ttl::ticks(100)).unwrap();
        store.append_event(event(sid, 1, 1, 0), Ttl::ticks(5)).unwrap();

        let before = store.get_all_active(Tick(4)).unwrap();
        assert_eq!(before.events.len(), 1);

        // Visibility ends exactly at written_at + ttl.
        let at_boundary = store.get_all_active(Tick(5)).unwrap();
        assert!(at_boundary.events.is_empty());
        assert_eq!(at_boundary.sessions.len(), 1);
    }

    #[test]
    fn sessions_expire_independently_of_their_events() {
        let store = InMemoryEventStore::new();
        let session = session_at(0);
        let sid = session.id;
        store.begin_session(session, Ttl::ticks(3)).unwrap();
        store.append_event(event(sid, 1, 1, 0), Ttl::ticks(50)).unwrap();

        // Session record gone, events dangling: the reconciler's case.
        let snap = store.get_all_active(Tick(10)).unwrap();
        assert!(snap.sessions.is_empty());
        assert_eq!(snap.events.len(), 1);
    }

    #[test]
    fn outcome_is_set_at_most_once() {
        let store = InMemoryEventStore::new();
        let session = session_at(0);
        let sid = session.id;
        store.begin_session(session, Ttl::ticks(100)).unwrap();

        store.set_session_outcome(sid, SessionOutcome::Purchased).unwrap();
        let err = store
            .set_session_outcome(sid, SessionOutcome::Abandoned)
            .unwrap_err();
        assert!(matches!(err, StoreError::OutcomeConflict(_)));

        let snap = store.get_all_active(Tick(0)).unwrap();
        assert_eq!(snap.sessions[0].outcome, Some(SessionOutcome::Purchased));
    }

    #[test]
    fn rejects_non_monotonic_sequences() {
        let store = InMemoryEventStore::new();
        let session = session_at(0);
        let sid = session.id;
        store.begin_session(session, Ttl::ticks(100)).unwrap();

        store.append_event(event(sid, 1, 1, 0), Ttl::ticks(10)).unwrap();
        store.append_event(event(sid, 2, 2, 1), Ttl::ticks(10)).unwrap();
        let err = store
            .append_event(event(sid, 3, 2, 2), Ttl::ticks(10))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn snapshot_order_is_deterministic() {
        let store = InMemoryEventStore::new();
        for tick in [5u64, 1, 3] {
            store.begin_session(session_at(tick), Ttl::ticks(100)).unwrap();
        }

        let snap = store.get_all_active(Tick(6)).unwrap();
        let starts: Vec<u64> = snap.sessions.iter().map(|s| s.started_at.value()).collect();
        assert_eq!(starts, vec![1, 3, 5]);
    }

    #[test]
    fn outcome_write_to_unknown_session_is_invalid() {
        let store = InMemoryEventStore::new();
        let err = store
            .set_session_outcome(SessionId::new(), SessionOutcome::Abandoned)
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }
}
