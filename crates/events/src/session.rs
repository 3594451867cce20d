use serde::{Deserialize, Serialize};

use cyberday_core::{SessionId, Tick};

/// How a session ended.
///
/// Terminal by definition: a session's outcome is set at most once, and the
/// store rejects a second write ([`StoreError::OutcomeConflict`]).
///
/// [`StoreError::OutcomeConflict`]: cyberday_core::StoreError::OutcomeConflict
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    /// The session checked out.
    Purchased,
    /// The shopper walked away.
    Abandoned,
    /// Virtual time ran out before the session reached a decision.
    Expired,
    /// Writes for this session exhausted the bounded retry budget.
    Failed,
}

/// A shopping session.
///
/// Created by the simulation; immutable once an outcome is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub started_at: Tick,
    /// The category this shopper is browsing (weighted sample at spawn).
    pub affinity: String,
    pub outcome: Option<SessionOutcome>,
}

impl Session {
    pub fn open(id: SessionId, started_at: Tick, affinity: impl Into<String>) -> Self {
        Self {
            id,
            started_at,
            affinity: affinity.into(),
            outcome: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_session_has_no_outcome() {
        let s = Session::open(SessionId::new(), Tick(3), "Electronics");
        assert!(!s.is_terminal());
        assert_eq!(s.affinity, "Electronics");
        assert_eq!(s.started_at, Tick(3));
    }
}
