//! Store adapter error taxonomy.

use thiserror::Error;

/// Result type for store adapter operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by a store adapter (catalog or event store).
///
/// Keep this focused on adapter-boundary failures. Recoverable data
/// conditions (orphan references, bad quantities) are **not** errors: they
/// are accumulated into summaries/reports by the engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The adapter is unreachable. Fatal only before the first simulation
    /// tick; mid-run it feeds the bounded retry policy.
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// The caller-supplied adapter timeout elapsed.
    #[error("store call timed out: {0}")]
    Timeout(String),

    /// A write was rejected (malformed record, unknown session, ...).
    #[error("invalid store operation: {0}")]
    Invalid(String),

    /// A session outcome was already set; outcomes are terminal and
    /// transition at most once.
    #[error("session outcome already set: {0}")]
    OutcomeConflict(String),
}

impl StoreError {
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn outcome_conflict(msg: impl Into<String>) -> Self {
        Self::OutcomeConflict(msg.into())
    }

    /// Whether the simulation's bounded retry policy applies.
    ///
    /// Conflicts and invalid writes are deterministic; retrying them can
    /// never succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(StoreError::connectivity("down").is_retryable());
        assert!(StoreError::timeout("slow").is_retryable());
    }

    #[test]
    fn deterministic_errors_are_not_retryable() {
        assert!(!StoreError::invalid("bad record").is_retryable());
        assert!(!StoreError::outcome_conflict("already terminal").is_retryable());
    }
}
