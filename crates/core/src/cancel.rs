//! Cooperative cancellation for long-running engine loops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation signal checked once per simulation tick.
///
/// Cloning shares the flag; any clone can cancel. Cancellation is a request,
/// not an abort: the engine finishes the current tick, leaves written events
/// intact, and returns a partial summary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_signal() {
        let token = CancelToken::new();
        let peer = token.clone();
        assert!(!peer.is_cancelled());
        token.cancel();
        assert!(peer.is_cancelled());
    }
}
