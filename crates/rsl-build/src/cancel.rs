//! Cooperative cancellation for build runs
//!
//! The pipeline checks the token at stage boundaries and before dispatching
//! the shader-compile batch. External processes already in flight are not
//! killed; their results are discarded and the run ends as aborted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token that signals cancellation to a running build.
///
/// Cloning a token creates another handle to the same flag; calling
/// [`cancel()`](CancellationToken::cancel) on any clone affects all.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new token (not cancelled)
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_propagates_to_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
