//! Cooperative cancellation.
//!
//! The traversal polls its token between sibling declarations, so
//! cancellation is granular at AST-node boundaries and a cancelled run
//! leaves the observer with a partial graph the downstream discards.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheaply clonable cancellation token.
///
/// All clones share one flag; cancelling any of them cancels the run that
/// polls any other.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, un-cancelled token.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Requests cancellation.
    pub fn cancel(&self) { self.cancelled.store(true, Ordering::Relaxed); }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cancelled.load(Ordering::Relaxed) }
}
