//! Cooperative cancellation signal shared across an engine operation.
//!
//! Every public engine operation accepts a [`CancellationToken`] and checks
//! it before each I/O step and at segment boundaries during decode/encode,
//! per the concurrency model's cancellation contract. A cancelled write
//! deletes its temp file; a cancelled restore follows the same rollback
//! path as a failed one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable flag. Clones share the same underlying cancellation
/// state, so cancelling one handle cancels every clone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`crate::Error::Cancelled`] if cancellation has been
    /// requested, otherwise `Ok(())`. Callers sprinkle this at I/O steps and
    /// segment boundaries.
    pub fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            Err(crate::Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
