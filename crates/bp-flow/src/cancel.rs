//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag.  Clones observe the same flag.
///
/// The engine polls it before each origin and before each candidate
/// destination; a cancelled run returns [`FlowOutcome::Cancelled`] and
/// discards everything accumulated so far.
///
/// [`FlowOutcome::Cancelled`]: crate::FlowOutcome::Cancelled
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
