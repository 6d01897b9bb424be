//! Cooperative cancellation for in-flight executions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between a caller and a running execution.
///
/// Clones observe the same flag. The engine polls the token from the script
/// runtime's progress hook, so cancellation takes effect between script
/// operations rather than at an arbitrary instruction. A cancelled execution
/// reports a [`FailureKind::Cancelled`](crate::FailureKind::Cancelled)
/// outcome and leaves the chained state unchanged.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; already-finished executions are
    /// unaffected.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
