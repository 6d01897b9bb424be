//! Execution Globals
//!
//! The ambient bundle handed to every executed snippet: one [`SharedState`]
//! plus an optional logging sink. The bundle is fixed for the lifetime of an
//! engine; only the contents of the shared state evolve.

use crate::state::SharedState;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Fixed category under which script-originated log lines are emitted.
pub const SCRIPT_LOG_TARGET: &str = "script";

/// Destination for `log()` calls made from inside snippets.
///
/// The trait is the seam: production code uses [`TracingSink`], tests swap in
/// a recording implementation.
pub trait ScriptSink: Send + Sync {
    /// Deliver one message emitted by a script.
    fn emit(&self, message: &str);
}

/// Forwards script log lines to `tracing` under the
/// [`SCRIPT_LOG_TARGET`] target.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ScriptSink for TracingSink {
    fn emit(&self, message: &str) {
        info!(target: "script", "{message}");
    }
}

/// Ambient bindings for executed code.
///
/// Snippets see the shared state as the `state` constant and the sink through
/// the global `log(message)` function. The state reference never changes
/// after construction; `log` with no sink attached is a silent no-op.
#[derive(Clone)]
pub struct ScriptGlobals {
    state: SharedState,
    sink: Option<Arc<dyn ScriptSink>>,
}

impl ScriptGlobals {
    /// Bundle an existing store with an optional sink.
    pub fn new(state: SharedState, sink: Option<Arc<dyn ScriptSink>>) -> Self {
        Self { state, sink }
    }

    /// Fresh empty store, log lines forwarded to `tracing`.
    pub fn with_tracing() -> Self {
        Self::new(SharedState::new(), Some(Arc::new(TracingSink)))
    }

    /// Handle to the shared store.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Deliver a script-originated message to the sink, if one is attached.
    pub fn log(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.emit(message);
        }
    }
}

impl Default for ScriptGlobals {
    fn default() -> Self {
        Self::with_tracing()
    }
}

impl fmt::Debug for ScriptGlobals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptGlobals")
            .field("state", &self.state)
            .field("sink", &self.sink.as_ref().map(|_| "…"))
            .finish()
    }
}
