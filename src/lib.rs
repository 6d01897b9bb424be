//! Scripthost: Incremental Script Execution
//!
//! A host for executing snippets of script source against a persistent,
//! evolving execution state. Successive snippets chain onto prior results, a
//! shared key-value context is exposed to every execution, and each call
//! reports success or failure without ever corrupting the chain.

pub mod cancel;
pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod globals;
pub mod logging;
pub mod result;
pub mod state;

pub use cancel::CancelToken;
pub use capability::CapabilityModule;
pub use config::HostConfig;
pub use engine::{EngineOptions, ScriptEngine};
pub use error::HostError;
pub use globals::{ScriptGlobals, ScriptSink, TracingSink};
pub use result::{FailureKind, ScriptResult};
pub use state::SharedState;
