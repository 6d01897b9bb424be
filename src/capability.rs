//! Capability modules
//!
//! A capability module is a named unit of host-provided functionality that
//! snippets reach through a namespace import (`json::parse(..)`). Adding a
//! reference makes a module resolvable by name; importing that name exposes
//! it to snippets. The host ships a small built-in registry; callers
//! contribute their own modules through
//! [`EngineOptions`](crate::EngineOptions) or
//! [`ScriptEngine::add_reference`](crate::ScriptEngine::add_reference).

use rhai::{Dynamic, Module, Position, Shared, EvalAltResult, INT};

/// Import names resolved automatically when default imports are enabled.
pub(crate) const DEFAULT_IMPORTS: &[&str] = &["json", "time"];

/// A named script-callable module.
#[derive(Debug, Clone)]
pub struct CapabilityModule {
    name: String,
    module: Shared<Module>,
}

impl CapabilityModule {
    /// Wrap a module under the given namespace name.
    pub fn new(name: impl Into<String>, module: Module) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }

    /// Namespace name snippets use to reach the module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying shared module.
    pub fn module(&self) -> &Shared<Module> {
        &self.module
    }
}

/// Resolve a built-in module by import name.
pub(crate) fn built_in(name: &str) -> Option<CapabilityModule> {
    match name {
        "json" => Some(CapabilityModule::new("json", json_module())),
        "time" => Some(CapabilityModule::new("time", time_module())),
        _ => None,
    }
}

fn runtime_error(message: String) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(Dynamic::from(message), Position::NONE).into()
}

/// `json::parse(text)` / `json::stringify(value)` backed by serde_json.
fn json_module() -> Module {
    let mut module = Module::new();

    module.set_native_fn("parse", |text: &str| {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|err| runtime_error(format!("json::parse: {err}")))?;
        rhai::serde::to_dynamic(value)
    });

    module.set_native_fn("stringify", |value: Dynamic| {
        let json: serde_json::Value = rhai::serde::from_dynamic(&value)?;
        serde_json::to_string(&json)
            .map_err(|err| runtime_error(format!("json::stringify: {err}")))
    });

    module
}

/// `time::now_millis()` / `time::now_rfc3339()` backed by chrono.
fn time_module() -> Module {
    let mut module = Module::new();

    module.set_native_fn("now_millis", || {
        Ok(chrono::Utc::now().timestamp_millis() as INT)
    });

    module.set_native_fn("now_rfc3339", || Ok(chrono::Utc::now().to_rfc3339()));

    module
}
