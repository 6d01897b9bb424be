//! Script Engine
//!
//! Executes snippets of script source against a persistent, evolving chain of
//! execution state. Later snippets observe the variables and functions that
//! earlier snippets declared, until the chain is explicitly cleared. Every
//! call resolves to a [`ScriptResult`]; script-level faults never unwind out
//! of the engine.

mod chain;

use crate::cancel::CancelToken;
use crate::capability::{built_in, CapabilityModule, DEFAULT_IMPORTS};
use crate::globals::{ScriptGlobals, ScriptSink};
use crate::result::{FailureKind, ScriptResult};
use crate::state::{register_shared_state, SharedState};
use chain::ChainedState;
use rhai::packages::{CorePackage, Package, StandardPackage};
use rhai::{Dynamic, Engine};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine configuration.
///
/// Grows monotonically: imports and references can be appended but never
/// removed. Changes take effect on the next execution; already-chained state
/// is not restructured retroactively.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Register the baseline language library plus the built-in `json` and
    /// `time` namespaces, so trivial snippets work without explicit imports.
    pub default_imports: bool,
    /// Namespace names to expose to snippets. Resolved against references
    /// first, then the built-in registry, at the next execution.
    pub imports: Vec<String>,
    /// Capability modules resolvable by the imports above.
    pub references: Vec<CapabilityModule>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_imports: true,
            imports: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// Incremental script execution engine.
///
/// One engine hosts one logical execution stream: `execute_snippet` takes
/// `&mut self`, so interleaved calls against the same engine are
/// unrepresentable. Run one engine per session and issue calls sequentially.
/// The only resource shared beyond the engine is the [`SharedState`], whose
/// coordination contract is documented on the type itself.
pub struct ScriptEngine {
    globals: ScriptGlobals,
    options: EngineOptions,
    // Rebuilt lazily whenever options change; `None` marks it stale.
    runtime: Option<Engine>,
    chained: Option<ChainedState>,
}

impl ScriptEngine {
    /// Engine bound to the given globals for its whole lifetime.
    pub fn new(globals: ScriptGlobals, options: EngineOptions) -> Self {
        Self {
            globals,
            options,
            runtime: None,
            chained: None,
        }
    }

    /// Convenience: wrap a shared state and an optional sink into globals.
    pub fn with_state(
        state: SharedState,
        sink: Option<Arc<dyn ScriptSink>>,
        options: EngineOptions,
    ) -> Self {
        Self::new(ScriptGlobals::new(state, sink), options)
    }

    /// The globals bundle bound at construction.
    pub fn globals(&self) -> &ScriptGlobals {
        &self.globals
    }

    /// Current configuration.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Whether no chained state exists yet (before the first execution, or
    /// right after [`clear_state`](Self::clear_state)).
    pub fn is_fresh(&self) -> bool {
        self.chained.is_none()
    }

    /// Expose namespaces to snippets, starting with the next execution.
    ///
    /// Names are resolved then; a name that matches neither a reference nor a
    /// built-in module fails that execution at the compile stage.
    pub fn add_imports<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.imports.extend(names.into_iter().map(Into::into));
        self.runtime = None;
    }

    /// Make a capability module resolvable, starting with the next execution.
    ///
    /// Referencing alone does not expose the namespace; import its name to
    /// let snippets call into it.
    pub fn add_reference(&mut self, module: CapabilityModule) {
        self.options.references.push(module);
        self.runtime = None;
    }

    /// Discard the chained state; the next execution starts fresh.
    ///
    /// Options and globals are unaffected. Idempotent.
    pub fn clear_state(&mut self) {
        self.chained = None;
    }

    /// Compile and run one snippet, chained onto the state accumulated so
    /// far. The compile-and-run step runs on a blocking thread and is the
    /// call's single suspension point.
    pub async fn execute_snippet(&mut self, code: &str, cancel: &CancelToken) -> ScriptResult {
        let mut runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => match self.build_runtime() {
                Ok(runtime) => runtime,
                Err(message) => return ScriptResult::failure(FailureKind::Compile, message),
            },
        };

        let token = cancel.clone();
        runtime.on_progress(move |_| token.is_cancelled().then(|| Dynamic::UNIT));

        let state = self
            .chained
            .take()
            .unwrap_or_else(|| ChainedState::fresh(&self.globals));
        let code = code.to_string();
        debug!(target: "scripthost::engine", bytes = code.len(), "executing snippet");

        let handle =
            tokio::task::spawn_blocking(move || {
                let (state, result) = chain::advance(&runtime, state, &code);
                (runtime, state, result)
            });

        match handle.await {
            Ok((runtime, state, result)) => {
                self.runtime = Some(runtime);
                self.chained = Some(state);
                result
            }
            // A panicking evaluation forfeits the runtime and the chain;
            // both are rebuilt fresh on the next call.
            Err(err) => {
                warn!(target: "scripthost::engine", error = %err, "execution task failed");
                ScriptResult::failure(FailureKind::Runtime, format!("execution task failed: {err}"))
            }
        }
    }

    /// Read a script file and execute its contents as one snippet.
    ///
    /// A missing file fails before any read; chained state is untouched.
    pub async fn execute_file(
        &mut self,
        path: impl AsRef<Path>,
        cancel: &CancelToken,
    ) -> ScriptResult {
        let path = path.as_ref();
        if !path.exists() {
            return ScriptResult::failure(
                FailureKind::FileNotFound,
                format!("Script file not found: {}", path.display()),
            );
        }
        match tokio::fs::read_to_string(path).await {
            Ok(code) => self.execute_snippet(&code, cancel).await,
            Err(err) => ScriptResult::failure(
                FailureKind::Io,
                format!("Failed to read script file {}: {err}", path.display()),
            ),
        }
    }

    /// Assemble the script runtime from the current options.
    ///
    /// Returns the unresolved import names as an error message when any
    /// import matches neither a reference nor a built-in module.
    fn build_runtime(&self) -> Result<Engine, String> {
        let mut engine = Engine::new_raw();
        engine.register_global_module(CorePackage::new().as_shared_module());
        if self.options.default_imports {
            engine.register_global_module(StandardPackage::new().as_shared_module());
        }

        register_shared_state(&mut engine);
        let globals = self.globals.clone();
        engine.register_fn("log", move |message: &str| globals.log(message));

        let mut names: Vec<&str> = Vec::new();
        if self.options.default_imports {
            names.extend(DEFAULT_IMPORTS);
        }
        names.extend(self.options.imports.iter().map(String::as_str));

        let mut unresolved = Vec::new();
        for name in names {
            let module = self
                .options
                .references
                .iter()
                .find(|reference| reference.name() == name)
                .map(|reference| reference.module().clone())
                .or_else(|| built_in(name).map(|m| m.module().clone()));
            match module {
                Some(module) => {
                    engine.register_static_module(name, module);
                }
                None => unresolved.push(name.to_string()),
            }
        }

        if unresolved.is_empty() {
            Ok(engine)
        } else {
            Err(format!("unresolved imports: {}", unresolved.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Module;

    fn default_engine() -> ScriptEngine {
        ScriptEngine::new(
            ScriptGlobals::new(SharedState::new(), None),
            EngineOptions::default(),
        )
    }

    #[tokio::test]
    async fn snippets_chain_until_cleared() {
        let mut engine = default_engine();
        let cancel = CancelToken::new();

        let result = engine.execute_snippet("let a = 2 + 2; a", &cancel).await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 4);
        assert!(!engine.is_fresh());

        let result = engine.execute_snippet("a * 10", &cancel).await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 40);

        engine.clear_state();
        assert!(engine.is_fresh());
        let result = engine.execute_snippet("a", &cancel).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
    }

    #[tokio::test]
    async fn clear_state_is_idempotent() {
        let mut engine = default_engine();
        engine.clear_state();
        engine.clear_state();
        assert!(engine.is_fresh());
    }

    #[tokio::test]
    async fn default_imports_expose_builtin_namespaces() {
        let mut engine = default_engine();
        let cancel = CancelToken::new();

        let result = engine
            .execute_snippet(r#"json::stringify(#{a: 1})"#, &cancel)
            .await;
        assert_eq!(
            result.value().unwrap().clone().into_string().unwrap(),
            r#"{"a":1}"#
        );

        let result = engine.execute_snippet("time::now_millis() > 0", &cancel).await;
        assert!(result.value().unwrap().as_bool().unwrap());
    }

    #[tokio::test]
    async fn without_default_imports_builtins_are_absent() {
        let mut engine = ScriptEngine::new(
            ScriptGlobals::new(SharedState::new(), None),
            EngineOptions {
                default_imports: false,
                ..EngineOptions::default()
            },
        );
        let cancel = CancelToken::new();

        // Core language still works.
        let result = engine.execute_snippet("2 + 2", &cancel).await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 4);

        let result = engine
            .execute_snippet(r#"json::parse("{}")"#, &cancel)
            .await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn unresolved_import_fails_the_next_execution() {
        let mut engine = default_engine();
        let cancel = CancelToken::new();

        let result = engine.execute_snippet("let a = 1; a", &cancel).await;
        assert!(result.is_success());

        engine.add_imports(["no_such_namespace"]);
        let result = engine.execute_snippet("a", &cancel).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Compile));
        assert!(result.error().unwrap().contains("no_such_namespace"));
    }

    #[tokio::test]
    async fn referenced_module_requires_an_import_to_be_visible() {
        let mut module = Module::new();
        module.set_native_fn("triple", |n: rhai::INT| Ok(n * 3));

        let mut engine = default_engine();
        let cancel = CancelToken::new();
        engine.add_reference(CapabilityModule::new("mathx", module));

        let result = engine.execute_snippet("mathx::triple(7)", &cancel).await;
        assert!(!result.is_success());

        engine.add_imports(["mathx"]);
        let result = engine.execute_snippet("mathx::triple(7)", &cancel).await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 21);
    }

    #[tokio::test]
    async fn pre_cancelled_token_fails_without_state_change() {
        let mut engine = default_engine();
        let cancel = CancelToken::new();

        let result = engine.execute_snippet("let a = 1; a", &cancel).await;
        assert!(result.is_success());

        let cancelled = CancelToken::new();
        cancelled.cancel();
        let result = engine.execute_snippet("let b = 2; b", &cancelled).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));

        let result = engine.execute_snippet("a", &cancel).await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 1);
        let result = engine.execute_snippet("b", &cancel).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Runtime));
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_long_running_snippet() {
        let mut engine = default_engine();
        let cancel = CancelToken::new();

        let canceller = cancel.clone();
        let trigger = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            canceller.cancel();
        });

        let result = engine.execute_snippet("while true {}", &cancel).await;
        trigger.join().unwrap();
        assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(result.error(), Some("execution cancelled"));
    }

    #[tokio::test]
    async fn snippets_share_the_ambient_state_binding() {
        let state = SharedState::new();
        let mut engine = ScriptEngine::with_state(state.clone(), None, EngineOptions::default());
        let cancel = CancelToken::new();

        let result = engine
            .execute_snippet(r#"state.set("counter", 41)"#, &cancel)
            .await;
        assert!(result.is_success());
        assert_eq!(state.get("counter").unwrap().as_int().unwrap(), 41);

        // Host-side writes are visible to the next call without rebinding.
        state.set("counter", 1_i64);
        let result = engine
            .execute_snippet(r#"state.get("counter") + 1"#, &cancel)
            .await;
        assert_eq!(result.value().unwrap().as_int().unwrap(), 2);
    }
}
