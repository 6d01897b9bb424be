//! Chained execution state.
//!
//! The state after all snippets executed so far is an explicit value — a
//! variable scope plus the accumulated function declarations — threaded
//! through each evaluation step. A step that fails simply does not produce a
//! new value, so the previous state survives untouched; there is no partial
//! merge to undo.

use crate::globals::ScriptGlobals;
use crate::result::{FailureKind, ScriptResult};
use rhai::{Dynamic, Engine, EvalAltResult, Scope, AST};

/// Program state carried between executions: bound variables and every
/// function declared by earlier snippets.
pub(crate) struct ChainedState {
    scope: Scope<'static>,
    defs: AST,
}

impl ChainedState {
    /// Starting state for a fresh chain. The ambient `state` binding is
    /// installed here so it survives `clear_state` (which replaces the whole
    /// chain with a new fresh one).
    pub(crate) fn fresh(globals: &ScriptGlobals) -> Self {
        let mut scope = Scope::new();
        scope.push_constant("state", globals.state().clone());
        Self {
            scope,
            defs: AST::empty(),
        }
    }

    #[cfg(test)]
    pub(crate) fn scope(&self) -> &Scope<'static> {
        &self.scope
    }
}

/// Compile and run one snippet as a continuation of `state`.
///
/// Returns the state to carry forward together with the outcome:
/// - compile failure → input state returned unchanged;
/// - runtime failure or cancellation → input state returned unchanged (the
///   snippet evaluates against a snapshot of the scope, adopted only on
///   success, so no partial side effects leak into the chain);
/// - success → advanced state with the snippet's bindings and declarations.
pub(crate) fn advance(
    engine: &Engine,
    state: ChainedState,
    code: &str,
) -> (ChainedState, ScriptResult) {
    let ChainedState { scope, defs } = state;

    let snippet = match engine.compile_with_scope(&scope, code) {
        Ok(ast) => ast,
        Err(err) => {
            let result = ScriptResult::failure(FailureKind::Compile, err.to_string());
            return (ChainedState { scope, defs }, result);
        }
    };

    // `defs` holds declarations only, so the merged AST runs just the new
    // snippet's statements while keeping every earlier function callable.
    let run_ast = defs.merge(&snippet);

    let mut trial = scope.clone();
    match engine.eval_ast_with_scope::<Dynamic>(&mut trial, &run_ast) {
        Ok(value) => {
            let next = ChainedState {
                scope: trial,
                defs: run_ast.clone_functions_only(),
            };
            let value = if value.is_unit() { None } else { Some(value) };
            (next, ScriptResult::success(value))
        }
        Err(err) => {
            let result = match &*err {
                EvalAltResult::ErrorTerminated(..) => {
                    ScriptResult::failure(FailureKind::Cancelled, "execution cancelled")
                }
                other => ScriptResult::failure(FailureKind::Runtime, other.to_string()),
            };
            (ChainedState { scope, defs }, result)
        }
    }
}
