//! Shared Context Store
//!
//! A string-keyed map of script values shared between the host and every
//! executing snippet. All clones of a [`SharedState`] are handles to the same
//! underlying map, so mutations made by a snippet are immediately visible to
//! the host and to subsequent executions.

use parking_lot::RwLock;
use rhai::{Array, Dynamic, Engine};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared key-value store passed into every execution.
///
/// The interior lock guarantees memory safety only. It does not serialize
/// logical access: a host-side read-modify-write racing a snippet's write is
/// the caller's problem to coordinate, exactly as it would be with any other
/// shared map. Callers running multiple engines against one store must
/// serialize their own compound operations.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    data: Arc<RwLock<HashMap<String, Dynamic>>>,
}

impl SharedState {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key. Returns `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<Dynamic> {
        self.data.read().get(key).cloned()
    }

    /// Insert or replace a value. Visible to every holder of this store
    /// immediately.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Dynamic>) {
        self.data.write().insert(key.into(), value.into());
    }

    /// Remove a key, returning its previous value if it was present.
    pub fn remove(&self, key: &str) -> Option<Dynamic> {
        self.data.write().remove(key)
    }

    /// Current key set. No ordering guarantee.
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

/// Register [`SharedState`] as a script-visible type.
///
/// Snippets see the store through the ambient `state` binding:
/// `state.set("k", 1)`, `state.get("k")`, `state.remove("k")`,
/// `state.keys()`, `state.contains("k")`, `state.len()`.
/// `get` yields unit for an absent key, matching script conventions.
pub(crate) fn register_shared_state(engine: &mut Engine) {
    engine
        .register_type_with_name::<SharedState>("SharedState")
        .register_fn("get", |state: &mut SharedState, key: &str| {
            state.get(key).unwrap_or(Dynamic::UNIT)
        })
        .register_fn("set", |state: &mut SharedState, key: &str, value: Dynamic| {
            state.set(key, value);
        })
        .register_fn("remove", |state: &mut SharedState, key: &str| {
            state.remove(key).unwrap_or(Dynamic::UNIT)
        })
        .register_fn("keys", |state: &mut SharedState| {
            state.keys().into_iter().map(Dynamic::from).collect::<Array>()
        })
        .register_fn("contains", |state: &mut SharedState, key: &str| {
            state.contains(key)
        })
        .register_fn("len", |state: &mut SharedState| state.len() as rhai::INT);
}
