//! Process-wide variable registry
//!
//! Stands in for variables assigned without a declaration. The runner owns
//! one instance: it is cleared when a run starts, filled by suite setup
//! hooks, and cleared again when the run ends.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Value;

/// Shared, named slots. Clones share storage.
#[derive(Clone, Debug, Default)]
pub struct Ambient {
    slots: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl Ambient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `name`, returning the previous value
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Drop every slot
    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
