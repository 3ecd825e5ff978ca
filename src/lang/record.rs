//! Records with function-valued fields

use std::collections::BTreeMap;

use super::{Args, Completion, Function, KoanError};

/// A record whose fields hold functions.
///
/// Calls go through [`invoke`](Record::invoke), which looks the field up at
/// call time, so reassigning a field changes which function runs.
#[derive(Clone, Debug, Default)]
pub struct Record {
    fields: BTreeMap<String, Function>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, function: Function) -> Self {
        self.set(name, function);
        self
    }

    /// Bind `name` to `function`, returning whatever was bound before
    pub fn set(&mut self, name: impl Into<String>, function: Function) -> Option<Function> {
        self.fields.insert(name.into(), function)
    }

    /// Call the function currently bound to `name`
    pub fn invoke(&self, name: &str, args: Args) -> Completion {
        self.fields
            .get(name)
            .ok_or_else(|| KoanError::MissingField(name.to_string()))?
            .call(args)
    }
}
