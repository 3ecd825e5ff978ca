//! Explicit lexical scope chains

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{Ambient, KoanError, Value};

/// One frame in a scope chain.
///
/// A binding may be declared absent (`None`). It still shadows outer frames.
struct Frame {
    bindings: RefCell<HashMap<String, Option<Value>>>,
    parent: Option<Scope>,
    ambient: Option<Ambient>,
}

/// Handle to a scope frame. Clones share the frame.
#[derive(Clone)]
pub struct Scope {
    frame: Rc<Frame>,
}

impl Scope {
    /// Top-level scope with no ambient fallback
    pub fn root() -> Self {
        Self::new(None, None)
    }

    /// Top-level scope that falls back to `ambient` for unbound names
    pub fn with_ambient(ambient: Ambient) -> Self {
        Self::new(None, Some(ambient))
    }

    fn new(parent: Option<Scope>, ambient: Option<Ambient>) -> Self {
        Self {
            frame: Rc::new(Frame {
                bindings: RefCell::new(HashMap::new()),
                parent,
                ambient,
            }),
        }
    }

    /// New frame nested inside this one
    pub fn child(&self) -> Self {
        Self::new(Some(self.clone()), None)
    }

    /// Declare `name` in this frame, shadowing any outer binding
    pub fn declare(&self, name: &str, value: impl Into<Value>) {
        self.frame
            .bindings
            .borrow_mut()
            .insert(name.to_string(), Some(value.into()));
    }

    /// Declare `name` in this frame without a value
    pub fn declare_absent(&self, name: &str) {
        self.frame.bindings.borrow_mut().insert(name.to_string(), None);
    }

    /// Overwrite the nearest existing binding of `name`.
    ///
    /// Assigning a name no frame declares is a fault. Ambient entries are
    /// written through [`Ambient::set`], never implicitly.
    pub fn assign(&self, name: &str, value: impl Into<Value>) -> Result<(), KoanError> {
        let mut current = Some(self);
        while let Some(scope) = current {
            let mut bindings = scope.frame.bindings.borrow_mut();
            if let Some(slot) = bindings.get_mut(name) {
                *slot = Some(value.into());
                return Ok(());
            }
            drop(bindings);
            current = scope.frame.parent.as_ref();
        }
        Err(KoanError::Undeclared(name.to_string()))
    }

    /// Resolve `name` from this frame outwards, then the ambient registry.
    /// `None` is the absent sentinel.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(binding) = scope.frame.bindings.borrow().get(name) {
                return binding.clone();
            }
            if scope.frame.parent.is_none() {
                return scope.frame.ambient.as_ref().and_then(|a| a.get(name));
            }
            current = scope.frame.parent.as_ref();
        }
        None
    }

    /// Like [`lookup`](Self::lookup), but only declared names resolve.
    /// A name declared absent resolves to a fault as well.
    pub fn resolve(&self, name: &str) -> Result<Value, KoanError> {
        self.lookup(name)
            .ok_or_else(|| KoanError::Undeclared(name.to_string()))
    }

    /// Whether `name` is declared in this frame itself
    pub fn declares(&self, name: &str) -> bool {
        self.frame.bindings.borrow().contains_key(name)
    }

    /// Run `body` in a private child frame that is discarded afterwards.
    pub fn enter<R>(&self, body: impl FnOnce(&Scope) -> R) -> R {
        let private = self.child();
        body(&private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_declaration_shadows_only_inside() {
        let outer = Scope::root();
        outer.declare("message", "Outer");

        let seen = outer.enter(|inner| {
            inner.declare("message", "Inner");
            inner.lookup("message")
        });

        assert_eq!(seen, Some(Value::from("Inner")));
        assert_eq!(outer.lookup("message"), Some(Value::from("Outer")));
    }

    #[test]
    fn test_private_frame_bindings_vanish() {
        let outer = Scope::root();
        outer.declare("outerVariable", "outer");
        outer.enter(|inner| {
            inner.declare("innerVariable", "inner");
            assert_eq!(inner.lookup("outerVariable"), Some(Value::from("outer")));
        });
        assert_eq!(outer.lookup("innerVariable"), None);
        assert!(outer.resolve("innerVariable").is_err());
    }

    #[test]
    fn test_assign_walks_to_nearest_binding() {
        let outer = Scope::root();
        outer.declare("result", "a");
        let inner = outer.child();
        inner.assign("result", "b").unwrap();

        assert!(!inner.declares("result"));
        assert_eq!(outer.lookup("result"), Some(Value::from("b")));
        assert_eq!(
            inner.assign("missing", 1),
            Err(KoanError::Undeclared("missing".to_string()))
        );
    }

    #[test]
    fn test_ambient_fallback_from_nested_frames() {
        let ambient = Ambient::new();
        ambient.set("thisIsAGlobalVariable", 77);
        let root = Scope::with_ambient(ambient);

        let seen = root.enter(|a| a.enter(|b| b.lookup("thisIsAGlobalVariable")));
        assert_eq!(seen, Some(Value::from(77)));
    }

    #[test]
    fn test_absent_declaration_shadows_ambient() {
        let ambient = Ambient::new();
        ambient.set("x", 1);
        let root = Scope::with_ambient(ambient);
        root.declare_absent("x");
        assert_eq!(root.lookup("x"), None);
    }
}
