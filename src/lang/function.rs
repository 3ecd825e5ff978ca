//! First-class function values
//!
//! A [`Function`] declares named parameters but accepts any number of
//! arguments. Extra arguments are still reachable through [`Args`], and
//! missing ones read as absent (`None`).

use std::fmt;
use std::rc::Rc;

use super::{KoanError, Scope, Value};

/// What a call produces: a value, nothing, or a fault
pub type Completion = Result<Option<Value>, KoanError>;

type Body = dyn Fn(&Invocation<'_>) -> Completion;

/// Build [`Args`] from a list of anything convertible into [`Value`].
#[macro_export]
macro_rules! args {
    () => {
        $crate::lang::Args::empty()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::lang::Args::new(vec![$($crate::lang::Value::from($arg)),+])
    };
}

/// Ordered call arguments
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Argument at `index`, or `None` when the caller did not supply it
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Arguments from `from` onwards; empty when there are fewer
    pub fn rest(&self, from: usize) -> &[Value] {
        self.values.get(from..).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// A single call in progress, handed to the function body
pub struct Invocation<'a> {
    params: &'a [String],
    receiver: Option<&'a Value>,
    args: &'a Args,
}

impl<'a> Invocation<'a> {
    /// The receiver, as a fault when the caller did not supply one
    pub fn this(&self) -> Result<&'a Value, KoanError> {
        self.receiver.ok_or(KoanError::MissingReceiver)
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// Argument bound to a declared parameter; `None` if it was not passed
    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.params
            .iter()
            .position(|p| p == name)
            .and_then(|index| self.args.get(index))
    }

    /// Like [`param`](Self::param), but a missing argument is a fault
    pub fn require(&self, name: &str) -> Result<&'a Value, KoanError> {
        self.param(name)
            .ok_or_else(|| KoanError::MissingArgument(name.to_string()))
    }

    pub fn args(&self) -> &'a Args {
        self.args
    }
}

/// A function value. Cloning shares the body.
#[derive(Clone)]
pub struct Function {
    name: Option<String>,
    params: Rc<[String]>,
    body: Rc<Body>,
}

impl Function {
    /// Create a function with the given parameter names
    pub fn new<F>(params: &[&str], body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Completion + 'static,
    {
        Self {
            name: None,
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Rc::new(body),
        }
    }

    /// Create a function that closes over `scope`.
    ///
    /// Each call runs in a fresh frame whose parent is `scope`, the defining
    /// scope, with every parameter declared in it. Missing arguments are
    /// declared absent so they still shadow outer bindings.
    pub fn closure<F>(scope: &Scope, params: &[&str], body: F) -> Self
    where
        F: Fn(&Scope, &Invocation<'_>) -> Completion + 'static,
    {
        let definition = scope.clone();
        Self::new(params, move |invocation| {
            let frame = definition.child();
            for (index, param) in invocation.params.iter().enumerate() {
                match invocation.arg(index) {
                    Some(value) => frame.declare(param, value.clone()),
                    None => frame.declare_absent(param),
                }
            }
            body(&frame, invocation)
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Plain call, no receiver
    pub fn call(&self, args: Args) -> Completion {
        self.invoke(None, &args)
    }

    /// Call with `receiver` standing in for the implicit context, arguments
    /// listed individually
    pub fn call_with(&self, receiver: impl Into<Value>, args: Args) -> Completion {
        let receiver = receiver.into();
        self.invoke(Some(&receiver), &args)
    }

    /// Call with `receiver` standing in for the implicit context, arguments
    /// supplied as one ordered sequence
    pub fn apply(&self, receiver: impl Into<Value>, args: Vec<Value>) -> Completion {
        let receiver = receiver.into();
        self.invoke(Some(&receiver), &Args::from(args))
    }

    fn invoke(&self, receiver: Option<&Value>, args: &Args) -> Completion {
        let invocation = Invocation {
            params: &self.params[..],
            receiver,
            args,
        };
        (self.body)(&invocation)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name.as_deref().unwrap_or("<anonymous>"))
            .field("params", &self.params)
            .finish()
    }
}
