//! Koan suites
//!
//! ## Suites
//!
//! ### About Functions
//! - Declaring functions
//! - Inner declarations shadowing outer ones
//! - Lexical scoping
//! - Function factories
//! - Extra and missing arguments
//! - Functions as record fields
//!
//! ### About Functions And Closure
//! - Closures over mutable bindings
//! - Self-invoking private scopes
//! - Variadic arguments
//! - Receiver substitution, listed and sequenced
//!
//! ### About Scope
//! - Ambient variables
//! - Function-private declarations

mod closures;
mod functions;
mod scope;

use crate::registry::{RegistrationError, SuiteRegistry};

/// Register every suite, in teaching order
pub fn registry() -> Result<SuiteRegistry, RegistrationError> {
    let mut registry = SuiteRegistry::new();
    registry.register_suite(functions::suite())?;
    registry.register_suite(closures::suite())?;
    registry.register_suite(scope::suite())?;
    Ok(registry)
}
