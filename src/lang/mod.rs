//! Runtime values used by the koans
//!
//! Rust closures already capture lexically, so most koans use them directly.
//! This module covers what the koans need on top of that: absent arguments,
//! variadic calls, receiver substitution, late-bound record fields, explicit
//! scope chains and the ambient registry.

mod ambient;
mod error;
mod function;
mod record;
mod scope;
mod value;

pub use ambient::Ambient;
pub use error::KoanError;
pub use function::{Args, Completion, Function};
pub use record::Record;
pub use scope::Scope;
pub use value::{Value, ValueKind};
