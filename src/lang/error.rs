//! Faults raised while a koan body runs

use thiserror::Error;

use super::ValueKind;

/// Errors a koan body can raise; the runner reports them as `ERROR`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KoanError {
    #[error("record has no field '{0}'")]
    MissingField(String),

    #[error("'{0}' is not declared in any enclosing scope")]
    Undeclared(String),

    #[error("argument '{0}' was not supplied")]
    MissingArgument(String),

    #[error("function was invoked without a receiver")]
    MissingReceiver,

    #[error("cannot combine {left} and {right} with '+'")]
    TypeMismatch { left: ValueKind, right: ValueKind },
}
