//! Koan execution engine
//!
//! Sequential execution with per-case fault isolation.

mod runner;

pub use runner::{KoanRunner, RunFilter};
