//! Data models for koan execution
//!
//! Suites and cases describe what to run; outcomes and reports describe
//! what happened.

mod outcome;
mod suite;

pub use outcome::{AssertionOutcome, CaseResult, CaseStatus, RunReport, SuiteReport};
pub use suite::{Case, Suite};
