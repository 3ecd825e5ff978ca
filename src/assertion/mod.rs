//! Assertion engine
//!
//! Every check made through [`Expect`] is recorded, pass or fail, and never
//! stops the case early. Outcomes go to a shared [`OutcomeLog`], so the
//! runner keeps the ones recorded before a panic or a timeout.

use std::fmt::Debug;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use crate::lang::{Ambient, Value, ValueKind};
use crate::models::AssertionOutcome;

/// Append-only list of outcomes shared between a case and the runner
#[derive(Clone, Debug, Default)]
pub struct OutcomeLog {
    entries: Arc<Mutex<Vec<AssertionOutcome>>>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: AssertionOutcome) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<AssertionOutcome> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Assertion context handed to each case body
pub struct Expect {
    log: OutcomeLog,
    ambient: Ambient,
}

impl Expect {
    pub fn new(log: OutcomeLog, ambient: Ambient) -> Self {
        Self { log, ambient }
    }

    /// The runner's ambient registry
    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }

    /// Deep value equality
    #[track_caller]
    pub fn equal<T>(&mut self, actual: T, expected: T) -> bool
    where
        T: PartialEq + Debug,
    {
        let passed = actual == expected;
        self.record(
            Location::caller(),
            passed,
            format!("{expected:?}"),
            format!("{actual:?}"),
        )
    }

    /// A call returned `expected`. An absent return never matches.
    #[track_caller]
    pub fn returns(&mut self, actual: Option<Value>, expected: impl Into<Value>) -> bool {
        let expected = expected.into();
        let passed = actual.as_ref() == Some(&expected);
        self.record(
            Location::caller(),
            passed,
            format!("{expected:?}"),
            describe(actual.as_ref()),
        )
    }

    /// The value is the absent sentinel
    #[track_caller]
    pub fn absent<T: Debug>(&mut self, actual: &Option<T>) -> bool {
        let found = match actual {
            Some(value) => format!("{value:?}"),
            None => "absent".to_string(),
        };
        self.record(
            Location::caller(),
            actual.is_none(),
            "absent".to_string(),
            found,
        )
    }

    /// The value is present, whatever it is
    #[track_caller]
    pub fn present<T: Debug>(&mut self, actual: &Option<T>) -> bool {
        self.record(
            Location::caller(),
            actual.is_some(),
            "a value".to_string(),
            if actual.is_some() { "a value" } else { "absent" }.to_string(),
        )
    }

    /// The value (or its absence) has the given kind
    #[track_caller]
    pub fn kind_of(&mut self, actual: Option<&Value>, expected: ValueKind) -> bool {
        let found = ValueKind::of(actual);
        self.record(
            Location::caller(),
            found == expected,
            expected.to_string(),
            found.to_string(),
        )
    }

    /// A free-form condition holds
    #[track_caller]
    pub fn truthy(&mut self, condition: bool, description: &str) -> bool {
        self.record(
            Location::caller(),
            condition,
            description.to_string(),
            if condition { description.to_string() } else { "false".to_string() },
        )
    }

    fn record(
        &mut self,
        location: &Location<'_>,
        passed: bool,
        expected: String,
        actual: String,
    ) -> bool {
        let index = self.log.len() + 1;
        let location = format!("{}:{}", location.file(), location.line());
        self.log
            .push(AssertionOutcome::pending(index, location).resolve(passed, expected, actual));
        passed
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(value) => format!("{value:?}"),
        None => "absent".to_string(),
    }
}
