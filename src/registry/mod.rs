//! Suite registration
//!
//! Structural mistakes are rejected here, before anything runs.

use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::models::Suite;

/// Registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("suite name must not be empty")]
    EmptySuiteName,

    #[error("suite '{0}' is already registered")]
    DuplicateSuite(String),

    #[error("suite '{0}' has no cases")]
    EmptySuite(String),

    #[error("suite '{suite}' contains a case with an empty name")]
    EmptyCaseName { suite: String },

    #[error("suite '{suite}' registers case '{case}' more than once")]
    DuplicateCase { suite: String, case: String },
}

/// Registered suites, in registration order
#[derive(Clone, Debug, Default)]
pub struct SuiteRegistry {
    suites: Vec<Suite>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `suite` and append it
    pub fn register_suite(&mut self, suite: Suite) -> Result<(), RegistrationError> {
        let name = suite.name().trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptySuiteName);
        }
        if self.find(name).is_some() {
            return Err(RegistrationError::DuplicateSuite(name.to_string()));
        }
        if suite.cases().is_empty() {
            return Err(RegistrationError::EmptySuite(name.to_string()));
        }

        let mut seen = HashSet::new();
        for case in suite.cases() {
            if case.name().trim().is_empty() {
                return Err(RegistrationError::EmptyCaseName {
                    suite: name.to_string(),
                });
            }
            if !seen.insert(case.name()) {
                return Err(RegistrationError::DuplicateCase {
                    suite: name.to_string(),
                    case: case.name().to_string(),
                });
            }
        }

        debug!(
            "Registered suite '{}' with {} cases",
            name,
            suite.cases().len()
        );
        self.suites.push(suite);
        Ok(())
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn find(&self, name: &str) -> Option<&Suite> {
        self.suites.iter().find(|s| s.name().trim() == name)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Total number of cases across all suites
    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|s| s.cases().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Case;

    fn case(name: &str) -> Case {
        Case::new(name, |expect| {
            expect.equal(1, 1);
            Ok(())
        })
    }

    #[test]
    fn test_registration_keeps_order() {
        let mut registry = SuiteRegistry::new();
        registry
            .register_suite(Suite::new("first", vec![case("a"), case("b")]))
            .unwrap();
        registry
            .register_suite(Suite::new("second", vec![case("a")]))
            .unwrap();

        let names: Vec<_> = registry.suites().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(registry.case_count(), 3);
    }

    #[test]
    fn test_duplicate_case_rejected() {
        let mut registry = SuiteRegistry::new();
        let err = registry
            .register_suite(Suite::new("suite", vec![case("same"), case("same")]))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateCase {
                suite: "suite".to_string(),
                case: "same".to_string()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut registry = SuiteRegistry::new();
        assert_eq!(
            registry.register_suite(Suite::new("  ", vec![case("a")])),
            Err(RegistrationError::EmptySuiteName)
        );
        assert_eq!(
            registry.register_suite(Suite::new("s", vec![case("")])),
            Err(RegistrationError::EmptyCaseName {
                suite: "s".to_string()
            })
        );
        assert_eq!(
            registry.register_suite(Suite::new("s", Vec::new())),
            Err(RegistrationError::EmptySuite("s".to_string()))
        );
    }

    #[test]
    fn test_duplicate_suite_rejected() {
        let mut registry = SuiteRegistry::new();
        registry
            .register_suite(Suite::new("s", vec![case("a")]))
            .unwrap();
        assert_eq!(
            registry.register_suite(Suite::new("s", vec![case("b")])),
            Err(RegistrationError::DuplicateSuite("s".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }
}
