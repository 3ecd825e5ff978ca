//! Suite and case definitions

use std::fmt;
use std::sync::Arc;

use crate::assertion::Expect;
use crate::lang::Ambient;

/// Body of a case. `Err` or a panic counts as a fault.
pub type CaseBody = Arc<dyn Fn(&mut Expect) -> anyhow::Result<()> + Send + Sync>;

/// Suite-level setup, run once against the ambient registry
pub type SuiteSetup = Arc<dyn Fn(&Ambient) -> anyhow::Result<()> + Send + Sync>;

/// A named example with an executable body
#[derive(Clone)]
pub struct Case {
    name: String,
    body: CaseBody,
}

impl Case {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Expect) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &CaseBody {
        &self.body
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case").field("name", &self.name).finish()
    }
}

/// An ordered, named group of cases
#[derive(Clone)]
pub struct Suite {
    name: String,
    cases: Vec<Case>,
    setup: Option<SuiteSetup>,
}

impl Suite {
    pub fn new(name: impl Into<String>, cases: Vec<Case>) -> Self {
        Self {
            name: name.into(),
            cases,
            setup: None,
        }
    }

    /// Attach a hook that runs before the suite's first case
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&Ambient) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn setup(&self) -> Option<&SuiteSetup> {
        self.setup.as_ref()
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("cases", &self.cases)
            .field("setup", &self.setup.is_some())
            .finish()
    }
}
