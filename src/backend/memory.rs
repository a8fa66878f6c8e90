use std::cell::RefCell;

use crate::backend::{RuleDescriptor, ServiceMap, StatisticsBackend, StatisticsQuery};
use crate::core::Sample;
use crate::error::{TimelineError, TimelineResult};

/// In-process backend used by tests and headless hosts.
///
/// Returns its configured data verbatim and records every statistics query so
/// callers can assert on column resolution.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    services: ServiceMap,
    rules: Vec<RuleDescriptor>,
    statistics: Vec<Sample>,
    failure: Option<String>,
    queries: RefCell<Vec<StatisticsQuery>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_services(mut self, services: ServiceMap) -> Self {
        self.services = services;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: Vec<RuleDescriptor>) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_statistics(mut self, samples: Vec<Sample>) -> Self {
        self.statistics = samples;
        self
    }

    pub fn set_services(&mut self, services: ServiceMap) {
        self.services = services;
    }

    pub fn set_rules(&mut self, rules: Vec<RuleDescriptor>) {
        self.rules = rules;
    }

    pub fn set_statistics(&mut self, samples: Vec<Sample>) {
        self.statistics = samples;
    }

    /// Makes every subsequent call fail with `message` until cleared.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    #[must_use]
    pub fn recorded_queries(&self) -> Vec<StatisticsQuery> {
        self.queries.borrow().clone()
    }

    fn check_failure(&self) -> TimelineResult<()> {
        match &self.failure {
            Some(message) => Err(TimelineError::Fetch(message.clone())),
            None => Ok(()),
        }
    }
}

impl StatisticsBackend for InMemoryBackend {
    fn services(&self) -> TimelineResult<ServiceMap> {
        self.check_failure()?;
        Ok(self.services.clone())
    }

    fn rules(&self) -> TimelineResult<Vec<RuleDescriptor>> {
        self.check_failure()?;
        Ok(self.rules.clone())
    }

    fn statistics(&self, query: &StatisticsQuery) -> TimelineResult<Vec<Sample>> {
        self.check_failure()?;
        self.queries.borrow_mut().push(query.clone());
        Ok(self.statistics.clone())
    }
}
