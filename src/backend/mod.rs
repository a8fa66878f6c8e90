mod memory;
mod wire;

#[cfg(feature = "http-client")]
mod http;

pub use memory::InMemoryBackend;
pub use wire::{
    ColumnSelector, RuleDescriptor, ServiceDescriptor, ServiceMap, StatisticsQuery,
    decode_statistics,
};

#[cfg(feature = "http-client")]
pub use http::HttpBackend;

use crate::core::Sample;
use crate::error::TimelineResult;

/// Contract implemented by any monitoring API client.
///
/// Implementations only move data; column resolution, gap filling and error
/// policy live in the panel so every backend behaves the same.
pub trait StatisticsBackend {
    /// `GET /api/services`: port → service descriptor.
    fn services(&self) -> TimelineResult<ServiceMap>;

    /// `GET /api/rules`.
    fn rules(&self) -> TimelineResult<Vec<RuleDescriptor>>;

    /// `GET /api/statistics?...`, decoded into samples ordered by bucket.
    fn statistics(&self, query: &StatisticsQuery) -> TimelineResult<Vec<Sample>>;
}

impl<B: StatisticsBackend + ?Sized> StatisticsBackend for &B {
    fn services(&self) -> TimelineResult<ServiceMap> {
        (**self).services()
    }

    fn rules(&self) -> TimelineResult<Vec<RuleDescriptor>> {
        (**self).rules()
    }

    fn statistics(&self, query: &StatisticsQuery) -> TimelineResult<Vec<Sample>> {
        (**self).statistics(query)
    }
}
