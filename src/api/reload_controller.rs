use std::time::Instant;

use tracing::{debug, warn};

use crate::backend::StatisticsBackend;
use crate::core::{FilterState, Metric, Sample};
use crate::error::TimelineResult;
use crate::events::{Notification, TimelineEvent};

use super::{CatalogResolution, LoadState, MetricCatalog, TimelinePanel};

/// Why a reload was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Mount,
    MetricChanged,
    FiltersChanged,
    ServicesEdited,
    RulesChanged,
    CaptureCompleted,
    Manual,
}

/// Snapshot of what one reload must fetch.
///
/// Detached from the panel so the fetch can run wherever the host performs
/// I/O; the result comes back through [`TimelinePanel::complete_reload`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadRequest {
    generation: u64,
    trigger: ReloadTrigger,
    metric: Metric,
    filters: FilterState,
}

impl ReloadRequest {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn trigger(&self) -> ReloadTrigger {
        self.trigger
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Resolves the metric columns, then fetches the statistics for them.
    pub fn fetch<S: StatisticsBackend + ?Sized>(&self, backend: &S) -> TimelineResult<ReloadPayload> {
        let resolution = MetricCatalog::resolve(backend, self.metric, &self.filters)?;
        let samples = backend.statistics(&resolution.query)?;
        debug!(
            generation = self.generation,
            metric = %self.metric,
            sample_count = samples.len(),
            "fetched reload payload"
        );
        Ok(ReloadPayload {
            generation: self.generation,
            trigger: self.trigger,
            resolution,
            samples,
        })
    }
}

/// Fetched data for one reload generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadPayload {
    generation: u64,
    trigger: ReloadTrigger,
    resolution: CatalogResolution,
    samples: Vec<Sample>,
}

impl ReloadPayload {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn resolution(&self) -> &CatalogResolution {
        &self.resolution
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// Result of applying a reload payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Loaded { points: usize, span_capped: bool },
    /// The backend returned nothing usable; the panel shows "no data".
    Empty,
    /// A newer reload was issued after this one; nothing changed.
    Stale,
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    /// Issues the next reload generation for `metric` with the current filters.
    pub fn begin_reload(&mut self, metric: Metric, trigger: ReloadTrigger) -> ReloadRequest {
        self.issued_generation += 1;
        debug!(
            generation = self.issued_generation,
            %metric,
            ?trigger,
            "reload issued"
        );
        ReloadRequest {
            generation: self.issued_generation,
            trigger,
            metric,
            filters: self.filters.clone(),
        }
    }

    /// Applies a fetched payload unless a newer reload has been issued since.
    ///
    /// Series, columns, metric and entity cache are replaced together; the
    /// selection model re-derives bounds and view window from the new series.
    pub fn complete_reload(&mut self, payload: ReloadPayload, now: Instant) -> ReloadOutcome {
        if payload.generation != self.issued_generation {
            debug!(
                generation = payload.generation,
                newest = self.issued_generation,
                "discarding stale reload payload"
            );
            return ReloadOutcome::Stale;
        }

        let ReloadPayload {
            generation,
            trigger,
            resolution,
            samples,
        } = payload;
        let normalization = self
            .normalizer
            .normalize(&samples, &resolution.columns, now);

        self.applied_generation = generation;
        self.metric = resolution.metric;
        self.columns = resolution.columns;
        self.catalog.cache(resolution.entities);
        self.series = normalization.series;
        self.selection.load_series(self.series.as_ref());

        let outcome = match &self.series {
            Some(series) => {
                self.load_state = LoadState::Loaded;
                ReloadOutcome::Loaded {
                    points: series.len(),
                    span_capped: normalization.span_capped,
                }
            }
            None => {
                self.load_state = LoadState::Empty;
                ReloadOutcome::Empty
            }
        };
        debug!(
            generation,
            ?trigger,
            metric = %self.metric,
            ?outcome,
            "reload applied"
        );

        if normalization.span_notice_due {
            self.emit(TimelineEvent::Notifications(
                Notification::timeline_range_large(),
            ));
        }
        outcome
    }

    /// Reloads the current metric through the owned backend.
    ///
    /// On fetch failure the error is logged and returned; panel state is left
    /// as it was.
    pub fn reload(&mut self, trigger: ReloadTrigger, now: Instant) -> TimelineResult<ReloadOutcome> {
        let request = self.begin_reload(self.metric, trigger);
        self.run_reload(&request, now)
    }

    /// Initial load.
    pub fn mount(&mut self, now: Instant) -> TimelineResult<ReloadOutcome> {
        self.reload(ReloadTrigger::Mount, now)
    }

    /// Switches metric. The displayed metric only changes once its data
    /// arrives.
    pub fn set_metric(&mut self, metric: Metric, now: Instant) -> TimelineResult<ReloadOutcome> {
        let request = self.begin_reload(metric, ReloadTrigger::MetricChanged);
        self.run_reload(&request, now)
    }

    /// Replaces the filter state and reloads.
    pub fn set_filters(
        &mut self,
        filters: FilterState,
        now: Instant,
    ) -> TimelineResult<ReloadOutcome> {
        self.filters = filters;
        self.reload(ReloadTrigger::FiltersChanged, now)
    }

    fn run_reload(&mut self, request: &ReloadRequest, now: Instant) -> TimelineResult<ReloadOutcome> {
        match request.fetch(&self.backend) {
            Ok(payload) => Ok(self.complete_reload(payload, now)),
            Err(err) => {
                warn!(
                    generation = request.generation,
                    metric = %request.metric,
                    error = %err,
                    "reload aborted; keeping previous series"
                );
                Err(err)
            }
        }
    }
}
