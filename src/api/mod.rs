mod event_dispatch;
mod input_controller;
mod metric_catalog;
mod panel_config;
mod panel_init;
mod panel_view;
mod reload_controller;
mod selection_controller;
mod validation;

pub use event_dispatch::EventOutcome;
pub use input_controller::InputOutcome;
pub use metric_catalog::{
    CatalogEntities, CatalogResolution, FALLBACK_PALETTE, LineStyle, MetricCatalog,
};
pub use panel_config::TimelineConfig;
pub use panel_view::{
    BrushWindow, ChartView, PANEL_VIEW_JSON_SCHEMA_V1, PanelView, PanelViewJsonContractV1,
    brush_window,
};
pub use reload_controller::{ReloadOutcome, ReloadPayload, ReloadRequest, ReloadTrigger};
pub use selection_controller::{TickOutcome, TimerKind};

use crate::backend::StatisticsBackend;
use crate::core::{
    ColumnKey, DenseSeries, FilterState, Metric, SelectionModel, TimeSeriesNormalizer,
};
use crate::events::TimelineListener;
use crate::interaction::{InputAdapter, InputAttachment};

/// Whether any reload has completed and what it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
    Empty,
}

/// Headless timeline panel.
///
/// Owns the dense series, the selection model and the input adapter. The
/// statistics backend is the only I/O collaborator; timers are driven by the
/// host through [`TimelinePanel::tick`].
pub struct TimelinePanel<B: StatisticsBackend> {
    backend: B,
    config: TimelineConfig,
    metric: Metric,
    filters: FilterState,
    columns: Vec<ColumnKey>,
    catalog: MetricCatalog,
    normalizer: TimeSeriesNormalizer,
    series: Option<DenseSeries>,
    load_state: LoadState,
    selection: SelectionModel,
    input: InputAdapter,
    input_attachment: InputAttachment,
    listeners: Vec<Box<dyn TimelineListener>>,
    issued_generation: u64,
    applied_generation: u64,
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    #[must_use]
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Metric of the currently displayed series.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Columns of the currently displayed series.
    #[must_use]
    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    #[must_use]
    pub fn series(&self) -> Option<&DenseSeries> {
        self.series.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Generation of the last applied reload; `0` before the first one.
    #[must_use]
    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }
}
