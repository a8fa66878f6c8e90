use tracing::debug;

use crate::backend::StatisticsBackend;
use crate::core::{SelectionModel, TimeSeriesNormalizer};
use crate::error::TimelineResult;
use crate::interaction::{InputAdapter, InputAttachment};

use super::{LoadState, MetricCatalog, TimelineConfig, TimelinePanel};

impl<B: StatisticsBackend> TimelinePanel<B> {
    /// Creates an unloaded panel. Call [`TimelinePanel::mount`] to fetch the
    /// first series.
    pub fn new(backend: B, config: TimelineConfig) -> TimelineResult<Self> {
        let config = config.validated()?;
        let normalizer =
            TimeSeriesNormalizer::new(config.max_span(), config.span_notice_interval())?;
        let selection = SelectionModel::new(
            config.selection_debounce(),
            config.padding,
            config.default_selection_lookback_points,
        );
        let input = InputAdapter::new(config.input_tuning(), config.brush_debounce());
        debug!(
            metric = %config.initial_metric,
            max_span_ms = config.max_span_ms,
            "timeline panel created"
        );

        Ok(Self {
            backend,
            metric: config.initial_metric,
            filters: config.initial_filters.clone(),
            columns: Vec::new(),
            catalog: MetricCatalog::default(),
            normalizer,
            series: None,
            load_state: LoadState::Loading,
            selection,
            input,
            input_attachment: InputAttachment::default(),
            listeners: Vec::new(),
            issued_generation: 0,
            applied_generation: 0,
            config,
        })
    }
}
