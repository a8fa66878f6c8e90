use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::core::{FilterState, Metric, SelectionPadding};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::InputTuning;

use super::validation::validate_config;

const MINUTE_MS: i64 = 60_000;

/// Public panel bootstrap configuration.
///
/// Serializable so hosts can ship panel setup alongside dashboard layout.
/// Durations are plain milliseconds to keep the JSON shape obvious.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub initial_metric: Metric,
    pub initial_filters: FilterState,
    /// Longest span the dense grid may cover.
    pub max_span_ms: i64,
    /// Minimum wall-clock gap between two "range too large" notices.
    pub span_notice_interval_ms: u64,
    /// Quiet period before a user selection is published.
    pub selection_debounce_ms: u64,
    /// Coalescing window for brush drag frames.
    pub brush_debounce_ms: u64,
    pub padding: SelectionPadding,
    pub click_selection_width_ms: i64,
    pub keyboard_step_ratio: f64,
    pub min_selection_width_ms: i64,
    /// Points before the last one covered by the default selection.
    pub default_selection_lookback_points: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            initial_metric: Metric::ConnectionsPerService,
            initial_filters: FilterState::default(),
            max_span_ms: 24 * 60 * MINUTE_MS,
            span_notice_interval_ms: 60_000,
            selection_debounce_ms: 1_000,
            brush_debounce_ms: 150,
            padding: SelectionPadding::default(),
            click_selection_width_ms: 10 * MINUTE_MS,
            keyboard_step_ratio: 0.1,
            min_selection_width_ms: MINUTE_MS,
            default_selection_lookback_points: 10,
        }
    }
}

impl TimelineConfig {
    #[must_use]
    pub fn new(initial_metric: Metric) -> Self {
        Self {
            initial_metric,
            ..Self::default()
        }
    }

    /// Sets filters read from the page URL.
    #[must_use]
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.initial_filters = filters;
        self
    }

    #[must_use]
    pub fn with_max_span(mut self, max_span: TimeDelta) -> Self {
        self.max_span_ms = max_span.num_milliseconds();
        self
    }

    #[must_use]
    pub fn with_selection_debounce(mut self, delay: Duration) -> Self {
        self.selection_debounce_ms = duration_millis(delay);
        self
    }

    #[must_use]
    pub fn with_brush_debounce(mut self, delay: Duration) -> Self {
        self.brush_debounce_ms = duration_millis(delay);
        self
    }

    #[must_use]
    pub fn with_span_notice_interval(mut self, interval: Duration) -> Self {
        self.span_notice_interval_ms = duration_millis(interval);
        self
    }

    #[must_use]
    pub fn with_padding(mut self, left_multiplier: f64, right_multiplier: f64) -> Self {
        self.padding = SelectionPadding {
            left_multiplier,
            right_multiplier,
        };
        self
    }

    #[must_use]
    pub fn with_keyboard_step_ratio(mut self, ratio: f64) -> Self {
        self.keyboard_step_ratio = ratio;
        self
    }

    #[must_use]
    pub fn max_span(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.max_span_ms)
    }

    #[must_use]
    pub fn span_notice_interval(&self) -> Duration {
        Duration::from_millis(self.span_notice_interval_ms)
    }

    #[must_use]
    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }

    #[must_use]
    pub fn brush_debounce(&self) -> Duration {
        Duration::from_millis(self.brush_debounce_ms)
    }

    #[must_use]
    pub fn input_tuning(&self) -> InputTuning {
        InputTuning {
            click_selection_width: TimeDelta::milliseconds(self.click_selection_width_ms),
            keyboard_step_ratio: self.keyboard_step_ratio,
            min_selection_width: TimeDelta::milliseconds(self.min_selection_width_ms),
        }
    }

    /// Checks value ranges, returning the config unchanged when valid.
    pub fn validated(self) -> TimelineResult<Self> {
        validate_config(self)
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize timeline config: {e}"))
        })
    }

    /// Parses and validates a config; absent fields take their defaults.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            TimelineError::InvalidData(format!("failed to parse timeline config json: {e}"))
        })?;
        validate_config(config)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
