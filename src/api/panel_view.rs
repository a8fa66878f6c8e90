use serde::{Deserialize, Serialize};

use crate::backend::StatisticsBackend;
use crate::core::{ChartRow, DenseSeries, Metric, TimeRange};
use crate::error::{TimelineError, TimelineResult};

use super::{LineStyle, LoadState, TimelinePanel};

pub const PANEL_VIEW_JSON_SCHEMA_V1: u32 = 1;

/// Points shown by the brush when no selection exists.
const DEFAULT_BRUSH_POINTS: usize = 10;

/// Brush handle positions as indices into the dense series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushWindow {
    pub start_index: usize,
    pub end_index: usize,
}

/// Everything a renderer needs to draw the loaded chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub metric: Metric,
    pub title: String,
    pub value_label: String,
    pub rows: Vec<ChartRow>,
    pub lines: Vec<LineStyle>,
    pub view_window: Option<TimeRange>,
    pub selection: Option<TimeRange>,
    pub brush: BrushWindow,
    pub max_value: Option<f64>,
    pub min_value: Option<f64>,
}

/// Renderable panel state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    Loading,
    NoData,
    Chart(ChartView),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelViewJsonContractV1 {
    pub schema_version: u32,
    pub view: PanelView,
}

impl PanelView {
    pub fn to_json_contract_v1_pretty(&self) -> TimelineResult<String> {
        let payload = PanelViewJsonContractV1 {
            schema_version: PANEL_VIEW_JSON_SCHEMA_V1,
            view: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize panel view contract v1: {e}"))
        })
    }

    /// Accepts either a bare view or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> TimelineResult<Self> {
        if let Ok(view) = serde_json::from_str::<PanelView>(input) {
            return Ok(view);
        }
        let payload: PanelViewJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            TimelineError::InvalidData(format!("failed to parse panel view json payload: {e}"))
        })?;
        if payload.schema_version != PANEL_VIEW_JSON_SCHEMA_V1 {
            return Err(TimelineError::InvalidData(format!(
                "unsupported panel view schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.view)
    }
}

/// Brush indices for `selection`: first point at or after each edge, falling
/// back to the series ends. Without a selection the brush covers the last
/// ten points.
#[must_use]
pub fn brush_window(series: &DenseSeries, selection: Option<TimeRange>) -> BrushWindow {
    let last_index = series.len().saturating_sub(1);
    match selection {
        Some(selection) => BrushWindow {
            start_index: series.index_at_or_after(selection.begin()).unwrap_or(0),
            end_index: series
                .index_at_or_after(selection.end())
                .unwrap_or(last_index),
        },
        None if series.len() > DEFAULT_BRUSH_POINTS => BrushWindow {
            start_index: series.len() - DEFAULT_BRUSH_POINTS,
            end_index: last_index,
        },
        None => BrushWindow {
            start_index: 0,
            end_index: last_index,
        },
    }
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    #[must_use]
    pub fn view(&self) -> PanelView {
        match (self.load_state, &self.series) {
            (LoadState::Loading, _) => PanelView::Loading,
            (LoadState::Empty, _) | (LoadState::Loaded, None) => PanelView::NoData,
            (LoadState::Loaded, Some(series)) => {
                let selection = self.selection.selection();
                PanelView::Chart(ChartView {
                    metric: self.metric,
                    title: self.metric.display_name().to_owned(),
                    value_label: self.metric.value_label().to_owned(),
                    rows: series.rows(),
                    lines: self.catalog.line_styles(series.columns()),
                    view_window: self.selection.view_window(),
                    selection,
                    brush: brush_window(series, selection),
                    max_value: series.max_value(),
                    min_value: series.min_value(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BrushWindow, brush_window};
    use crate::core::primitives::minutes;
    use crate::core::{DensePoint, DenseSeries, TimeRange};
    use chrono::{DateTime, Utc};

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + minutes(minute)
    }

    fn series(len: i64) -> DenseSeries {
        let points = (0..len)
            .map(|minute| DensePoint {
                time: at(minute),
                values: vec![0.0],
            })
            .collect();
        DenseSeries::from_points(vec!["80".to_owned()], points).expect("series")
    }

    #[test]
    fn brush_without_selection_covers_last_ten_points() {
        assert_eq!(
            brush_window(&series(30), None),
            BrushWindow {
                start_index: 20,
                end_index: 29
            }
        );
        assert_eq!(
            brush_window(&series(4), None),
            BrushWindow {
                start_index: 0,
                end_index: 3
            }
        );
    }

    #[test]
    fn brush_follows_selection_edges() {
        let selection = TimeRange::new(at(5), at(12)).expect("selection");
        assert_eq!(
            brush_window(&series(30), Some(selection)),
            BrushWindow {
                start_index: 5,
                end_index: 12
            }
        );

        let past_end = TimeRange::new(at(25), at(90)).expect("selection");
        assert_eq!(brush_window(&series(30), Some(past_end)).end_index, 29);
    }
}
