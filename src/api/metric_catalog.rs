use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{
    ColumnSelector, RuleDescriptor, ServiceMap, StatisticsBackend, StatisticsQuery,
};
use crate::core::{ColumnKey, FilterState, Metric, MetricFamily};
use crate::error::TimelineResult;

/// Colors used for lines whose entity has no color of its own.
pub const FALLBACK_PALETTE: [&str; 6] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#0088fe", "#00C49F",
];

const LINE_STROKE_WIDTH: f64 = 2.0;

/// Entity map fetched alongside a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogEntities {
    Services(ServiceMap),
    Rules(Vec<RuleDescriptor>),
}

impl CatalogEntities {
    fn color_of(&self, column: &str) -> Option<&str> {
        match self {
            CatalogEntities::Services(services) => services.get(column)?.color.as_deref(),
            CatalogEntities::Rules(rules) => rules
                .iter()
                .find(|rule| rule.id == column)?
                .color
                .as_deref(),
        }
    }
}

/// Columns and request resolved for one metric/filter combination.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogResolution {
    pub metric: Metric,
    pub columns: Vec<ColumnKey>,
    pub entities: CatalogEntities,
    pub query: StatisticsQuery,
}

/// Stroke settings for one plotted column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub data_key: ColumnKey,
    pub color: String,
    pub stroke_width: f64,
}

/// Resolves active columns for a metric and keeps the last entity map for
/// styling.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    entities: Option<CatalogEntities>,
}

impl MetricCatalog {
    /// Fetches the entity list for `metric` and resolves its columns.
    pub fn resolve<B: StatisticsBackend + ?Sized>(
        backend: &B,
        metric: Metric,
        filters: &FilterState,
    ) -> TimelineResult<CatalogResolution> {
        let entities = match metric.family() {
            MetricFamily::Rules => CatalogEntities::Rules(backend.rules()?),
            MetricFamily::Services => CatalogEntities::Services(backend.services()?),
        };
        Ok(Self::resolve_columns(metric, filters, entities))
    }

    /// Column resolution over an already fetched entity map.
    ///
    /// Rules: the rule filter when non-empty, otherwise every rule id.
    /// Services: the filtered port alone when it exists, otherwise every port.
    #[must_use]
    pub fn resolve_columns(
        metric: Metric,
        filters: &FilterState,
        entities: CatalogEntities,
    ) -> CatalogResolution {
        let (columns, selector) = match &entities {
            CatalogEntities::Rules(rules) => {
                if filters.matched_rules.is_empty() {
                    let ids: Vec<ColumnKey> = rules.iter().map(|rule| rule.id.clone()).collect();
                    (ids, ColumnSelector::Unrestricted)
                } else {
                    let ids = filters.matched_rules.clone();
                    (ids.clone(), ColumnSelector::RuleIds(ids))
                }
            }
            CatalogEntities::Services(services) => {
                let ports: Vec<ColumnKey> = match &filters.service_port {
                    Some(port) if services.contains_key(port) => vec![port.clone()],
                    _ => services.keys().cloned().collect(),
                };
                (ports.clone(), ColumnSelector::Ports(ports))
            }
        };
        debug!(
            %metric,
            column_count = columns.len(),
            "resolved metric columns"
        );

        CatalogResolution {
            metric,
            columns,
            entities,
            query: StatisticsQuery {
                metric,
                columns: selector,
            },
        }
    }

    pub fn cache(&mut self, entities: CatalogEntities) {
        self.entities = Some(entities);
    }

    #[must_use]
    pub fn entities(&self) -> Option<&CatalogEntities> {
        self.entities.as_ref()
    }

    /// One style per column: entity color when set, palette by position otherwise.
    #[must_use]
    pub fn line_styles(&self, columns: &[ColumnKey]) -> Vec<LineStyle> {
        columns
            .iter()
            .enumerate()
            .map(|(index, column)| LineStyle {
                data_key: column.clone(),
                color: self
                    .entities
                    .as_ref()
                    .and_then(|entities| entities.color_of(column))
                    .unwrap_or(FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()])
                    .to_owned(),
                stroke_width: LINE_STROKE_WIDTH,
            })
            .collect()
    }
}
