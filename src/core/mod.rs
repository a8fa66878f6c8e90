pub mod dense_series;
pub mod metric;
pub mod normalizer;
pub mod primitives;
pub mod selection;
pub mod types;

pub use dense_series::{ChartRow, DensePoint, DenseSeries};
pub use metric::{FilterState, Metric, MetricFamily};
pub use normalizer::{Normalization, TimeSeriesNormalizer};
pub use selection::{SelectionModel, SelectionPadding, SelectionPhase, padded_window};
pub use types::{ColumnKey, Sample, TimeRange};
