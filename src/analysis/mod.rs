//! Profile statistics and the exported metrics record

/// Linear profile statistics and polynomial best-fit search
pub mod linear;
/// Ordered metrics record assembly
pub mod metrics;
/// Area-normalized semi-log and log-log profile regressions
pub mod normalized;

pub use linear::LinearProfileStats;
pub use metrics::{MetricValue, MetricsRecord};
pub use normalized::{NormMethod, NormalizedProfileStats};
