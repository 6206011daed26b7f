//! Ordered metrics record assembly
//!
//! The record is a flat, insertion-ordered mapping from metric name to
//! value; the CSV exporter writes the keys as the header row and the values
//! as the data row, so ordering is part of the output format. Metrics that
//! only exist once a best-fit polynomial is found start out as the
//! `NotComputed` sentinel, which serializes as `NaN`.

use crate::analysis::linear::LinearProfileStats;
use crate::analysis::normalized::NormalizedProfileStats;
use crate::io::configuration::{
    MAXIMA_SEARCH_MAX, MAXIMA_SEARCH_MIN, MAXIMA_SEARCH_POINTS, REGRESSION_PERCENTILE_HIGH,
    REGRESSION_PERCENTILE_LOW,
};
use std::fmt;

/// Value of a single metric
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Computed numeric value
    Number(f64),
    /// Verbatim identity field
    Text(String),
    /// Placeholder for a metric that needs a best-fit polynomial
    NotComputed,
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text}"),
            Self::NotComputed => write!(f, "NaN"),
        }
    }
}

/// Insertion-ordered mapping from metric name to value
#[derive(Debug, Clone, Default)]
pub struct MetricsRecord {
    entries: Vec<(&'static str, MetricValue)>,
}

impl MetricsRecord {
    /// Empty record
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a metric, replacing the value in place when the key exists
    pub fn set(&mut self, key: &'static str, value: MetricValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Value of a metric, if present
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Metric names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Rendered values in insertion order
    pub fn rendered_values(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|(_, value)| value.to_string())
    }

    /// Number of metrics in the record
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the record has no metrics
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assemble the baseline record for one cell
///
/// Contains the identity fields, every sampled statistic, the regression
/// coefficients of both normalized views, and the `NotComputed` placeholders
/// for the fit-dependent metrics.
pub fn baseline_record(
    mask_name: &str,
    tcs_value: &str,
    stats: &LinearProfileStats,
    semi_log: &NormalizedProfileStats,
    log_log: &NormalizedProfileStats,
) -> MetricsRecord {
    let (centroid_radius, centroid_value) = stats.centroid();

    let mut record = MetricsRecord::new();
    record.set("Mask Name", MetricValue::Text(mask_name.to_string()));
    record.set("TCS Value", MetricValue::Text(tcs_value.to_string()));
    record.set(
        "Primary Branches",
        MetricValue::Number(stats.primary_branches(false)),
    );
    record.set(
        "Intersecting Radii",
        MetricValue::Number(stats.intersecting_radii() as f64),
    );
    record.set("Sum of Intersections", MetricValue::Number(stats.sum(false)));
    record.set(
        "Mean of Intersections",
        MetricValue::Number(stats.mean(false)),
    );
    record.set(
        "Median of Intersections",
        MetricValue::Number(stats.median(false)),
    );
    record.set(
        "Skewness (sampled)",
        MetricValue::Number(stats.skewness(false)),
    );
    record.set(
        "Kurtosis (sampled)",
        MetricValue::Number(stats.kurtosis(false)),
    );
    record.set("Kurtosis (fit)", MetricValue::NotComputed);
    record.set(
        "Maximum Number of Intersections",
        MetricValue::Number(stats.max(false)),
    );
    record.set(
        "Max Intersection Radius",
        MetricValue::Number(stats.max_intersection_radius()),
    );
    record.set(
        "Ramification Index (sampled)",
        MetricValue::Number(stats.ramification_index(false)),
    );
    record.set("Ramification Index (fit)", MetricValue::NotComputed);
    record.set("Centroid Radius", MetricValue::Number(centroid_radius));
    record.set("Centroid Value", MetricValue::Number(centroid_value));
    record.set(
        "Enclosing Radius",
        MetricValue::Number(stats.enclosing_radius()),
    );
    record.set("Critical Value", MetricValue::NotComputed);
    record.set("Critical Radius", MetricValue::NotComputed);
    record.set("Mean Value", MetricValue::NotComputed);
    record.set("Polynomial Degree", MetricValue::NotComputed);
    record.set(
        "Regression Coefficient (semi-log)",
        MetricValue::Number(semi_log.slope()),
    );
    record.set(
        "Regression Coefficient (Log-log)",
        MetricValue::Number(log_log.slope()),
    );
    record.set(
        "Regression Intercept (semi-log)",
        MetricValue::Number(semi_log.intercept()),
    );
    record.set(
        "Regression Intercept (Log-log)",
        MetricValue::Number(log_log.intercept()),
    );
    record
}

/// Append the four 10th-90th percentile band regression metrics
///
/// Computed unconditionally for every cell, whether or not a best fit is
/// later found.
pub fn append_percentile_metrics(
    record: &mut MetricsRecord,
    semi_log: &NormalizedProfileStats,
    log_log: &NormalizedProfileStats,
) {
    let semi_band =
        semi_log.restricted_regression(REGRESSION_PERCENTILE_LOW, REGRESSION_PERCENTILE_HIGH);
    let log_band =
        log_log.restricted_regression(REGRESSION_PERCENTILE_LOW, REGRESSION_PERCENTILE_HIGH);

    record.set(
        "Regression Coefficient (semi-log)[P10-P90]",
        MetricValue::Number(semi_band.slope),
    );
    record.set(
        "Regression Coefficient (Log-log)[P10-P90]",
        MetricValue::Number(log_band.slope),
    );
    record.set(
        "Regression Intercept (Semi-log)[P10-P90]",
        MetricValue::Number(semi_band.intercept),
    );
    record.set(
        "Regression Intercept (Log-log)[P10-P90]",
        MetricValue::Number(log_band.intercept),
    );
}

/// Refresh the fit-dependent metrics after a best-fit polynomial was fitted
///
/// Critical value/radius are the arithmetic means of the y/x coordinates of
/// the polynomial's grid maxima; when the grid search finds no interior
/// maximum they keep their sentinel and a warning is logged.
pub fn apply_fit_metrics(record: &mut MetricsRecord, stats: &LinearProfileStats, degree: usize) {
    let maxima = stats.polynomial_maxima(MAXIMA_SEARCH_MIN, MAXIMA_SEARCH_MAX, MAXIMA_SEARCH_POINTS);
    if maxima.is_empty() {
        log::warn!("fitted polynomial has no interior maxima; critical value/radius not computed");
    } else {
        let count = maxima.len() as f64;
        let critical_value = maxima.iter().map(|&(_, y)| y).sum::<f64>() / count;
        let critical_radius = maxima.iter().map(|&(x, _)| x).sum::<f64>() / count;
        record.set("Critical Value", MetricValue::Number(critical_value));
        record.set("Critical Radius", MetricValue::Number(critical_radius));
    }

    record.set("Kurtosis (fit)", MetricValue::Number(stats.kurtosis(true)));
    record.set(
        "Ramification Index (fit)",
        MetricValue::Number(stats.ramification_index(true)),
    );
    record.set("Mean Value", MetricValue::Number(stats.mean(true)));
    record.set("Polynomial Degree", MetricValue::Number(degree as f64));
}
