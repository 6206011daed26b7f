//! Area-normalized semi-log and log-log profile regressions
//!
//! The 2D area normalizer divides each intersection count by the sampling
//! circle area πr². The semi-log view regresses ln(N/πr²) on the radius, the
//! log-log view on the log of the radius; the slopes of these lines are the
//! classic Sholl regression coefficients. Samples whose transform is not
//! finite (zero counts, zero radius) are excluded from the regression.

use crate::math::regression::LinearRegression;
use crate::parser::profile::Profile;
use std::f64::consts::PI;

/// Normalization mode of a profile view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormMethod {
    /// ln(N/πr²) against r
    SemiLog,
    /// ln(N/πr²) against ln r
    LogLog,
}

impl NormMethod {
    /// Human-readable label used in log messages
    pub const fn label(self) -> &'static str {
        match self {
            Self::SemiLog => "Semi-log",
            Self::LogLog => "Log-log",
        }
    }
}

/// Regression view over an area-normalized intersection profile
#[derive(Debug, Clone)]
pub struct NormalizedProfileStats {
    method: NormMethod,
    points: Vec<(f64, f64)>,
    regression: LinearRegression,
}

impl NormalizedProfileStats {
    /// Build the view over a trimmed profile
    ///
    /// Profiles with fewer than two usable samples yield a NaN regression
    /// rather than an error; the metrics record carries the NaN through.
    pub fn new(profile: &Profile, method: NormMethod) -> Self {
        let points: Vec<(f64, f64)> = profile
            .entries()
            .iter()
            .filter_map(|entry| {
                let normalized = entry.count / (PI * entry.radius * entry.radius);
                let x = match method {
                    NormMethod::SemiLog => entry.radius,
                    NormMethod::LogLog => entry.radius.ln(),
                };
                let y = normalized.ln();
                (x.is_finite() && y.is_finite()).then_some((x, y))
            })
            .collect();
        let regression =
            LinearRegression::fit(&points).unwrap_or_else(|_| LinearRegression::undefined());
        Self {
            method,
            points,
            regression,
        }
    }

    /// Normalization mode of this view
    pub const fn method(&self) -> NormMethod {
        self.method
    }

    /// Transformed sample points entering the regression
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Full regression over all usable samples
    pub const fn regression(&self) -> LinearRegression {
        self.regression
    }

    /// Slope of the full regression
    pub const fn slope(&self) -> f64 {
        self.regression.slope
    }

    /// Intercept of the full regression
    pub const fn intercept(&self) -> f64 {
        self.regression.intercept
    }

    /// Regression restricted to samples whose x value lies within the given
    /// percentile band
    pub fn restricted_regression(
        &self,
        lower_percentile: f64,
        upper_percentile: f64,
    ) -> LinearRegression {
        if self.points.len() < 2 {
            return LinearRegression::undefined();
        }
        let mut xs: Vec<f64> = self.points.iter().map(|&(x, _)| x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let lower = percentile(&xs, lower_percentile);
        let upper = percentile(&xs, upper_percentile);

        let band: Vec<(f64, f64)> = self
            .points
            .iter()
            .copied()
            .filter(|&(x, _)| x >= lower && x <= upper)
            .collect();
        LinearRegression::fit(&band).unwrap_or_else(|_| LinearRegression::undefined())
    }
}

// Linear-interpolation percentile over a sorted slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let clamped = pct.clamp(0.0, 100.0) / 100.0;
    let rank = clamped * (sorted.len() as f64 - 1.0);
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;
    let low_value = sorted.get(low).copied().unwrap_or(f64::NAN);
    let high_value = sorted.get(high).copied().unwrap_or(f64::NAN);
    (high_value - low_value).mul_add(fraction, low_value)
}
