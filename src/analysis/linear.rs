//! Linear profile statistics and polynomial best-fit search
//!
//! Every sampled metric has a fitted counterpart computed from the best-fit
//! polynomial evaluated at the sampling radii; fitted accessors return NaN
//! until a polynomial has been fitted.

use crate::io::error::{computation_error, Result};
use crate::math::descriptive;
use crate::math::kstest;
use crate::math::polynomial::Polynomial;
use crate::parser::profile::Profile;
use std::ops::RangeInclusive;

/// Statistics over a zero-trimmed intersection profile
#[derive(Debug, Clone)]
pub struct LinearProfileStats {
    profile: Profile,
    fit: Option<Polynomial>,
}

impl LinearProfileStats {
    /// Wrap a trimmed, non-empty profile
    pub const fn new(profile: Profile) -> Self {
        Self { profile, fit: None }
    }

    /// The underlying profile
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Sampling radii
    pub fn radii(&self) -> Vec<f64> {
        self.profile.radii()
    }

    fn values(&self, fitted: bool) -> Vec<f64> {
        if fitted {
            self.fit.as_ref().map_or_else(
                || vec![f64::NAN; self.profile.len()],
                |poly| self.radii().iter().map(|&r| poly.eval(r)).collect(),
            )
        } else {
            self.profile.counts()
        }
    }

    /// Sum of intersections
    pub fn sum(&self, fitted: bool) -> f64 {
        self.values(fitted).iter().sum()
    }

    /// Mean of intersections
    pub fn mean(&self, fitted: bool) -> f64 {
        descriptive::mean(&self.values(fitted))
    }

    /// Median of intersections
    pub fn median(&self, fitted: bool) -> f64 {
        descriptive::median(&self.values(fitted))
    }

    /// Sample skewness of intersections
    pub fn skewness(&self, fitted: bool) -> f64 {
        descriptive::skewness(&self.values(fitted))
    }

    /// Sample excess kurtosis of intersections
    pub fn kurtosis(&self, fitted: bool) -> f64 {
        descriptive::kurtosis(&self.values(fitted))
    }

    /// Largest intersection count
    pub fn max(&self, fitted: bool) -> f64 {
        self.values(fitted)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Radius of the first sample attaining the maximum count
    ///
    /// Ties break to the earliest radius
    pub fn max_intersection_radius(&self) -> f64 {
        let counts = self.profile.counts();
        let max = self.max(false);
        counts
            .iter()
            .position(|&count| count >= max)
            .and_then(|index| self.profile.radii().get(index).copied())
            .unwrap_or(f64::NAN)
    }

    /// Intersections at the first sampled radius, the proxy for the number
    /// of primary branches
    pub fn primary_branches(&self, fitted: bool) -> f64 {
        self.values(fitted).first().copied().unwrap_or(f64::NAN)
    }

    /// Number of radii with at least one intersection
    pub fn intersecting_radii(&self) -> usize {
        self.profile
            .counts()
            .iter()
            .filter(|&&count| count > 0.0)
            .count()
    }

    /// Maximum count over primary branches
    pub fn ramification_index(&self, fitted: bool) -> f64 {
        self.max(fitted) / self.primary_branches(fitted)
    }

    /// Centroid of the profile: mean radius and mean count
    pub fn centroid(&self) -> (f64, f64) {
        (
            descriptive::mean(&self.profile.radii()),
            descriptive::mean(&self.profile.counts()),
        )
    }

    /// Largest radius with at least one intersection
    pub fn enclosing_radius(&self) -> f64 {
        self.profile
            .entries()
            .iter()
            .rev()
            .find(|entry| entry.count >= 1.0)
            .map_or(f64::NAN, |entry| entry.radius)
    }

    /// Fit a polynomial of the given degree to the profile in place
    ///
    /// # Errors
    ///
    /// Returns an error if the least squares system cannot be solved
    pub fn fit_polynomial(&mut self, degree: usize) -> Result<()> {
        let poly = Polynomial::fit(&self.profile.radii(), &self.profile.counts(), degree)
            .map_err(|e| computation_error("polynomial fit", &e))?;
        self.fit = Some(poly);
        Ok(())
    }

    /// The fitted polynomial, if one has been fitted
    pub const fn polynomial(&self) -> Option<&Polynomial> {
        self.fit.as_ref()
    }

    /// Local maxima of the fitted polynomial on an even grid; empty without
    /// a fit
    pub fn polynomial_maxima(&self, lower: f64, upper: f64, points: usize) -> Vec<(f64, f64)> {
        self.fit
            .as_ref()
            .map_or_else(Vec::new, |poly| poly.local_maxima(lower, upper, points))
    }

    /// Search for the best-fitting polynomial degree
    ///
    /// A degree qualifies when its adjusted R² is at least `min_rsquared`
    /// and the two-sample K-S p-value between the sampled and fitted counts
    /// is at least `p_cutoff`; among qualifying degrees the highest adjusted
    /// R² wins, with exact ties kept at the lower degree. Degrees with fewer
    /// observations than coefficients are skipped.
    pub fn find_best_fit(
        &self,
        degrees: RangeInclusive<usize>,
        min_rsquared: f64,
        p_cutoff: f64,
    ) -> Option<usize> {
        let radii = self.profile.radii();
        let counts = self.profile.counts();
        let samples = counts.len();

        let mut best: Option<(usize, f64)> = None;
        for degree in degrees {
            if samples < degree + 2 {
                break;
            }
            let Ok(poly) = Polynomial::fit(&radii, &counts, degree) else {
                continue;
            };
            let adjusted = poly.adjusted_r_squared(&radii, &counts);
            if !adjusted.is_finite() || adjusted < min_rsquared {
                continue;
            }
            let fitted: Vec<f64> = radii.iter().map(|&r| poly.eval(r)).collect();
            if kstest::p_value(&counts, &fitted) < p_cutoff {
                continue;
            }
            if best.is_none_or(|(_, current)| adjusted > current) {
                best = Some((degree, adjusted));
            }
        }
        best.map(|(degree, _)| degree)
    }
}

#[cfg(test)]
mod tests {
    use super::LinearProfileStats;
    use crate::parser::profile::{Profile, ProfileEntry};

    fn stats_from(radii: &[f64], counts: &[f64]) -> LinearProfileStats {
        let entries = radii
            .iter()
            .zip(counts.iter())
            .map(|(&radius, &count)| ProfileEntry { radius, count })
            .collect();
        LinearProfileStats::new(Profile::new(entries).unwrap())
    }

    #[test]
    fn test_sampled_metrics() {
        let stats = stats_from(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 3.0, 5.0, 5.0, 2.0]);
        assert!((stats.sum(false) - 15.0).abs() < 1e-12);
        assert!((stats.mean(false) - 3.0).abs() < 1e-12);
        assert!((stats.median(false) - 3.0).abs() < 1e-12);
        assert!((stats.max(false) - 5.0).abs() < 1e-12);
        assert_eq!(stats.intersecting_radii(), 4);
        assert!((stats.enclosing_radius() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_radius_ties_break_to_the_first() {
        let stats = stats_from(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 3.0, 5.0, 5.0, 2.0]);
        assert!((stats.max_intersection_radius() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ramification_and_centroid() {
        let stats = stats_from(&[1.0, 2.0, 3.0], &[2.0, 6.0, 4.0]);
        assert!((stats.primary_branches(false) - 2.0).abs() < 1e-12);
        assert!((stats.ramification_index(false) - 3.0).abs() < 1e-12);
        let (radius, value) = stats.centroid();
        assert!((radius - 2.0).abs() < 1e-12);
        assert!((value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fitted_metrics_are_nan_before_fitting() {
        let stats = stats_from(&[1.0, 2.0, 3.0], &[2.0, 6.0, 4.0]);
        assert!(stats.mean(true).is_nan());
        assert!(stats.kurtosis(true).is_nan());
        assert!(stats.polynomial_maxima(0.0, 100.0, 50).is_empty());
    }

    #[test]
    fn test_best_fit_found_for_a_smooth_profile() {
        // Noise-free parabolic profile peaking at radius 10
        let radii: Vec<f64> = (1..=20).map(f64::from).collect();
        let counts: Vec<f64> = radii
            .iter()
            .map(|&r| (-(r - 10.0)).mul_add(r - 10.0, 100.0) / 10.0)
            .collect();
        let mut stats = stats_from(&radii, &counts);

        let best = stats.find_best_fit(1..=30, 0.7, 0.05);
        let degree = best.unwrap();
        assert!((1..=30).contains(&degree));

        stats.fit_polynomial(degree).unwrap();
        assert!((stats.mean(true) - stats.mean(false)).abs() < 0.5);
        let maxima = stats.polynomial_maxima(0.0, 100.0, 50);
        assert!(!maxima.is_empty());
    }

    #[test]
    fn test_no_best_fit_for_a_constant_profile() {
        let radii: Vec<f64> = (1..=10).map(f64::from).collect();
        let counts = vec![4.0; 10];
        let stats = stats_from(&radii, &counts);
        // Constant counts leave no variance to explain
        assert!(stats.find_best_fit(1..=30, 0.7, 0.05).is_none());
    }
}
