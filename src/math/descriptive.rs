//! Descriptive sample statistics
//!
//! Skewness and kurtosis use the bias-corrected sample estimators; below the
//! minimum sample size (three and four observations respectively) or at zero
//! variance they return NaN rather than a misleading number.

/// Arithmetic mean of the values; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of the values; the midpoint of the two central values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let lower = sorted.get(mid.wrapping_sub(1)).copied().unwrap_or(f64::NAN);
        let upper = sorted.get(mid).copied().unwrap_or(f64::NAN);
        (lower + upper) / 2.0
    } else {
        sorted.get(mid).copied().unwrap_or(f64::NAN)
    }
}

/// Bias-corrected sample skewness; NaN below three samples or at zero variance
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let n_f = n as f64;
    let center = mean(values);
    let std_dev = sample_std_dev(values, center);
    if std_dev <= 0.0 {
        return f64::NAN;
    }
    let cubed: f64 = values.iter().map(|v| ((v - center) / std_dev).powi(3)).sum();
    n_f / ((n_f - 1.0) * (n_f - 2.0)) * cubed
}

/// Bias-corrected sample excess kurtosis; NaN below four samples or at zero variance
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return f64::NAN;
    }
    let n_f = n as f64;
    let center = mean(values);
    let std_dev = sample_std_dev(values, center);
    if std_dev <= 0.0 {
        return f64::NAN;
    }
    let fourth: f64 = values.iter().map(|v| ((v - center) / std_dev).powi(4)).sum();
    let lead = n_f * (n_f + 1.0) / ((n_f - 1.0) * (n_f - 2.0) * (n_f - 3.0));
    let correction = 3.0 * (n_f - 1.0).powi(2) / ((n_f - 2.0) * (n_f - 3.0));
    lead.mul_add(fourth, -correction)
}

fn sample_std_dev(values: &[f64], center: f64) -> f64 {
    let n_f = values.len() as f64;
    let variance = values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / (n_f - 1.0);
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::{kurtosis, mean, median, skewness};

    #[test]
    fn test_mean_and_median() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&values) - 2.5).abs() < 1e-12);
        assert!((median(&values) - 2.5).abs() < 1e-12);

        let odd = [0.0, 3.0, 5.0, 5.0, 2.0];
        assert!((median(&odd) - 3.0).abs() < 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_skewness_of_symmetric_data_is_zero() {
        let values = [1.0, 2.0, 3.0];
        assert!(skewness(&values).abs() < 1e-12);
    }

    #[test]
    fn test_kurtosis_bias_corrected() {
        // Exact value for [1, 2, 3, 4] under the corrected estimator
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((kurtosis(&values) - (-1.2)).abs() < 1e-10);
    }

    #[test]
    fn test_moments_undefined_for_small_or_constant_samples() {
        assert!(skewness(&[1.0, 2.0]).is_nan());
        assert!(kurtosis(&[1.0, 2.0, 3.0]).is_nan());
        assert!(skewness(&[2.0, 2.0, 2.0]).is_nan());
        assert!(kurtosis(&[2.0, 2.0, 2.0, 2.0]).is_nan());
    }
}
