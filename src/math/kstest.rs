//! Two-sample Kolmogorov-Smirnov goodness-of-fit test
//!
//! Used by the best-fit selector to discard polynomial fits whose value
//! distribution differs significantly from the sampled counts.

/// Maximum distance between the empirical CDFs of the two samples
pub fn statistic(first: &[f64], second: &[f64]) -> f64 {
    if first.is_empty() || second.is_empty() {
        return 0.0;
    }
    let mut sorted_a = first.to_vec();
    let mut sorted_b = second.to_vec();
    sorted_a.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted_b.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n_a = sorted_a.len() as f64;
    let n_b = sorted_b.len() as f64;
    let mut i = 0;
    let mut j = 0;
    let mut distance = 0.0f64;
    while i < sorted_a.len() && j < sorted_b.len() {
        let value_a = sorted_a.get(i).copied().unwrap_or(f64::INFINITY);
        let value_b = sorted_b.get(j).copied().unwrap_or(f64::INFINITY);
        if value_a <= value_b {
            i += 1;
        }
        if value_b <= value_a {
            j += 1;
        }
        let cdf_a = i as f64 / n_a;
        let cdf_b = j as f64 / n_b;
        distance = distance.max((cdf_a - cdf_b).abs());
    }
    distance
}

/// Asymptotic p-value of the two-sample test; 1.0 when either sample is
/// empty (empty samples cannot be distinguished)
pub fn p_value(first: &[f64], second: &[f64]) -> f64 {
    if first.is_empty() || second.is_empty() {
        return 1.0;
    }
    let distance = statistic(first, second);
    let n_a = first.len() as f64;
    let n_b = second.len() as f64;
    let effective_n = (n_a * n_b / (n_a + n_b)).sqrt();
    let lambda = (0.11 / effective_n + effective_n + 0.12) * distance;
    q_ks(lambda)
}

// Kolmogorov distribution tail series Q(lambda) = 2 sum (-1)^(j-1) exp(-2 j^2 lambda^2)
fn q_ks(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign: f64 = 1.0;
    for j in 1..=200 {
        let j_f = f64::from(j);
        let term = (-2.0 * j_f * j_f * lambda * lambda).exp();
        sum = sign.mul_add(term, sum);
        sign = -sign;
        if term < 1e-14 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
