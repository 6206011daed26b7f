//! Least squares polynomial fitting and maxima search
//!
//! Fitting rescales the x domain to [-1, 1] before solving the normal
//! equations, which keeps the Vandermonde moment matrix well conditioned at
//! the degrees searched by the best-fit selector.

use ndarray::Array2;
use std::error::Error;
use std::fmt;

/// Error type for polynomial fitting operations
#[derive(Debug, Clone)]
pub struct FitError {
    message: String,
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polynomial fit error: {}", self.message)
    }
}

impl Error for FitError {}

impl FitError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Polynomial fitted by least squares, evaluated by Horner's rule
///
/// Coefficients live in the rescaled domain; callers only ever evaluate in
/// the original x coordinates
#[derive(Debug, Clone)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    x_center: f64,
    x_half_range: f64,
}

impl Polynomial {
    /// Fit a polynomial of the given degree through the samples
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `xs` and `ys` have different lengths
    /// - Fewer than `degree + 1` samples are provided
    /// - The normal equations are singular (e.g. coincident x values)
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, FitError> {
        if xs.len() != ys.len() {
            return Err(FitError::new("xs and ys must have the same length"));
        }
        let n = xs.len();
        if n < degree + 1 {
            return Err(FitError::new(format!(
                "need at least {} samples for degree {degree}",
                degree + 1
            )));
        }

        let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let x_center = f64::midpoint(min_x, max_x);
        let half = (max_x - min_x) / 2.0;
        let x_half_range = if half > 0.0 { half } else { 1.0 };
        let ts: Vec<f64> = xs.iter().map(|x| (x - x_center) / x_half_range).collect();

        let size = degree + 1;

        // Moment sums give both the normal-equation matrix and its rhs
        let mut power_sums = vec![0.0; 2 * degree + 1];
        let mut rhs = vec![0.0; size];
        for (&t, &y) in ts.iter().zip(ys.iter()) {
            let mut power = 1.0;
            for k in 0..=2 * degree {
                if let Some(sum) = power_sums.get_mut(k) {
                    *sum += power;
                }
                if let Some(r) = rhs.get_mut(k) {
                    *r = y.mul_add(power, *r);
                }
                power *= t;
            }
        }

        let mut matrix = Array2::<f64>::zeros((size, size));
        for i in 0..size {
            for j in 0..size {
                matrix[[i, j]] = power_sums.get(i + j).copied().unwrap_or(0.0);
            }
        }

        let coefficients = solve(matrix, rhs)?;
        Ok(Self {
            coefficients,
            x_center,
            x_half_range,
        })
    }

    /// Evaluate the polynomial at x
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.x_center) / self.x_half_range;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc.mul_add(t, c))
    }

    /// Degree of the fitted polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficient of determination against the samples; NaN when the
    /// responses are constant
    pub fn r_squared(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let n = ys.len();
        if n == 0 || xs.len() != n {
            return f64::NAN;
        }
        let mean_y = ys.iter().sum::<f64>() / n as f64;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let residual = y - self.eval(x);
            ss_res = residual.mul_add(residual, ss_res);
            let deviation = y - mean_y;
            ss_tot = deviation.mul_add(deviation, ss_tot);
        }
        if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            f64::NAN
        }
    }

    /// R² penalized for the number of coefficients; NaN without residual
    /// degrees of freedom
    pub fn adjusted_r_squared(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let n = ys.len() as f64;
        let k = self.degree() as f64;
        if n - k - 1.0 <= 0.0 {
            return f64::NAN;
        }
        let r_squared = self.r_squared(xs, ys);
        1.0 - (1.0 - r_squared) * (n - 1.0) / (n - k - 1.0)
    }

    /// Local maxima of the polynomial on an even grid over `[lower, upper]`
    ///
    /// A grid point is a maximum when it is strictly above both neighbors;
    /// the interval endpoints are never reported
    pub fn local_maxima(&self, lower: f64, upper: f64, points: usize) -> Vec<(f64, f64)> {
        if points < 3 || upper <= lower {
            return Vec::new();
        }
        let step = (upper - lower) / (points as f64 - 1.0);
        let samples: Vec<(f64, f64)> = (0..points)
            .map(|i| {
                let x = (i as f64).mul_add(step, lower);
                (x, self.eval(x))
            })
            .collect();
        samples
            .windows(3)
            .filter_map(|window| match window {
                [left, mid, right] if mid.1 > left.1 && mid.1 > right.1 => Some(*mid),
                _ => None,
            })
            .collect()
    }
}

fn solve(mut matrix: Array2<f64>, mut rhs: Vec<f64>) -> Result<Vec<f64>, FitError> {
    let size = rhs.len();

    for col in 0..size {
        let mut pivot_row = col;
        let mut pivot_mag = matrix[[col, col]].abs();
        for row in col + 1..size {
            let mag = matrix[[row, col]].abs();
            if mag > pivot_mag {
                pivot_mag = mag;
                pivot_row = row;
            }
        }
        if pivot_mag < 1e-12 {
            return Err(FitError::new("normal equations are singular"));
        }
        if pivot_row != col {
            for k in 0..size {
                let tmp = matrix[[col, k]];
                matrix[[col, k]] = matrix[[pivot_row, k]];
                matrix[[pivot_row, k]] = tmp;
            }
            rhs.swap(col, pivot_row);
        }

        let pivot = matrix[[col, col]];
        for row in col + 1..size {
            let factor = matrix[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..size {
                matrix[[row, k]] = matrix[[col, k]].mul_add(-factor, matrix[[row, k]]);
            }
            let pivot_rhs = rhs.get(col).copied().unwrap_or(0.0);
            if let Some(value) = rhs.get_mut(row) {
                *value = pivot_rhs.mul_add(-factor, *value);
            }
        }
    }

    let mut coefficients = vec![0.0; size];
    for col in (0..size).rev() {
        let mut value = rhs.get(col).copied().unwrap_or(0.0);
        for k in col + 1..size {
            value = matrix[[col, k]].mul_add(-coefficients.get(k).copied().unwrap_or(0.0), value);
        }
        if let Some(coefficient) = coefficients.get_mut(col) {
            *coefficient = value / matrix[[col, col]];
        }
    }
    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::Polynomial;

    fn quartic(x: f64) -> f64 {
        // Two equal-height local maxima, at x = 20 and x = 60
        -((x - 20.0) * (x - 60.0)).powi(2)
    }

    #[test]
    fn test_exact_quadratic_is_recovered() {
        let xs: Vec<f64> = (0..=10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| (2.0 * x).mul_add(1.0, -(x * x)) + 3.0).collect();
        let poly = Polynomial::fit(&xs, &ys, 2).unwrap();
        assert_eq!(poly.degree(), 2);
        for &x in &[0.0_f64, 2.5, 7.0, 10.0] {
            let expected = (2.0 * x).mul_add(1.0, -(x * x)) + 3.0;
            assert!((poly.eval(x) - expected).abs() < 1e-8);
        }
        assert!((poly.r_squared(&xs, &ys) - 1.0).abs() < 1e-10);
        assert!((poly.adjusted_r_squared(&xs, &ys) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_grid_maxima_of_a_bimodal_quartic() {
        let xs: Vec<f64> = (0..=50).map(|i| f64::from(i) * 2.0).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| quartic(x)).collect();
        let poly = Polynomial::fit(&xs, &ys, 4).unwrap();

        let maxima = poly.local_maxima(0.0, 100.0, 50);
        assert_eq!(maxima.len(), 2);

        let step = 100.0 / 49.0;
        let first = maxima.first().copied().unwrap_or((f64::NAN, f64::NAN));
        let second = maxima.last().copied().unwrap_or((f64::NAN, f64::NAN));
        assert!((first.0 - 10.0 * step).abs() < 1e-6);
        assert!((second.0 - 29.0 * step).abs() < 1e-6);
    }

    #[test]
    fn test_underdetermined_fit_is_rejected() {
        let xs = [0.0, 1.0];
        let ys = [1.0, 2.0];
        assert!(Polynomial::fit(&xs, &ys, 5).is_err());
    }

    #[test]
    fn test_degenerate_grid_yields_no_maxima() {
        let xs: Vec<f64> = (0..=10).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| x).collect();
        let poly = Polynomial::fit(&xs, &ys, 1).unwrap();
        assert!(poly.local_maxima(0.0, 100.0, 2).is_empty());
        assert!(poly.local_maxima(10.0, 10.0, 50).is_empty());
        // A strictly increasing line has no interior maximum
        assert!(poly.local_maxima(0.0, 100.0, 50).is_empty());
    }
}
