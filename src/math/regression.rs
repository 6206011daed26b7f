//! Ordinary least squares line fitting

use std::error::Error;
use std::fmt;

/// Error type for regression operations
#[derive(Debug, Clone)]
pub struct RegressionError {
    message: String,
}

impl fmt::Display for RegressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regression error: {}", self.message)
    }
}

impl Error for RegressionError {}

impl RegressionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Slope, intercept, and coefficient of determination of a fitted line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Coefficient of determination; NaN when the responses are constant
    pub r_squared: f64,
}

impl LinearRegression {
    /// Placeholder regression for views with too few usable points
    pub const fn undefined() -> Self {
        Self {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
        }
    }

    /// Fit a least squares line through the points
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given or the x values
    /// are constant
    pub fn fit(points: &[(f64, f64)]) -> Result<Self, RegressionError> {
        let n = points.len();
        if n < 2 {
            return Err(RegressionError::new("need at least 2 points"));
        }
        let n_f = n as f64;
        let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n_f;
        let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n_f;

        let mut ss_xx = 0.0;
        let mut ss_xy = 0.0;
        let mut ss_yy = 0.0;
        for &(x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            ss_xx = dx.mul_add(dx, ss_xx);
            ss_xy = dx.mul_add(dy, ss_xy);
            ss_yy = dy.mul_add(dy, ss_yy);
        }
        if ss_xx <= 0.0 {
            return Err(RegressionError::new("x values are constant"));
        }

        let slope = ss_xy / ss_xx;
        let intercept = slope.mul_add(-mean_x, mean_y);
        let r_squared = if ss_yy > 0.0 {
            (ss_xy * ss_xy) / (ss_xx * ss_yy)
        } else {
            f64::NAN
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }
}
