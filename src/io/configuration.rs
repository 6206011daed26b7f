//! Pipeline constants and runtime configuration defaults

// Best-fit polynomial search bounds
/// Lowest polynomial degree tried by the best-fit search
pub const MIN_FIT_DEGREE: usize = 1;
/// Highest polynomial degree tried by the best-fit search
pub const MAX_FIT_DEGREE: usize = 30;

/// Lowest acceptable adjusted R² for a candidate fit
pub const MIN_ADJUSTED_RSQUARED: f64 = 0.7;
/// Two-sample K-S p-value below which a candidate fit is discarded
pub const KS_PVALUE_CUTOFF: f64 = 0.05;

// Critical value/radius are averaged over maxima found on this grid
/// Lower bound of the polynomial maxima search, in calibrated units
pub const MAXIMA_SEARCH_MIN: f64 = 0.0;
/// Upper bound of the polynomial maxima search, in calibrated units
pub const MAXIMA_SEARCH_MAX: f64 = 100.0;
/// Number of grid points used by the maxima search
pub const MAXIMA_SEARCH_POINTS: usize = 50;

/// Lower percentile of the restricted regression band
pub const REGRESSION_PERCENTILE_LOW: f64 = 10.0;
/// Upper percentile of the restricted regression band
pub const REGRESSION_PERCENTILE_HIGH: f64 = 90.0;

// Default values for configurable parameters
/// Default start radius, in calibrated units
pub const DEFAULT_START_RADIUS: f64 = 0.0;
/// Default step between sampling radii, in calibrated units
pub const DEFAULT_STEP_SIZE: f64 = 1.0;
/// Default physical width of one pixel
pub const DEFAULT_PIXEL_SIZE: f64 = 1.0;
/// Default name of the physical unit
pub const DEFAULT_SPATIAL_UNIT: &str = "pixel";
/// Default tissue/cell-state label
pub const DEFAULT_TCS_VALUE: &str = "NA";

// Output naming; every file combines a role prefix with the cell name
/// Prefix of the metrics CSV
pub const CSV_PREFIX: &str = "Sholl ";
/// Prefix of the intersection-count raster
pub const MASK_PREFIX: &str = "Sholl Mask ";
/// Prefix of the semi-log diagnostic plot
pub const SEMILOG_PLOT_PREFIX: &str = "Sholl SL ";
/// Prefix of the log-log diagnostic plot
pub const LOGLOG_PLOT_PREFIX: &str = "Sholl LL ";
/// Prefix of the fitted-polynomial plot
pub const FIT_PLOT_PREFIX: &str = "Sholl Fit ";

// Plot rendering settings
/// Width of diagnostic plots in pixels
pub const PLOT_WIDTH: u32 = 800;
/// Height of diagnostic plots in pixels
pub const PLOT_HEIGHT: u32 = 600;
/// Number of samples used to draw the fitted polynomial curve
pub const PLOT_CURVE_SAMPLES: usize = 200;
