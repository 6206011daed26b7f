//! Sholl analysis of segmented microglia cell masks
//!
//! The crate samples concentric circles around a cell's analysis center,
//! counts process intersections at each radius, and derives branching
//! complexity metrics from the resulting profile: descriptive statistics,
//! semi-log and log-log normalized regressions, and a best-fit polynomial
//! with critical value/radius summaries. Results are exported per cell as a
//! CSV record, an intersection-count raster, and diagnostic plots.

#![forbid(unsafe_code)]

/// Profile statistics, normalized regressions, and the metrics record
pub mod analysis;
/// Input/output operations, CLI orchestration, and error handling
pub mod io;
/// Mathematical utilities for regression, fitting, and hypothesis testing
pub mod math;
/// Radial intersection parsing of binary mask images
pub mod parser;

pub use io::error::{Result, ShollError};
