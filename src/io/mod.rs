//! Input/output operations, CLI orchestration, and error handling

/// Key=value analysis request parsing
pub mod args;
/// Command-line interface and per-mask pipeline orchestration
pub mod cli;
/// Pipeline constants and runtime configuration defaults
pub mod configuration;
/// Error types for analysis operations
pub mod error;
/// Mask image loading and count raster export
pub mod image;
/// Diagnostic plot rendering
pub mod plot;
/// Batch progress display
pub mod progress;
/// CSV metrics export
pub mod report;
