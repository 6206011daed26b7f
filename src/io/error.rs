//! Error types for analysis operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all analysis operations
#[derive(Debug)]
pub enum ShollError {
    /// Failed to load a mask image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a raster image to disk
    ImageExport {
        /// Path where the export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// Mask image cannot be analyzed
    InvalidMask {
        /// Display title of the image
        title: String,
        /// Description of what is wrong with the mask
        reason: String,
    },

    /// Intersection profile violates a structural invariant
    InvalidProfile {
        /// Description of the violation
        reason: String,
    },

    /// Required key absent from the argument string
    MissingArgument {
        /// Name of the missing key
        key: String,
    },

    /// Configuration value failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Numerical computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// Failed to write the metrics CSV
    Report {
        /// Path where the CSV was being written
        path: PathBuf,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// Failed to render a diagnostic plot
    Plot {
        /// Name of the plot being rendered
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for ShollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidMask { title, reason } => {
                write!(f, "Mask '{title}' cannot be analyzed: {reason}")
            }
            Self::InvalidProfile { reason } => {
                write!(f, "Invalid intersection profile: {reason}")
            }
            Self::MissingArgument { key } => {
                write!(f, "Required argument '{key}' is missing")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
            Self::Report { path, source } => {
                write!(
                    f,
                    "Failed to write metrics to '{}': {source}",
                    path.display()
                )
            }
            Self::Plot { operation, reason } => {
                write!(f, "Failed to render {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for ShollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Report { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for analysis results
pub type Result<T> = std::result::Result<T, ShollError>;

impl From<std::io::Error> for ShollError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> ShollError {
    ShollError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> ShollError {
    ShollError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create a plot rendering error
pub fn plot_error(operation: &'static str, reason: &impl ToString) -> ShollError {
    ShollError::Plot {
        operation,
        reason: reason.to_string(),
    }
}
