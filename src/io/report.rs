//! CSV metrics export
//!
//! One CSV per cell with exactly two rows: the metric names in record order
//! and the corresponding values. Re-running a cell overwrites its CSV
//! silently.

use crate::analysis::metrics::MetricsRecord;
use crate::io::error::{Result, ShollError};
use std::path::Path;

/// Write the metrics record as a header row plus one value row
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the CSV
/// cannot be written
pub fn write_metrics_csv(record: &MetricsRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ShollError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| ShollError::Report {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer
        .write_record(record.keys())
        .map_err(|e| ShollError::Report {
            path: path.to_path_buf(),
            source: e,
        })?;
    writer
        .write_record(record.rendered_values())
        .map_err(|e| ShollError::Report {
            path: path.to_path_buf(),
            source: e,
        })?;
    writer.flush().map_err(|e| ShollError::FileSystem {
        path: path.to_path_buf(),
        operation: "flush metrics",
        source: e,
    })?;
    Ok(())
}
