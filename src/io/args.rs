//! Key=value analysis request parsing
//!
//! The request can be assembled from structured CLI flags or from a single
//! opaque `key=value,key=value` string with the required keys `startRad`,
//! `stepSize`, `saveLoc`, `maskName` and `tcsVal`. A missing key or an
//! unparseable numeric field is a fatal configuration error.

use crate::io::error::{Result, ShollError, invalid_parameter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Immutable configuration of one cell's analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// First sampling radius, in calibrated units
    pub start_radius: f64,
    /// Step between sampling radii, in calibrated units
    pub step_size: f64,
    /// Directory receiving every output file
    pub save_dir: PathBuf,
    /// File name of the mask, recorded verbatim in the metrics
    pub mask_name: String,
    /// Tissue/cell-state label, recorded verbatim in the metrics
    pub tcs_value: String,
}

impl AnalysisRequest {
    /// Build a request, validating the sampling parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the start radius is negative or the step size is
    /// not positive
    pub fn new(
        start_radius: f64,
        step_size: f64,
        save_dir: PathBuf,
        mask_name: String,
        tcs_value: String,
    ) -> Result<Self> {
        if !start_radius.is_finite() || start_radius < 0.0 {
            return Err(invalid_parameter(
                "startRad",
                &start_radius,
                &"start radius must be a non-negative number",
            ));
        }
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(invalid_parameter(
                "stepSize",
                &step_size,
                &"step size must be a positive number",
            ));
        }
        Ok(Self {
            start_radius,
            step_size,
            save_dir,
            mask_name,
            tcs_value,
        })
    }

    /// Parse a request from a comma-separated `key=value` string
    ///
    /// # Errors
    ///
    /// Returns an error if any of the five required keys is absent, a
    /// numeric field does not parse, or a parameter fails validation
    pub fn from_key_values(arguments: &str) -> Result<Self> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for pair in arguments.split(',') {
            let trimmed = pair.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(invalid_parameter(
                    "params",
                    &trimmed,
                    &"expected key=value",
                ));
            };
            fields.insert(key.trim(), value.trim());
        }

        let start_radius = parse_float(&fields, "startRad")?;
        let step_size = parse_float(&fields, "stepSize")?;
        let save_dir = PathBuf::from(require(&fields, "saveLoc")?);
        let mask_name = require(&fields, "maskName")?.to_string();
        let tcs_value = require(&fields, "tcsVal")?.to_string();

        Self::new(start_radius, step_size, save_dir, mask_name, tcs_value)
    }

    /// Cell identifier: the mask file name without its extension
    pub fn cell_name(&self) -> String {
        Path::new(&self.mask_name)
            .file_stem()
            .map_or_else(|| self.mask_name.clone(), |stem| {
                stem.to_string_lossy().into_owned()
            })
    }
}

fn require<'a>(fields: &HashMap<&str, &'a str>, key: &str) -> Result<&'a str> {
    fields
        .get(key)
        .copied()
        .ok_or_else(|| ShollError::MissingArgument {
            key: key.to_string(),
        })
}

fn parse_float(fields: &HashMap<&str, &str>, key: &'static str) -> Result<f64> {
    let raw = require(fields, key)?;
    raw.parse::<f64>()
        .map_err(|e| invalid_parameter(key, &raw, &e))
}

#[cfg(test)]
mod tests {
    use super::AnalysisRequest;
    use std::path::PathBuf;

    #[test]
    fn test_full_argument_string_parses() {
        let request = AnalysisRequest::from_key_values(
            "startRad=5.5,stepSize=2,saveLoc=/tmp/out,maskName=cell_07.tif,tcsVal=500",
        )
        .unwrap();
        assert!((request.start_radius - 5.5).abs() < f64::EPSILON);
        assert!((request.step_size - 2.0).abs() < f64::EPSILON);
        assert_eq!(request.save_dir, PathBuf::from("/tmp/out"));
        assert_eq!(request.mask_name, "cell_07.tif");
        assert_eq!(request.tcs_value, "500");
        assert_eq!(request.cell_name(), "cell_07");
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let result = AnalysisRequest::from_key_values(
            "startRad=0,stepSize=1,saveLoc=/tmp,maskName=cell.tif",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unparseable_numeric_is_fatal() {
        let result = AnalysisRequest::from_key_values(
            "startRad=abc,stepSize=1,saveLoc=/tmp,maskName=cell.tif,tcsVal=1",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sampling_parameters_are_validated() {
        assert!(
            AnalysisRequest::new(-1.0, 1.0, PathBuf::new(), String::new(), String::new()).is_err()
        );
        assert!(
            AnalysisRequest::new(0.0, 0.0, PathBuf::new(), String::new(), String::new()).is_err()
        );
    }

    #[test]
    fn test_cell_name_without_extension_passes_through() {
        let request = AnalysisRequest::new(
            0.0,
            1.0,
            PathBuf::from("out"),
            "candidate mask".to_string(),
            "NA".to_string(),
        )
        .unwrap();
        assert_eq!(request.cell_name(), "candidate mask");
    }
}
