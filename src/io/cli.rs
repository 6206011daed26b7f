//! Command-line interface and per-mask pipeline orchestration
//!
//! The pipeline for one mask runs strictly in sequence: parse the image into
//! an intersection profile, trim and validate it, derive the linear and
//! normalized statistics, assemble and export the metrics record, then
//! search for a best-fit polynomial and refresh the record when one is
//! found. Parse failures and all-zero profiles are logged and skip the mask
//! without writing any output; all other failures propagate.

use crate::analysis::linear::LinearProfileStats;
use crate::analysis::metrics::{append_percentile_metrics, apply_fit_metrics, baseline_record};
use crate::analysis::normalized::{NormMethod, NormalizedProfileStats};
use crate::io::args::AnalysisRequest;
use crate::io::configuration::{
    CSV_PREFIX, DEFAULT_PIXEL_SIZE, DEFAULT_SPATIAL_UNIT, DEFAULT_START_RADIUS, DEFAULT_STEP_SIZE,
    DEFAULT_TCS_VALUE, FIT_PLOT_PREFIX, KS_PVALUE_CUTOFF, LOGLOG_PLOT_PREFIX, MASK_PREFIX,
    MAX_FIT_DEGREE, MIN_ADJUSTED_RSQUARED, MIN_FIT_DEGREE, SEMILOG_PLOT_PREFIX,
};
use crate::io::error::{Result, ShollError, invalid_parameter};
use crate::io::image::{MaskImage, save_counts_image};
use crate::io::plot::{save_fit_plot, save_normalized_plot};
use crate::io::progress::ProgressManager;
use crate::io::report::write_metrics_csv;
use crate::parser::profile::Calibration;
use crate::parser::radial::ImageParser;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Command-line arguments for the Sholl analysis tool
#[derive(Parser)]
#[command(name = "shollscan")]
#[command(
    author,
    version,
    about = "Sholl analysis metrics for segmented microglia cell masks"
)]
pub struct Cli {
    /// Mask image file or directory of masks to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Opaque argument string: startRad=..,stepSize=..,saveLoc=..,maskName=..,tcsVal=..
    #[arg(short, long)]
    pub params: Option<String>,

    /// First sampling radius, in calibrated units
    #[arg(long)]
    pub start_radius: Option<f64>,

    /// Step between sampling radii, in calibrated units
    #[arg(long)]
    pub step_size: Option<f64>,

    /// Directory receiving the output files (defaults to the mask's directory)
    #[arg(short, long)]
    pub save_dir: Option<PathBuf>,

    /// Mask name recorded in the metrics (defaults to the file name)
    #[arg(long)]
    pub mask_name: Option<String>,

    /// Tissue/cell-state label recorded in the metrics
    #[arg(long)]
    pub tcs_value: Option<String>,

    /// Physical width of one pixel
    #[arg(long, default_value_t = DEFAULT_PIXEL_SIZE)]
    pub pixel_size: f64,

    /// Name of the physical unit
    #[arg(long, default_value = DEFAULT_SPATIAL_UNIT)]
    pub unit: String,

    /// Analysis center in pixel coordinates, as X,Y (defaults to the
    /// foreground centroid)
    #[arg(long, value_parser = parse_center)]
    pub center: Option<(f64, f64)>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process masks even if their CSV output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing outputs should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    fn calibration(&self) -> Result<Calibration> {
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            return Err(invalid_parameter(
                "pixel-size",
                &self.pixel_size,
                &"pixel size must be a positive number",
            ));
        }
        Ok(Calibration {
            pixel_width: self.pixel_size,
            unit: self.unit.clone(),
        })
    }

    /// Build the analysis request for one mask file
    ///
    /// Explicit flags override `--params` values, which override defaults.
    /// In directory mode the mask name always derives from the file so each
    /// cell keeps its own identity.
    fn request_for(&self, mask_path: &Path, prefer_file_name: bool) -> Result<AnalysisRequest> {
        let base = match &self.params {
            Some(params) => Some(AnalysisRequest::from_key_values(params)?),
            None => None,
        };

        let file_name = mask_path.file_name().map_or_else(
            || mask_path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );

        let start_radius = self
            .start_radius
            .or_else(|| base.as_ref().map(|b| b.start_radius))
            .unwrap_or(DEFAULT_START_RADIUS);
        let step_size = self
            .step_size
            .or_else(|| base.as_ref().map(|b| b.step_size))
            .unwrap_or(DEFAULT_STEP_SIZE);
        let save_dir = self
            .save_dir
            .clone()
            .or_else(|| base.as_ref().map(|b| b.save_dir.clone()))
            .unwrap_or_else(|| {
                mask_path
                    .parent()
                    .map_or_else(PathBuf::new, Path::to_path_buf)
            });
        let mask_name = if prefer_file_name {
            file_name
        } else {
            self.mask_name
                .clone()
                .or_else(|| base.as_ref().map(|b| b.mask_name.clone()))
                .unwrap_or(file_name)
        };
        let tcs_value = self
            .tcs_value
            .clone()
            .or_else(|| base.as_ref().map(|b| b.tcs_value.clone()))
            .unwrap_or_else(|| DEFAULT_TCS_VALUE.to_string());

        AnalysisRequest::new(start_radius, step_size, save_dir, mask_name, tcs_value)
    }
}

fn parse_center(raw: &str) -> std::result::Result<(f64, f64), String> {
    let Some((x, y)) = raw.split_once(',') else {
        return Err("expected X,Y".to_string());
    };
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid X coordinate: {e}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid Y coordinate: {e}"))?;
    Ok((x, y))
}

/// Deterministic output file layout for one cell
#[derive(Debug, Clone)]
pub struct OutputPaths {
    dir: PathBuf,
    cell_name: String,
}

impl OutputPaths {
    /// Layout under the save directory for the given cell
    pub fn new(dir: &Path, cell_name: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            cell_name: cell_name.to_string(),
        }
    }

    fn named(&self, prefix: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{prefix}{}.{extension}", self.cell_name))
    }

    /// Metrics CSV path
    pub fn csv(&self) -> PathBuf {
        self.named(CSV_PREFIX, "csv")
    }

    /// Intersection-count raster path
    pub fn mask(&self) -> PathBuf {
        self.named(MASK_PREFIX, "tif")
    }

    /// Semi-log diagnostic plot path
    pub fn semi_log_plot(&self) -> PathBuf {
        self.named(SEMILOG_PLOT_PREFIX, "tif")
    }

    /// Log-log diagnostic plot path
    pub fn log_log_plot(&self) -> PathBuf {
        self.named(LOGLOG_PLOT_PREFIX, "tif")
    }

    /// Fitted-polynomial plot path
    pub fn fit_plot(&self) -> PathBuf {
        self.named(FIT_PLOT_PREFIX, "tif")
    }
}

/// How one mask's analysis ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The pipeline ran to completion and wrote its outputs
    Completed {
        /// Best-fitting polynomial degree, when one qualified
        best_degree: Option<usize>,
    },
    /// The parser could not run over the mask; nothing was written
    ParseFailed,
    /// Every intersection count was zero; nothing was written
    EmptyProfile,
}

/// Run the full analysis pipeline for one mask image
///
/// Parse failures and all-zero profiles are logged and reported through the
/// outcome without writing any file; they do not abort a batch.
///
/// # Errors
///
/// Returns an error for unexpected failures: unreadable images, output I/O
/// errors, or fit/plot computation failures
pub fn analyze_mask(
    mask_path: &Path,
    request: &AnalysisRequest,
    calibration: &Calibration,
    center: Option<(f64, f64)>,
) -> Result<AnalysisOutcome> {
    let image = MaskImage::load(mask_path)?;

    let mut parser = match ImageParser::new(
        &image,
        calibration.clone(),
        request.start_radius,
        request.step_size,
    ) {
        Ok(parser) => parser,
        Err(err @ ShollError::InvalidMask { .. }) => {
            log::error!("{err}");
            return Ok(AnalysisOutcome::ParseFailed);
        }
        Err(other) => return Err(other),
    };
    if let Some(center) = center {
        parser.set_center(center);
    }

    let parsed = match parser.parse() {
        Ok(parsed) => parsed,
        Err(err @ ShollError::InvalidMask { .. }) => {
            log::error!("{err}");
            return Ok(AnalysisOutcome::ParseFailed);
        }
        Err(other) => return Err(other),
    };

    let profile = parsed.profile.trimmed();
    if profile.is_empty() {
        log::error!(
            "All intersection counts were zero for '{}'; invalid threshold range?",
            image.title()
        );
        return Ok(AnalysisOutcome::EmptyProfile);
    }

    let paths = OutputPaths::new(&request.save_dir, &request.cell_name());
    save_counts_image(&parsed.counts_mask, &paths.mask())?;

    let mut stats = LinearProfileStats::new(profile.clone());
    let semi_log = NormalizedProfileStats::new(&profile, NormMethod::SemiLog);
    let log_log = NormalizedProfileStats::new(&profile, NormMethod::LogLog);

    let mut record = baseline_record(
        &request.mask_name,
        &request.tcs_value,
        &stats,
        &semi_log,
        &log_log,
    );
    append_percentile_metrics(&mut record, &semi_log, &log_log);
    write_metrics_csv(&record, &paths.csv())?;

    save_normalized_plot(&semi_log, &paths.semi_log_plot())?;
    save_normalized_plot(&log_log, &paths.log_log_plot())?;

    let best_degree = stats.find_best_fit(
        MIN_FIT_DEGREE..=MAX_FIT_DEGREE,
        MIN_ADJUSTED_RSQUARED,
        KS_PVALUE_CUTOFF,
    );
    if let Some(degree) = best_degree {
        stats.fit_polynomial(degree)?;
        save_fit_plot(&stats, &paths.fit_plot())?;
        apply_fit_metrics(&mut record, &stats, degree);
        write_metrics_csv(&record, &paths.csv())?;
    }

    Ok(AnalysisOutcome::Completed { best_degree })
}

const MASK_EXTENSIONS: [&str; 3] = ["tif", "tiff", "png"];

fn has_mask_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MASK_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// Orchestrates batch processing of mask images with progress tracking
pub struct MaskProcessor {
    cli: Cli,
    progress: Option<ProgressManager>,
}

impl MaskProcessor {
    /// Create a new processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = cli.should_show_progress().then(ProgressManager::new);
        Self { cli, progress }
    }

    /// Process masks according to the CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation, configuration, or an
    /// unexpected per-mask failure occurs
    pub fn process(&mut self) -> Result<()> {
        let masks = self.collect_masks()?;
        if masks.is_empty() {
            return Ok(());
        }

        let calibration = self.cli.calibration()?;
        let batch = self.cli.target.is_dir();

        if let Some(progress) = &mut self.progress {
            progress.initialize(masks.len());
        }

        for mask in &masks {
            if let Some(progress) = &self.progress {
                progress.start_mask(mask);
            }
            let request = self.cli.request_for(mask, batch)?;
            analyze_mask(mask, &request, &calibration, self.cli.center)?;
            if let Some(progress) = &self.progress {
                progress.complete_mask();
            }
        }

        if let Some(progress) = &self.progress {
            progress.finish();
        }
        Ok(())
    }

    fn collect_masks(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if !has_mask_extension(&self.cli.target) {
                return Err(invalid_parameter(
                    "target",
                    &self.cli.target.display(),
                    &"target file must be a tif/tiff/png mask image",
                ));
            }
            if self.should_process(&self.cli.target) {
                Ok(vec![self.cli.target.clone()])
            } else {
                Ok(vec![])
            }
        } else if self.cli.target.is_dir() {
            let mut masks = Vec::new();
            let entries = std::fs::read_dir(&self.cli.target).map_err(|e| {
                ShollError::FileSystem {
                    path: self.cli.target.clone(),
                    operation: "read directory",
                    source: e,
                }
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|e| ShollError::FileSystem {
                        path: self.cli.target.clone(),
                        operation: "read directory entry",
                        source: e,
                    })?
                    .path();
                if has_mask_extension(&path) && self.should_process(&path) {
                    masks.push(path);
                }
            }
            masks.sort();
            Ok(masks)
        } else {
            Err(invalid_parameter(
                "target",
                &self.cli.target.display(),
                &"target must be a mask image or a directory",
            ))
        }
    }

    fn should_process(&self, mask_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }
        let Ok(request) = self
            .cli
            .request_for(mask_path, self.cli.target.is_dir())
        else {
            // Let process() surface the configuration error
            return true;
        };
        let csv = OutputPaths::new(&request.save_dir, &request.cell_name()).csv();
        if csv.exists() {
            log::info!("Skipping {} (output exists)", mask_path.display());
            false
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputPaths, parse_center};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_output_paths_follow_the_naming_pattern() {
        let paths = OutputPaths::new(Path::new("/data/out"), "cell_01");
        assert_eq!(paths.csv(), Path::new("/data/out/Sholl cell_01.csv"));
        assert_eq!(paths.mask(), Path::new("/data/out/Sholl Mask cell_01.tif"));
        assert_eq!(
            paths.semi_log_plot(),
            Path::new("/data/out/Sholl SL cell_01.tif")
        );
        assert_eq!(
            paths.log_log_plot(),
            Path::new("/data/out/Sholl LL cell_01.tif")
        );
        assert_eq!(paths.fit_plot(), Path::new("/data/out/Sholl Fit cell_01.tif"));
    }

    #[test]
    fn test_parse_center() {
        assert_eq!(parse_center("12.5, 30"), Ok((12.5, 30.0)));
        assert!(parse_center("12.5").is_err());
        assert!(parse_center("a,b").is_err());
    }

    #[test]
    fn test_flags_override_params_string() {
        let cli = Cli::parse_from([
            "shollscan",
            "cell_01.tif",
            "--params",
            "startRad=5,stepSize=2,saveLoc=/data/out,maskName=other.tif,tcsVal=300",
            "--step-size",
            "4",
        ]);
        let request = cli.request_for(Path::new("cell_01.tif"), false).unwrap();
        assert!((request.start_radius - 5.0).abs() < f64::EPSILON);
        assert!((request.step_size - 4.0).abs() < f64::EPSILON);
        assert_eq!(request.mask_name, "other.tif");
        assert_eq!(request.tcs_value, "300");
    }

    #[test]
    fn test_directory_mode_names_masks_by_file() {
        let cli = Cli::parse_from([
            "shollscan",
            "masks",
            "--params",
            "startRad=0,stepSize=1,saveLoc=/data/out,maskName=other.tif,tcsVal=300",
        ]);
        let request = cli
            .request_for(Path::new("masks/cell_07.tif"), true)
            .unwrap();
        assert_eq!(request.mask_name, "cell_07.tif");
        assert_eq!(request.cell_name(), "cell_07");
    }

    #[test]
    fn test_defaults_without_params() {
        let cli = Cli::parse_from(["shollscan", "data/cell_03.png"]);
        let request = cli.request_for(Path::new("data/cell_03.png"), false).unwrap();
        assert!((request.start_radius - 0.0).abs() < f64::EPSILON);
        assert!((request.step_size - 1.0).abs() < f64::EPSILON);
        assert_eq!(request.save_dir, Path::new("data"));
        assert_eq!(request.mask_name, "cell_03.png");
        assert_eq!(request.tcs_value, "NA");
    }
}
