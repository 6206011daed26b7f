//! End-to-end validation of the analysis pipeline over synthetic masks

use shollscan::io::args::AnalysisRequest;
use shollscan::io::cli::{AnalysisOutcome, OutputPaths, analyze_mask};
use shollscan::parser::profile::Calibration;
use std::fs;
use std::path::Path;

// 33x33 plus shape: 3-wide arms through the center reaching the edges,
// giving a profile that starts at one intersection and widens to four
fn write_plus_mask(path: &Path) {
    let size = 33u32;
    let mut img = image::GrayImage::new(size, size);
    for i in 0..size {
        for offset in 0..3u32 {
            let lane = 15 + offset;
            img.put_pixel(i, lane, image::Luma([255u8]));
            img.put_pixel(lane, i, image::Luma([255u8]));
        }
    }
    img.save(path).unwrap();
}

fn write_single_pixel_mask(path: &Path) {
    let mut img = image::GrayImage::new(33, 33);
    img.put_pixel(16, 16, image::Luma([255u8]));
    img.save(path).unwrap();
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<String>) {
    let contents = fs::read_to_string(path).unwrap();
    let mut lines = contents.lines();
    let header = lines
        .next()
        .unwrap_or("")
        .split(',')
        .map(str::to_string)
        .collect();
    let values = lines
        .next()
        .unwrap_or("")
        .split(',')
        .map(str::to_string)
        .collect();
    (header, values)
}

fn field<'a>(header: &[String], values: &'a [String], key: &str) -> &'a str {
    let index = header
        .iter()
        .position(|k| k == key)
        .unwrap_or_else(|| panic!("missing CSV column '{key}'"));
    values.get(index).map_or("", String::as_str)
}

#[test]
fn test_pipeline_writes_metrics_and_rasters() {
    let dir = tempfile::tempdir().unwrap();
    let mask_path = dir.path().join("cell_01.tif");
    write_plus_mask(&mask_path);

    let request = AnalysisRequest::new(
        0.0,
        2.0,
        dir.path().to_path_buf(),
        "cell_01.tif".to_string(),
        "400".to_string(),
    )
    .unwrap();
    let outcome = analyze_mask(&mask_path, &request, &Calibration::pixels(), None).unwrap();

    let paths = OutputPaths::new(dir.path(), "cell_01");
    assert!(paths.csv().exists());
    assert!(paths.mask().exists());
    assert!(paths.semi_log_plot().exists());
    assert!(paths.log_log_plot().exists());

    let (header, values) = read_csv(&paths.csv());
    assert_eq!(header.len(), 29);
    assert_eq!(values.len(), 29);
    assert_eq!(header.first().map(String::as_str), Some("Mask Name"));
    assert_eq!(field(&header, &values, "Mask Name"), "cell_01.tif");
    assert_eq!(field(&header, &values, "TCS Value"), "400");
    assert_eq!(field(&header, &values, "Maximum Number of Intersections"), "4");

    // The fit plot and the polynomial degree field agree with the outcome
    match outcome {
        AnalysisOutcome::Completed {
            best_degree: Some(degree),
        } => {
            assert!(paths.fit_plot().exists());
            assert_eq!(field(&header, &values, "Polynomial Degree"), degree.to_string());
            assert_ne!(field(&header, &values, "Mean Value"), "NaN");
        }
        AnalysisOutcome::Completed { best_degree: None } => {
            assert!(!paths.fit_plot().exists());
            for key in [
                "Kurtosis (fit)",
                "Ramification Index (fit)",
                "Critical Value",
                "Critical Radius",
                "Mean Value",
                "Polynomial Degree",
            ] {
                assert_eq!(field(&header, &values, key), "NaN");
            }
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn test_all_zero_profile_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mask_path = dir.path().join("cell_02.tif");
    write_single_pixel_mask(&mask_path);

    // Radii 3, 8, 13, 18 never touch the single foreground pixel
    let request = AnalysisRequest::new(
        3.0,
        5.0,
        dir.path().to_path_buf(),
        "cell_02.tif".to_string(),
        "400".to_string(),
    )
    .unwrap();
    let outcome = analyze_mask(&mask_path, &request, &Calibration::pixels(), None).unwrap();
    assert_eq!(outcome, AnalysisOutcome::EmptyProfile);

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1, "only the input mask should remain");
}

#[test]
fn test_blank_mask_fails_parse_and_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mask_path = dir.path().join("cell_03.tif");
    let img = image::GrayImage::new(33, 33);
    img.save(&mask_path).unwrap();

    let request = AnalysisRequest::new(
        0.0,
        1.0,
        dir.path().to_path_buf(),
        "cell_03.tif".to_string(),
        "400".to_string(),
    )
    .unwrap();
    let outcome = analyze_mask(&mask_path, &request, &Calibration::pixels(), None).unwrap();
    assert_eq!(outcome, AnalysisOutcome::ParseFailed);

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1, "only the input mask should remain");
}

#[test]
fn test_rerun_reproduces_identical_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mask_path = dir.path().join("cell_04.tif");
    write_plus_mask(&mask_path);

    let request = AnalysisRequest::new(
        0.0,
        2.0,
        dir.path().to_path_buf(),
        "cell_04.tif".to_string(),
        "400".to_string(),
    )
    .unwrap();

    analyze_mask(&mask_path, &request, &Calibration::pixels(), None).unwrap();
    let paths = OutputPaths::new(dir.path(), "cell_04");
    let first_csv = fs::read(paths.csv()).unwrap();
    let first_mask = fs::read(paths.mask()).unwrap();

    analyze_mask(&mask_path, &request, &Calibration::pixels(), None).unwrap();
    assert_eq!(fs::read(paths.csv()).unwrap(), first_csv);
    assert_eq!(fs::read(paths.mask()).unwrap(), first_mask);
}

#[test]
fn test_center_override_shifts_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let mask_path = dir.path().join("cell_05.tif");
    write_plus_mask(&mask_path);

    let request = AnalysisRequest::new(
        0.0,
        2.0,
        dir.path().to_path_buf(),
        "cell_05.tif".to_string(),
        "400".to_string(),
    )
    .unwrap();
    // Centered on an arm away from the crossing, small circles see the arm
    // as a single run rather than four
    let outcome = analyze_mask(
        &mask_path,
        &request,
        &Calibration::pixels(),
        Some((6.0, 16.0)),
    )
    .unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Completed { .. }));

    let paths = OutputPaths::new(dir.path(), "cell_05");
    let (header, values) = read_csv(&paths.csv());
    assert_eq!(field(&header, &values, "Primary Branches"), "1");
}
