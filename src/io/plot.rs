//! Diagnostic plot rendering
//!
//! Plots are drawn with the plotters bitmap backend into an RGB buffer and
//! saved through the image pipeline, so the on-disk format matches the other
//! rasters. Charts carry mesh lines, sample points, and fitted lines only;
//! tick labels are deliberately not rendered (text rasterization depends on
//! host fonts, which headless analysis machines often lack).

use crate::analysis::linear::LinearProfileStats;
use crate::analysis::normalized::{NormMethod, NormalizedProfileStats};
use crate::io::configuration::{PLOT_CURVE_SAMPLES, PLOT_HEIGHT, PLOT_WIDTH};
use crate::io::error::{Result, plot_error};
use crate::io::image::save_rgb_image;
use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::drawing::IntoDrawingArea;
use plotters::element::Circle;
use plotters::series::LineSeries;
use plotters::style::colors::{BLUE, RED, WHITE};
use plotters::style::Color;
use std::path::Path;

/// Render the regression diagnostic plot for a normalized profile view
///
/// Scatter of the transformed samples with the fitted regression line
/// overlaid when it is defined.
///
/// # Errors
///
/// Returns an error if drawing fails or the raster cannot be saved
pub fn save_normalized_plot(stats: &NormalizedProfileStats, path: &Path) -> Result<()> {
    let label = match stats.method() {
        NormMethod::SemiLog => "semi-log plot",
        NormMethod::LogLog => "log-log plot",
    };
    let points = stats.points().to_vec();
    let (x_min, x_max) = padded_range(points.iter().map(|&(x, _)| x));
    let regression = stats.regression();

    let mut line = Vec::new();
    if regression.slope.is_finite() && regression.intercept.is_finite() {
        line.push((x_min, regression.slope.mul_add(x_min, regression.intercept)));
        line.push((x_max, regression.slope.mul_add(x_max, regression.intercept)));
    }
    let (y_min, y_max) = padded_range(
        points
            .iter()
            .map(|&(_, y)| y)
            .chain(line.iter().map(|&(_, y)| y)),
    );

    render_chart(label, (x_min, x_max), (y_min, y_max), &points, &line, path)
}

/// Render the sampled profile with the fitted polynomial curve
///
/// # Errors
///
/// Returns an error if drawing fails or the raster cannot be saved
pub fn save_fit_plot(stats: &LinearProfileStats, path: &Path) -> Result<()> {
    let radii = stats.radii();
    let counts = stats.profile().counts();
    let points: Vec<(f64, f64)> = radii.iter().copied().zip(counts.iter().copied()).collect();

    let mut curve = Vec::new();
    if let Some(poly) = stats.polynomial() {
        let first = radii.first().copied().unwrap_or(0.0);
        let last = radii.last().copied().unwrap_or(1.0);
        if last > first {
            let step = (last - first) / (PLOT_CURVE_SAMPLES as f64 - 1.0);
            for i in 0..PLOT_CURVE_SAMPLES {
                let x = (i as f64).mul_add(step, first);
                curve.push((x, poly.eval(x)));
            }
        }
    }

    let (x_min, x_max) = padded_range(points.iter().map(|&(x, _)| x));
    let (y_min, y_max) = padded_range(
        points
            .iter()
            .map(|&(_, y)| y)
            .chain(curve.iter().map(|&(_, y)| y)),
    );

    render_chart(
        "fitted-polynomial plot",
        (x_min, x_max),
        (y_min, y_max),
        &points,
        &curve,
        path,
    )
}

fn render_chart(
    label: &'static str,
    x_range: (f64, f64),
    y_range: (f64, f64),
    points: &[(f64, f64)],
    line: &[(f64, f64)],
    path: &Path,
) -> Result<()> {
    let mut buffer = vec![0u8; (PLOT_WIDTH * PLOT_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| plot_error(label, &e))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(12)
            .x_label_area_size(20)
            .y_label_area_size(28)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .map_err(|e| plot_error(label, &e))?;

        chart
            .configure_mesh()
            .x_labels(0)
            .y_labels(0)
            .draw()
            .map_err(|e| plot_error(label, &e))?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
            )
            .map_err(|e| plot_error(label, &e))?;

        if line.len() >= 2 {
            chart
                .draw_series(LineSeries::new(line.iter().copied(), &RED))
                .map_err(|e| plot_error(label, &e))?;
        }

        root.present().map_err(|e| plot_error(label, &e))?;
    }

    save_rgb_image(buffer, PLOT_WIDTH, PLOT_HEIGHT, path)
}

// Finite data range with 5% padding; degenerate inputs fall back to a unit span
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values {
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max - min < 1e-9 {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::{padded_range, save_fit_plot, save_normalized_plot};
    use crate::analysis::linear::LinearProfileStats;
    use crate::analysis::normalized::{NormMethod, NormalizedProfileStats};
    use crate::parser::profile::{Profile, ProfileEntry};

    fn bell_profile() -> Profile {
        let entries = (1..=20)
            .map(|i| {
                let radius = f64::from(i);
                ProfileEntry {
                    radius,
                    count: (-(radius - 10.0)).mul_add(radius - 10.0, 110.0) / 10.0,
                }
            })
            .collect();
        Profile::new(entries).unwrap()
    }

    #[test]
    fn test_normalized_plot_writes_a_raster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sholl SL cell.tif");
        let profile = bell_profile();
        let stats = NormalizedProfileStats::new(&profile, NormMethod::SemiLog);
        save_normalized_plot(&stats, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_fit_plot_writes_a_raster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sholl Fit cell.tif");
        let mut stats = LinearProfileStats::new(bell_profile());
        stats.fit_polynomial(2).unwrap();
        save_fit_plot(&stats, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_padded_range_handles_degenerate_data() {
        let (lo, hi) = padded_range([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
        let (lo, hi) = padded_range(std::iter::empty());
        assert!((lo, hi) == (0.0, 1.0));
    }
}
