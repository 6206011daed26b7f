//! 2D radial intersection parser
//!
//! Samples concentric circles around the analysis center at roughly
//! one-pixel arc resolution and counts contiguous foreground runs along each
//! circumference. Sampling always covers the full 360 degrees and the first
//! channel/frame/slice only; the radius range runs from the configured start
//! radius to the maximum possible radius of the image.

use crate::io::error::{Result, ShollError};
use crate::io::image::MaskImage;
use crate::parser::profile::{Calibration, Profile, ProfileEntry};
use ndarray::Array2;
use std::f64::consts::TAU;

/// Profile and synthetic count raster produced by one parse
#[derive(Debug, Clone)]
pub struct ParsedImage {
    /// Intersection profile over the sampled radii
    pub profile: Profile,
    /// Raster assigning each foreground pixel the intersection count of its
    /// nearest sampling radius
    pub counts_mask: Array2<u16>,
}

/// Radial intersection parser over a thresholded 2D mask
#[derive(Debug)]
pub struct ImageParser<'a> {
    image: &'a MaskImage,
    calibration: Calibration,
    /// Analysis center in pixel coordinates
    center: (f64, f64),
    /// Start radius in calibrated units
    start_radius: f64,
    /// Step between radii in calibrated units
    step_size: f64,
}

impl<'a> ImageParser<'a> {
    /// Create a parser with the center placed on the mask's foreground
    /// centroid
    ///
    /// # Errors
    ///
    /// Returns an error if the mask has no foreground pixels
    pub fn new(
        image: &'a MaskImage,
        calibration: Calibration,
        start_radius: f64,
        step_size: f64,
    ) -> Result<Self> {
        let center = image.centroid().ok_or_else(|| ShollError::InvalidMask {
            title: image.title().to_string(),
            reason: "no foreground pixels".to_string(),
        })?;
        Ok(Self {
            image,
            calibration,
            center,
            start_radius,
            step_size,
        })
    }

    /// Override the analysis center (pixel coordinates)
    pub fn set_center(&mut self, center: (f64, f64)) {
        self.center = center;
    }

    /// Analysis center in pixel coordinates
    pub const fn center(&self) -> (f64, f64) {
        self.center
    }

    /// Distance from the center to the farthest image corner, in calibrated
    /// units
    pub fn max_possible_radius(&self) -> f64 {
        let (center_x, center_y) = self.center;
        let far_x = center_x.max(self.image.width() as f64 - 1.0 - center_x);
        let far_y = center_y.max(self.image.height() as f64 - 1.0 - center_y);
        self.calibration.calibrated(far_x.hypot(far_y))
    }

    /// Sampling radii from the start radius up to the maximum possible
    /// radius
    pub fn radii(&self) -> Vec<f64> {
        let max_radius = self.max_possible_radius();
        let mut radii = Vec::new();
        if self.step_size <= 0.0 {
            return radii;
        }
        let mut index = 0u32;
        loop {
            let radius = f64::from(index).mul_add(self.step_size, self.start_radius);
            if radius > max_radius {
                break;
            }
            radii.push(radius);
            index += 1;
        }
        radii
    }

    /// Parse the image into a profile and a count raster
    ///
    /// # Errors
    ///
    /// Returns an error if the radius range is empty (start radius beyond
    /// the image) or the sampled radii are invalid
    pub fn parse(&self) -> Result<ParsedImage> {
        let radii = self.radii();
        if radii.is_empty() {
            return Err(ShollError::InvalidMask {
                title: self.image.title().to_string(),
                reason: "empty radius range".to_string(),
            });
        }

        let counts: Vec<f64> = radii
            .iter()
            .map(|&radius| f64::from(self.count_intersections(radius)))
            .collect();
        let entries = radii
            .iter()
            .zip(counts.iter())
            .map(|(&radius, &count)| ProfileEntry { radius, count })
            .collect();
        let profile = Profile::new(entries)?;
        let counts_mask = self.build_counts_mask(&radii, &counts);

        Ok(ParsedImage {
            profile,
            counts_mask,
        })
    }

    /// Number of contiguous foreground runs crossed by the circle of the
    /// given calibrated radius
    fn count_intersections(&self, radius: f64) -> u32 {
        let radius_px = self.calibration.raw(radius);
        let (center_x, center_y) = self.center;
        if radius_px < 0.5 {
            return u32::from(self.image.foreground_at(center_x, center_y));
        }

        // One sample per pixel of arc length keeps adjacent samples on
        // neighboring pixels
        let samples = ((TAU * radius_px).ceil() as usize).max(8);
        let flags: Vec<bool> = (0..samples)
            .map(|i| {
                let theta = TAU * i as f64 / samples as f64;
                let x = radius_px.mul_add(theta.cos(), center_x);
                let y = radius_px.mul_add(theta.sin(), center_y);
                self.image.foreground_at(x, y)
            })
            .collect();

        let mut transitions = 0u32;
        let mut any_foreground = false;
        // Seeding with the last sample merges the run that wraps past zero
        let mut previous = flags.last().copied().unwrap_or(false);
        for &flag in &flags {
            if flag && !previous {
                transitions += 1;
            }
            any_foreground |= flag;
            previous = flag;
        }
        if transitions == 0 && any_foreground {
            1
        } else {
            transitions
        }
    }

    fn build_counts_mask(&self, radii: &[f64], counts: &[f64]) -> Array2<u16> {
        let (center_x, center_y) = self.center;
        let first_radius = radii.first().copied().unwrap_or(0.0);
        let mut mask = Array2::<u16>::zeros((self.image.height(), self.image.width()));

        for ((row, col), value) in mask.indexed_iter_mut() {
            if !self.image.foreground_at(col as f64, row as f64) {
                continue;
            }
            let dx = col as f64 - center_x;
            let dy = row as f64 - center_y;
            let distance = self.calibration.calibrated(dx.hypot(dy));
            let shell = if self.step_size > 0.0 {
                ((distance - first_radius) / self.step_size).round().max(0.0) as usize
            } else {
                0
            };
            let index = shell.min(counts.len().saturating_sub(1));
            let count = counts.get(index).copied().unwrap_or(0.0);
            *value = count.clamp(0.0, f64::from(u16::MAX)) as u16;
        }
        mask
    }
}
