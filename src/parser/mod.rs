//! Radial intersection parsing of binary mask images
//!
//! This module contains the sampling side of the analysis:
//! - Intersection profiles and spatial calibration
//! - The 2D radial parser producing profiles and count rasters

/// Intersection profiles and pixel calibration
pub mod profile;
/// 2D radial intersection parser
pub mod radial;

pub use profile::{Calibration, Profile, ProfileEntry};
pub use radial::{ImageParser, ParsedImage};
