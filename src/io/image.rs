//! Mask image loading and count raster export

use crate::io::error::{Result, ShollError};
use ndarray::Array2;
use std::path::Path;

/// Thresholded 2D mask image held as a boolean grid
///
/// Rows index y, columns index x; any nonzero luma value in the source
/// image is foreground. Masks are expected to be pre-thresholded binary
/// images.
#[derive(Debug, Clone)]
pub struct MaskImage {
    data: Array2<bool>,
    title: String,
}

impl MaskImage {
    /// Load a mask image from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| ShollError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let luma = img.to_luma8();
        let (width, height) = luma.dimensions();

        let mut data = Array2::from_elem((height as usize, width as usize), false);
        for (x, y, pixel) in luma.enumerate_pixels() {
            if pixel.0.first().copied().unwrap_or(0) > 0 {
                if let Some(cell) = data.get_mut((y as usize, x as usize)) {
                    *cell = true;
                }
            }
        }

        let title = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self { data, title })
    }

    /// Wrap an existing boolean grid (rows are y)
    pub fn from_grid(data: Array2<bool>, title: impl Into<String>) -> Self {
        Self {
            data,
            title: title.into(),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Display title used in log messages
    pub fn title(&self) -> &str {
        &self.title
    }

    /// True when the coordinate rounds to a foreground pixel inside the
    /// image
    pub fn foreground_at(&self, x: f64, y: f64) -> bool {
        if x < -0.5 || y < -0.5 {
            return false;
        }
        let col = x.round() as usize;
        let row = y.round() as usize;
        self.data.get((row, col)).copied().unwrap_or(false)
    }

    /// Centroid of the foreground pixels; None when the mask is empty
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0usize;
        for ((row, col), &foreground) in self.data.indexed_iter() {
            if foreground {
                sum_x += col as f64;
                sum_y += row as f64;
                count += 1;
            }
        }
        (count > 0).then(|| {
            let n = count as f64;
            (sum_x / n, sum_y / n)
        })
    }
}

/// Save an intersection-count raster as a 16-bit grayscale image
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the image
/// cannot be encoded
pub fn save_counts_image(counts: &Array2<u16>, path: &Path) -> Result<()> {
    let width = counts.ncols() as u32;
    let height = counts.nrows() as u32;

    let mut img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::new(width, height);
    for ((row, col), &value) in counts.indexed_iter() {
        img.put_pixel(col as u32, row as u32, image::Luma([value]));
    }

    ensure_parent_dir(path)?;
    img.save(path).map_err(|e| ShollError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save an RGB pixel buffer (row-major, 3 bytes per pixel) as an image
///
/// # Errors
///
/// Returns an error if the buffer does not match the dimensions, the parent
/// directory cannot be created, or the image cannot be encoded
pub fn save_rgb_image(buffer: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<()> {
    let img = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ShollError::Computation {
            operation: "plot raster assembly",
            reason: format!("buffer does not match {width}x{height} RGB dimensions"),
        }
    })?;

    ensure_parent_dir(path)?;
    img.save(path).map_err(|e| ShollError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ShollError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::MaskImage;
    use ndarray::Array2;

    #[test]
    fn test_centroid_of_a_single_pixel() {
        let mut grid = Array2::from_elem((5, 5), false);
        grid[(3, 1)] = true;
        let mask = MaskImage::from_grid(grid, "single.tif");
        assert_eq!(mask.centroid(), Some((1.0, 3.0)));
    }

    #[test]
    fn test_empty_mask_has_no_centroid() {
        let mask = MaskImage::from_grid(Array2::from_elem((4, 4), false), "empty.tif");
        assert!(mask.centroid().is_none());
    }

    #[test]
    fn test_foreground_lookup_rounds_and_bounds_checks() {
        let mut grid = Array2::from_elem((4, 6), false);
        grid[(2, 5)] = true;
        let mask = MaskImage::from_grid(grid, "lookup.tif");
        assert_eq!(mask.width(), 6);
        assert_eq!(mask.height(), 4);
        assert!(mask.foreground_at(4.6, 2.4));
        assert!(!mask.foreground_at(5.0, 1.0));
        assert!(!mask.foreground_at(-3.0, 2.0));
        assert!(!mask.foreground_at(25.0, 2.0));
    }
}
