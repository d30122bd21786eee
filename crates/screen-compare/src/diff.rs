//! Pixel comparison between a reference image and a captured screenshot.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::capture::load_image;
use crate::types::{DiffError, DiffReport, DiffResult, Dimensions};

/// Packed value of a diff pixel that counts as "identical".
///
/// Diff pixels are packed as opaque RGBA (`r<<24 | g<<16 | b<<8 | 0xff`), so
/// the marker is the black diff pixel: every channel delta is zero.
pub const MARKER: u32 = 255;

/// Per-channel absolute difference, computed as `a + b - 2 * min(a, b)`.
pub fn diff_pixel(a: &Rgb<u8>, b: &Rgb<u8>) -> Rgb<u8> {
    Rgb([
        channel_diff(a.0[0], b.0[0]),
        channel_diff(a.0[1], b.0[1]),
        channel_diff(a.0[2], b.0[2]),
    ])
}

fn channel_diff(a: u8, b: u8) -> u8 {
    let (a, b) = (u16::from(a), u16::from(b));
    // Bounded by 255, the larger of the two inputs.
    (a + b - 2 * a.min(b)) as u8
}

/// Pack an RGB pixel into the single composite integer the marker check uses.
pub fn pack_rgb(pixel: &Rgb<u8>) -> u32 {
    let [r, g, b] = pixel.0;
    (u32::from(r) << 24) | (u32::from(g) << 16) | (u32::from(b) << 8) | 0xff
}

/// Compare two images and return the percentage (0-100) of pixels that changed.
pub fn compare(reference: &RgbImage, actual: &RgbImage) -> DiffResult<f64> {
    Ok(compare_detailed(reference, actual)?.changed_percent)
}

/// Compare two images and return the full report.
///
/// Iterates over the reference image's rows and columns; both images must
/// have identical dimensions.
pub fn compare_detailed(reference: &RgbImage, actual: &RgbImage) -> DiffResult<DiffReport> {
    let (w, h) = reference.dimensions();
    let expected = Dimensions::from((w, h));
    let actual_dims = Dimensions::from(actual.dimensions());

    if expected != actual_dims {
        return Err(DiffError::DimensionMismatch {
            expected,
            actual: actual_dims,
        });
    }

    let total_pixels = actual_dims.pixel_count();
    if total_pixels == 0 {
        return Err(DiffError::EmptyImage);
    }

    let mut identical_pixels = 0u64;
    for y in 0..h {
        for x in 0..w {
            let d = diff_pixel(reference.get_pixel(x, y), actual.get_pixel(x, y));
            if pack_rgb(&d) == MARKER {
                identical_pixels += 1;
            }
        }
    }

    let changed_percent = 100.0 - (identical_pixels as f64 / total_pixels as f64) * 100.0;

    tracing::debug!("Compared {expected}: {changed_percent:.2}% changed");

    Ok(DiffReport {
        dimensions: expected,
        total_pixels,
        identical_pixels,
        changed_percent,
    })
}

/// Load two image files and compare them.
pub fn compare_files(reference: &Path, actual: &Path) -> DiffResult<DiffReport> {
    let reference_img = load_image(reference)?;
    let actual_img = load_image(actual)?;
    compare_detailed(&reference_img, &actual_img)
}
