//! Image loading for references and captured screenshots.

use std::path::Path;

use image::RgbImage;

use crate::types::{DiffError, DiffResult};

/// Load an image file as 8-bit RGB, dropping any alpha channel.
pub fn load_image(path: &Path) -> DiffResult<RgbImage> {
    if !path.exists() {
        return Err(DiffError::FileNotFound(path.to_path_buf()));
    }
    let img = image::open(path)?;
    tracing::debug!("Loaded {}", path.display());
    Ok(img.to_rgb8())
}

/// Check if a file path points to a supported image format.
pub fn is_supported_format(path: &str) -> bool {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    matches!(
        ext.as_str(),
        "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" | "tiff" | "tif" | "ico"
    )
}
