//! Core data types for screenshot comparison.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Full outcome of a pixel comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    pub dimensions: Dimensions,
    pub total_pixels: u64,
    pub identical_pixels: u64,
    /// Percentage (0-100) of pixels whose diff pixel was not the marker value.
    pub changed_percent: f64,
}

impl DiffReport {
    /// Percentage of identical pixels, the complement of `changed_percent`.
    pub fn identical_percent(&self) -> f64 {
        100.0 - self.changed_percent
    }
}

/// Errors that can occur while loading or comparing images.
#[derive(thiserror::Error, Debug)]
pub enum DiffError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },

    #[error("Image has no pixels")]
    EmptyImage,
}

/// Convenience result type.
pub type DiffResult<T> = Result<T, DiffError>;
