//! ScreenCompare: pixel-level comparison of device screenshots against reference images.

pub mod capture;
pub mod diff;
pub mod policy;
pub mod types;

pub use capture::{is_supported_format, load_image};
pub use diff::{compare, compare_detailed, compare_files, diff_pixel, pack_rgb, MARKER};
pub use policy::{evaluate, ComparisonFailure, MatchMode, Tolerance};
pub use types::*;
