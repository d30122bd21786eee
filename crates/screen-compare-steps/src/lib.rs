//! ScreenCompare steps: screenshot comparison glue for behaviour-driven UI tests.

pub mod config;
pub mod error;
pub mod fetch;
pub mod repl;
pub mod scratch;
pub mod screenshot;
pub mod steps;
pub mod workflow;

pub use config::resolve_scratch_dir;
pub use error::{StepError, StepResult};
pub use fetch::{HttpFetcher, ReferenceFetcher};
pub use scratch::{ScratchDir, TempArtifact};
pub use screenshot::{CommandScreenshot, FileScreenshot, ScreenshotProvider};
pub use steps::StepCommand;
pub use workflow::{ComparisonContext, Outcome};
