//! Capture, compare and assert: the body shared by every step.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use screen_compare::{compare_files, evaluate, DiffReport, MatchMode, Tolerance};

use crate::config::{resolve_capture_command, resolve_scratch_dir, DEFAULT_FETCH_TIMEOUT};
use crate::error::StepResult;
use crate::fetch::{HttpFetcher, ReferenceFetcher};
use crate::scratch::{ScratchDir, TempArtifact};
use crate::screenshot::{CommandScreenshot, FileScreenshot, ScreenshotProvider};

/// File name used for references downloaded from a URL.
pub const DOWNLOADED_REFERENCE: &str = "tester.png";

/// Prefix of captured screenshot file names.
pub const CAPTURE_PREFIX: &str = "compare_";

/// Result of a passing comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub reference: String,
    /// Changed percentage, truncated to a whole number.
    pub difference: i64,
    pub report: DiffReport,
}

/// Settings a [`ComparisonContext`] is built from.
#[derive(Debug, Clone)]
pub struct ContextSettings {
    /// Scratch directory; resolved through [`resolve_scratch_dir`].
    pub dir: Option<String>,
    /// Screenshot command line; resolved through [`resolve_capture_command`].
    pub capture_cmd: Option<String>,
    /// Replay this file instead of running a screenshot command.
    pub screen: Option<PathBuf>,
    pub fetch_timeout: Duration,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            dir: None,
            capture_cmd: None,
            screen: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Everything a step needs: where files live and how to obtain them.
pub struct ComparisonContext {
    scratch: ScratchDir,
    screenshots: Box<dyn ScreenshotProvider>,
    fetcher: Box<dyn ReferenceFetcher>,
}

impl ComparisonContext {
    pub fn new(
        scratch: ScratchDir,
        screenshots: Box<dyn ScreenshotProvider>,
        fetcher: Box<dyn ReferenceFetcher>,
    ) -> Self {
        Self {
            scratch,
            screenshots,
            fetcher,
        }
    }

    /// Open the scratch directory and set up the default collaborators.
    pub fn from_settings(settings: &ContextSettings) -> StepResult<Self> {
        let scratch = ScratchDir::open(resolve_scratch_dir(settings.dir.as_deref()))?;
        let screenshots: Box<dyn ScreenshotProvider> = match &settings.screen {
            Some(path) => Box::new(FileScreenshot::new(path)),
            None => {
                let line = resolve_capture_command(settings.capture_cmd.as_deref());
                Box::new(CommandScreenshot::from_command_line(&line)?)
            }
        };
        let fetcher = HttpFetcher::with_timeout(settings.fetch_timeout)?;
        tracing::debug!("Scratch directory: {}", scratch.root().display());
        Ok(Self::new(scratch, screenshots, Box::new(fetcher)))
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Capture the screen and compare it against `file` in the scratch directory.
    ///
    /// The captured screenshot is removed whether the comparison passes, fails
    /// or errors.
    pub fn compare_with_file(
        &self,
        file: &str,
        tolerance: Tolerance,
        mode: MatchMode,
    ) -> StepResult<Outcome> {
        let requested = format!("{CAPTURE_PREFIX}{file}");
        let _requested_guard = TempArtifact::new(self.scratch.path_of(&requested));
        self.screenshots.capture(&self.scratch.path_of(&requested))?;

        let captured = self.scratch.resolve_capture(&requested)?;
        let capture_guard = TempArtifact::new(self.scratch.path_of(&captured));

        let report = compare_files(&self.scratch.path_of(file), capture_guard.path())?;
        tracing::info!(
            "Compared {file} with {captured}: {:.2}% changed (tolerance {tolerance}, {mode:?})",
            report.changed_percent
        );

        let difference = evaluate(report.changed_percent, tolerance, mode)?;
        Ok(Outcome {
            reference: file.to_string(),
            difference,
            report,
        })
    }

    /// Download the reference at `url`, then compare as [`Self::compare_with_file`].
    ///
    /// The downloaded reference is removed on every exit path.
    pub fn compare_with_url(&self, url: &str, tolerance: Tolerance) -> StepResult<Outcome> {
        let download = TempArtifact::new(self.scratch.path_of(DOWNLOADED_REFERENCE));
        self.fetcher.fetch(url, download.path())?;
        self.compare_with_file(DOWNLOADED_REFERENCE, tolerance, MatchMode::Match)
    }
}
