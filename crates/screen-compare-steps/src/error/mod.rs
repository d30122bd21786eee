//! Error types for the comparison steps.

use std::path::PathBuf;

use screen_compare::{ComparisonFailure, DiffError};

/// All errors that can occur while running a comparison step.
#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Comparison(#[from] ComparisonFailure),

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("Network fetch failed for {url}: {reason}")]
    NetworkFetchFailure { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Scratch directory error at {}: {source}", path.display())]
    Scratch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StepError {
    /// True when the step ran to completion and the difference was out of tolerance.
    pub fn is_assertion(&self) -> bool {
        matches!(self, StepError::Comparison(_))
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            StepError::Comparison(_) => 1,
            StepError::UnknownStep(_) | StepError::InvalidUrl(_) => 2,
            _ => 3,
        }
    }
}

pub type StepResult<T> = Result<T, StepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let assertion = StepError::from(ComparisonFailure { difference: 4 });
        assert!(assertion.is_assertion());
        assert_eq!(assertion.exit_code(), 1);

        assert_eq!(StepError::UnknownStep("x".into()).exit_code(), 2);
        assert_eq!(StepError::InvalidUrl("x".into()).exit_code(), 2);

        let setup = StepError::Scratch {
            path: PathBuf::from("/nope"),
            source: std::io::Error::other("denied"),
        };
        assert!(!setup.is_assertion());
        assert_eq!(setup.exit_code(), 3);
        assert_eq!(StepError::Capture("x".into()).exit_code(), 3);
        assert_eq!(StepError::from(DiffError::EmptyImage).exit_code(), 3);
    }
}
