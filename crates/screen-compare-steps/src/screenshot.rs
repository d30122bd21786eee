//! Screenshot providers.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{StepError, StepResult};

/// Captures the current screen into an image file.
pub trait ScreenshotProvider {
    fn capture(&self, dest: &Path) -> StepResult<()>;
}

/// Runs an external program whose stdout is the screenshot image.
pub struct CommandScreenshot {
    program: String,
    args: Vec<String>,
}

impl CommandScreenshot {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a split command line, e.g. `["adb", "exec-out", "screencap", "-p"]`.
    pub fn from_command_line(parts: &[String]) -> StepResult<Self> {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| StepError::Capture("empty screenshot command".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl ScreenshotProvider for CommandScreenshot {
    fn capture(&self, dest: &Path) -> StepResult<()> {
        tracing::debug!("Capturing screen with {} {:?}", self.program, self.args);
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| StepError::Capture(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StepError::Capture(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            let message = format!("{} produced no output", self.program);
            return Err(StepError::Capture(message));
        }

        std::fs::write(dest, &output.stdout)?;
        Ok(())
    }
}

/// Replays an existing image file as the captured screen.
pub struct FileScreenshot {
    source: PathBuf,
}

impl FileScreenshot {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ScreenshotProvider for FileScreenshot {
    fn capture(&self, dest: &Path) -> StepResult<()> {
        if !self.source.exists() {
            return Err(StepError::Capture(format!(
                "screenshot source not found: {}",
                self.source.display()
            )));
        }
        std::fs::copy(&self.source, dest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_screenshot_copies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("screen.png");
        let dest = dir.path().join("out.png");
        std::fs::write(&src, b"png-bytes").unwrap();

        FileScreenshot::new(&src).capture(&dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_file_screenshot_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileScreenshot::new(dir.path().join("none.png"))
            .capture(&dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, StepError::Capture(_)));
    }

    #[test]
    fn test_empty_command_line() {
        assert!(CommandScreenshot::from_command_line(&[]).is_err());
    }

    #[test]
    fn test_missing_program_is_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CommandScreenshot::new("definitely-not-a-real-screencap-binary", vec![]);
        let err = cmd.capture(&dir.path().join("out.png")).unwrap_err();
        assert!(matches!(err, StepError::Capture(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_stdout_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.png");
        let cmd = CommandScreenshot::new("printf", vec!["abc".to_string()]);
        cmd.capture(&dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
    }
}
