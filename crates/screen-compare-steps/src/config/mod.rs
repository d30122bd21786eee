//! Configuration loading and resolution.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the scratch directory.
pub const SCRATCH_DIR_ENV: &str = "SCREEN_COMPARE_DIR";

/// Environment variable overriding the screenshot command.
pub const CAPTURE_CMD_ENV: &str = "SCREEN_COMPARE_CAPTURE_CMD";

/// Screenshot command used when nothing else is configured.
pub const DEFAULT_CAPTURE_CMD: &str = "adb exec-out screencap -p";

/// Default timeout for reference downloads.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve the scratch directory path.
pub fn resolve_scratch_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(SCRATCH_DIR_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    PathBuf::from("screens")
}

/// Resolve the screenshot command line into program and arguments.
pub fn resolve_capture_command(explicit: Option<&str>) -> Vec<String> {
    let line = explicit
        .map(str::to_string)
        .or_else(env_capture_command)
        .unwrap_or_else(|| DEFAULT_CAPTURE_CMD.to_string());

    line.split_whitespace().map(str::to_string).collect()
}

fn env_capture_command() -> Option<String> {
    let line = std::env::var(CAPTURE_CMD_ENV).ok()?;
    (!line.trim().is_empty()).then_some(line)
}
