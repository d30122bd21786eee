//! Pass/fail decision for a measured difference.

use serde::{Deserialize, Serialize};

/// Whether the screen is expected to match the reference or to differ from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Fails when the difference exceeds the tolerance.
    #[default]
    Match,
    /// Fails when the difference is below the tolerance.
    NoMatch,
}

/// Allowed difference, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tolerance(pub i32);

impl Tolerance {
    pub const EXACT: Tolerance = Tolerance(0);
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A comparison whose difference fell on the wrong side of the tolerance.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Error. The screen shot was different from the source file. Difference: {difference}%"
)]
pub struct ComparisonFailure {
    /// Changed percentage, truncated to a whole number.
    pub difference: i64,
}

/// Apply the threshold rule to a changed percentage.
///
/// The percentage is truncated toward zero before comparing.
pub fn evaluate(
    changed: f64,
    tolerance: Tolerance,
    mode: MatchMode,
) -> Result<i64, ComparisonFailure> {
    let difference = changed.trunc() as i64;
    let tolerance = i64::from(tolerance.0);

    let failed = match mode {
        MatchMode::Match => difference > tolerance,
        MatchMode::NoMatch => difference < tolerance,
    };

    if failed {
        tracing::info!("Comparison failed: {difference}% (tolerance {tolerance}%)");
        Err(ComparisonFailure { difference })
    } else {
        Ok(difference)
    }
}
