//! Step definitions: natural-language phrases mapped to comparison commands.

use std::sync::OnceLock;

use regex::Regex;
use screen_compare::{MatchMode, Tolerance};

use crate::error::{StepError, StepResult};
use crate::workflow::{ComparisonContext, Outcome};

/// One of the five screenshot comparison steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCommand {
    /// `I compare the screen with "<file>"`
    CompareFile { file: String },
    /// `I compare the screen with url "<url>"`
    CompareUrl { url: String },
    /// `the screen should not match with "<file>"`
    NotMatchFile { file: String },
    /// `I expect atmost "<n>" difference when comparing with "<file>"`
    ToleranceFile { tolerance: Tolerance, file: String },
    /// `I expect atmost "<n>" difference when comparing with url "<url>"`
    ToleranceUrl { tolerance: Tolerance, url: String },
}

#[derive(Debug, Clone, Copy)]
enum StepKind {
    CompareFile,
    CompareUrl,
    NotMatchFile,
    ToleranceFile,
    ToleranceUrl,
}

/// Phrase templates, shown by the REPL and `--help` output.
pub const PHRASES: &[&str] = &[
    r#"I compare the screen with "<file>""#,
    r#"I compare the screen with url "<url>""#,
    r#"the screen should not match with "<file>""#,
    r#"I expect atmost "<n>" difference when comparing with "<file>""#,
    r#"I expect atmost "<n>" difference when comparing with url "<url>""#,
];

fn patterns() -> &'static [(StepKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(StepKind, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let keyword = r"^(?:(?:Given|When|Then|And|But)\s+)?";
        [
            (
                StepKind::CompareFile,
                r#"I compare the screen with "(.*?)"$"#,
            ),
            (
                StepKind::CompareUrl,
                r#"I compare the screen with url "(.*?)"$"#,
            ),
            (
                StepKind::NotMatchFile,
                r#"the screen should not match with "(.*?)"$"#,
            ),
            (
                StepKind::ToleranceFile,
                r#"I expect atmost "(.*?)" difference when comparing with "(.*?)"$"#,
            ),
            (
                StepKind::ToleranceUrl,
                r#"I expect atmost "(.*?)" difference when comparing with url "(.*?)"$"#,
            ),
        ]
        .into_iter()
        .map(|(kind, body)| {
            let pattern = format!("{keyword}{body}");
            let re = Regex::new(&pattern).expect("step regex is valid");
            (kind, re)
        })
        .collect()
    })
}

impl StepCommand {
    /// Recognise a step phrase, with or without a leading Gherkin keyword.
    pub fn parse(phrase: &str) -> StepResult<Self> {
        let phrase = phrase.trim();
        for (kind, re) in patterns() {
            let Some(caps) = re.captures(phrase) else {
                continue;
            };
            let arg = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_owned();
            let command = match kind {
                StepKind::CompareFile => StepCommand::CompareFile { file: arg(1) },
                StepKind::CompareUrl => StepCommand::CompareUrl { url: arg(1) },
                StepKind::NotMatchFile => StepCommand::NotMatchFile { file: arg(1) },
                StepKind::ToleranceFile => StepCommand::ToleranceFile {
                    tolerance: parse_tolerance(&arg(1)),
                    file: arg(2),
                },
                StepKind::ToleranceUrl => StepCommand::ToleranceUrl {
                    tolerance: parse_tolerance(&arg(1)),
                    url: arg(2),
                },
            };
            return Ok(command);
        }
        Err(StepError::UnknownStep(phrase.to_string()))
    }

    /// Execute the step against a comparison context.
    pub fn run(&self, ctx: &ComparisonContext) -> StepResult<Outcome> {
        tracing::info!("Running step: {self:?}");
        match self {
            StepCommand::CompareFile { file } => {
                ctx.compare_with_file(file, Tolerance::EXACT, MatchMode::Match)
            }
            StepCommand::CompareUrl { url } => ctx.compare_with_url(url, Tolerance::EXACT),
            StepCommand::NotMatchFile { file } => {
                ctx.compare_with_file(file, Tolerance::EXACT, MatchMode::NoMatch)
            }
            StepCommand::ToleranceFile { tolerance, file } => {
                ctx.compare_with_file(file, *tolerance, MatchMode::Match)
            }
            StepCommand::ToleranceUrl { tolerance, url } => ctx.compare_with_url(url, *tolerance),
        }
    }
}

/// Lenient integer parse: optional sign and leading digits, anything else is 0.
fn parse_tolerance(raw: &str) -> Tolerance {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end]
        .parse::<i64>()
        .unwrap_or(if end == 0 { 0 } else { i64::MAX });
    let value = if negative { -value } else { value };
    Tolerance(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}
