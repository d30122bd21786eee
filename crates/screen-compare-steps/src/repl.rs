//! Interactive REPL for running comparison steps by hand.
//!
//! Launch with `screen-compare repl`. Plain input is parsed as a step phrase;
//! `/help` lists the slash commands, Tab completes commands and phrases.

use std::path::Path;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use screen_compare::{compare_files, is_supported_format};

use crate::steps::{StepCommand, PHRASES};
use crate::workflow::ComparisonContext;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/steps", "List the step phrases"),
    ("/diff", "Compare two images in the scratch directory"),
    ("/refs", "List reference images in the scratch directory"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Step phrase prefixes up to the first placeholder.
fn phrase_prefixes() -> impl Iterator<Item = &'static str> {
    PHRASES
        .iter()
        .map(|p| p.split("\"<").next().unwrap_or(*p))
}

/// REPL helper for tab completion.
struct StepHelper {
    scratch_root: std::path::PathBuf,
}

impl StepHelper {
    fn reference_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&self.scratch_root) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if is_supported_format(name) {
                        files.push(name.to_string());
                    }
                }
            }
        }
        files.sort();
        files
    }
}

impl Completer for StepHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if input.starts_with('/') && !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        if let Some(args) = input.strip_prefix("/diff ") {
            let last = args.rsplit(' ').next().unwrap_or("");
            let start = input.len() - last.len();
            let matches: Vec<Pair> = self
                .reference_files()
                .into_iter()
                .filter(|f| f.starts_with(last))
                .map(|f| Pair {
                    display: f.clone(),
                    replacement: format!("{f} "),
                })
                .collect();
            return Ok((start, matches));
        }

        if !input.starts_with('/') {
            let matches: Vec<Pair> = phrase_prefixes()
                .filter(|p| p.starts_with(input))
                .map(|p| Pair {
                    display: p.to_string(),
                    replacement: format!("{p}\""),
                })
                .collect();
            return Ok((0, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for StepHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') {
            if line.contains(' ') {
                return None;
            }
            return COMMANDS
                .iter()
                .find(|(cmd, _)| cmd.starts_with(line) && *cmd != line)
                .map(|(cmd, _)| cmd[line.len()..].to_string());
        }
        phrase_prefixes()
            .find(|p| p.starts_with(line) && *p != line)
            .map(|p| p[line.len()..].to_string())
    }
}

impl Highlighter for StepHelper {}
impl Validator for StepHelper {}
impl Helper for StepHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL against a comparison context.
pub fn run(ctx: &ComparisonContext) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mscreen-compare v{}\x1b[0m \x1b[90m\u{2014} scratch dir {}\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        ctx.scratch().root().display()
    );
    eprintln!();
    eprintln!(
        "    Type a step phrase, \x1b[36m/\x1b[0m for commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<StepHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(StepHelper {
        scratch_root: ctx.scratch().root().to_path_buf(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = Path::new(&home).join(".screen_compare_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mscreen>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let Some(input) = line.strip_prefix('/') else {
                    cmd_step(line, ctx);
                    continue;
                };

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "" | "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "steps" => cmd_steps(),
                    "refs" => cmd_refs(ctx),
                    "diff" => cmd_diff(args, ctx),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Anything not starting with '/' is run as a step phrase.");
    eprintln!();
}

fn cmd_steps() {
    eprintln!();
    for phrase in PHRASES {
        eprintln!("    {phrase}");
    }
    eprintln!();
}

fn cmd_refs(ctx: &ComparisonContext) {
    let helper = StepHelper {
        scratch_root: ctx.scratch().root().to_path_buf(),
    };
    let files = helper.reference_files();
    eprintln!();
    let root = ctx.scratch().root().display();
    eprintln!("  {} images in {root}:", files.len());
    for f in files {
        eprintln!("    {f}");
    }
    eprintln!();
}

fn cmd_diff(args: &str, ctx: &ComparisonContext) {
    let names: Vec<&str> = args.split_whitespace().collect();
    let [a, b] = names.as_slice() else {
        eprintln!("  Usage: /diff <reference> <actual>");
        return;
    };
    let scratch = ctx.scratch();
    match compare_files(&scratch.path_of(a), &scratch.path_of(b)) {
        Ok(report) => eprintln!(
            "  {a} vs {b}: {:.2}% changed ({}/{} identical, {})",
            report.changed_percent,
            report.identical_pixels,
            report.total_pixels,
            report.dimensions
        ),
        Err(e) => eprintln!("  Diff failed: {e}"),
    }
}

fn cmd_step(line: &str, ctx: &ComparisonContext) {
    let result = StepCommand::parse(line).and_then(|step| step.run(ctx));
    match result {
        Ok(outcome) => eprintln!(
            "  \x1b[32mpassed\x1b[0m {}: {}% difference",
            outcome.reference, outcome.difference
        ),
        Err(e) if e.is_assertion() => eprintln!("  \x1b[31mfailed\x1b[0m {e}"),
        Err(e) => eprintln!("  Error: {e}"),
    }
}
