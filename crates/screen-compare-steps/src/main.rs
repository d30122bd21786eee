//! ScreenCompare: entry point.

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use screen_compare_steps::workflow::ContextSettings;
use screen_compare_steps::{ComparisonContext, StepCommand, StepError};

#[derive(Parser)]
#[command(
    name = "screen-compare",
    about = "Compare device screenshots against reference images",
    version
)]
struct Cli {
    /// Scratch directory holding references and captures.
    /// Also reads from SCREEN_COMPARE_DIR env var.
    #[arg(short, long, global = true)]
    dir: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CaptureArgs {
    /// Screenshot command; its stdout is the image.
    /// Also reads from SCREEN_COMPARE_CAPTURE_CMD env var.
    #[arg(long)]
    capture_cmd: Option<String>,

    /// Use an existing image file as the captured screen instead of a command.
    #[arg(long, conflicts_with = "capture_cmd")]
    screen: Option<PathBuf>,

    /// Timeout in seconds for reference downloads.
    #[arg(long, default_value_t = 30)]
    fetch_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two image files and print the changed percentage.
    Diff {
        /// Reference image.
        reference: PathBuf,

        /// Image to check against the reference.
        actual: PathBuf,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a single step phrase, e.g. 'I compare the screen with "home.png"'.
    Step {
        phrase: String,

        /// Print the passing outcome as JSON.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Launch interactive REPL mode.
    Repl {
        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

impl CaptureArgs {
    fn settings(&self, dir: Option<&str>) -> ContextSettings {
        ContextSettings {
            dir: dir.map(str::to_string),
            capture_cmd: self.capture_cmd.clone(),
            screen: self.screen.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Diff {
            reference,
            actual,
            json,
        } => {
            let report = match screen_compare::compare_files(&reference, &actual) {
                Ok(report) => report,
                Err(e) => {
                    let e = StepError::from(e);
                    eprintln!("{e}");
                    std::process::exit(e.exit_code());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{:.2}", report.changed_percent);
            }
        }

        Commands::Step {
            phrase,
            json,
            capture,
        } => {
            let step = match StepCommand::parse(&phrase) {
                Ok(step) => step,
                Err(e) => {
                    eprintln!("{e}");
                    eprintln!("Known steps:");
                    for p in screen_compare_steps::steps::PHRASES {
                        eprintln!("  {p}");
                    }
                    std::process::exit(e.exit_code());
                }
            };
            let settings = capture.settings(cli.dir.as_deref());
            let outcome = ComparisonContext::from_settings(&settings)
                .and_then(|ctx| step.run(&ctx));
            match outcome {
                Ok(outcome) if json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                Ok(outcome) => {
                    println!(
                        "passed: {}% difference from {}",
                        outcome.difference, outcome.reference
                    );
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(e.exit_code());
                }
            }
        }

        Commands::Repl { capture } => {
            let settings = capture.settings(cli.dir.as_deref());
            let ctx = match ComparisonContext::from_settings(&settings) {
                Ok(ctx) => ctx,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(e.exit_code());
                }
            };
            screen_compare_steps::repl::run(&ctx)?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "screen-compare", &mut std::io::stdout());
        }
    }

    Ok(())
}
