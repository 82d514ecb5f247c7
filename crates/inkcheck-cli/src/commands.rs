//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inkcheck: screenshot diffing, baseline approval and run summaries
#[derive(Parser, Debug)]
#[command(name = "inkcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two PNG screenshots pixel by pixel
    ///
    /// Exits non-zero when the images differ.
    Diff(DiffArgs),

    /// Promote actual screenshots to baselines
    Approve(ApproveArgs),

    /// Print statistics from a run report
    Summary(SummaryArgs),
}

/// Arguments for the diff command
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Newly captured image
    pub actual: PathBuf,

    /// Reference image
    pub baseline: PathBuf,

    /// Where to write the diff image
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Per-channel tolerance (0.0 - 1.0)
    #[arg(short, long, env = "INKCHECK_THRESHOLD", default_value = "0.1")]
    pub threshold: f64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the approve command
#[derive(Parser, Debug)]
pub struct ApproveArgs {
    /// Visual root holding baseline/, actual/ and diff/
    #[arg(long, env = "INKCHECK_VISUAL_ROOT", default_value = "test-results/visual")]
    pub root: PathBuf,

    /// Browser whose actuals are promoted
    #[arg(long, env = "INKCHECK_BROWSER", default_value = "chromium")]
    pub browser: String,

    /// Only this test
    #[arg(long)]
    pub test: Option<String>,

    /// Only this screenshot name
    #[arg(long)]
    pub name: Option<String>,

    /// List what would be promoted without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the summary command
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Path to report.json
    pub report: PathBuf,

    /// Exit non-zero when the run had failures
    #[arg(long)]
    pub strict: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
