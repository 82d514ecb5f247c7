//! Inkcheck CLI: screenshot diffing and baseline management
//!
//! ## Usage
//!
//! ```bash
//! inkcheck diff actual.png baseline.png --out diff.png
//! inkcheck approve --root test-results/visual --test homepage
//! inkcheck summary test-results/report-<ts>/report.json
//! ```

use clap::Parser;
use inkcheck_cli::{
    handlers::{execute_approve, execute_diff, execute_summary},
    init_logging, Cli, CliConfig, CliResult, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    config.color.apply();
    init_logging(config.verbosity);

    match cli.command {
        Commands::Diff(args) => execute_diff(&config, &args),
        Commands::Approve(args) => execute_approve(&config, &args).map(|_| ()),
        Commands::Summary(args) => execute_summary(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.clone().into())
}
