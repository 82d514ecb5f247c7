//! Summary command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::SummaryArgs;
use console::style;
use inkcheck::reporter::TestRecord;
use inkcheck::RunReport;
use std::fs;
use std::path::Path;

/// Load a `report.json` written by the run reporter
pub fn load_report(path: &Path) -> CliResult<RunReport> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Lines for tests that failed or were flaky
#[must_use]
pub fn problem_lines(report: &RunReport) -> Vec<String> {
    report
        .tests
        .iter()
        .filter(|t| t.status.is_failed() || t.is_flaky())
        .map(problem_line)
        .collect()
}

fn problem_line(test: &TestRecord) -> String {
    let label = if test.is_flaky() {
        "flaky"
    } else {
        test.status.label()
    };
    let mut line = format!("{label:>11}  {}  ({})", test.title, test.location);
    if let Some(error) = test.error.as_deref().and_then(|e| e.lines().next()) {
        line.push_str("\n             ");
        line.push_str(error);
    }
    line
}

/// Execute the summary command
pub fn execute_summary(config: &CliConfig, args: &SummaryArgs) -> CliResult<()> {
    let report = load_report(&args.report)?;

    if !config.verbosity.is_quiet() {
        println!("{}", style(report.summary_line()).bold());
        println!("pass rate {:.1}%", report.stats.pass_rate() * 100.0);
        for line in problem_lines(&report) {
            println!("{line}");
        }
    }

    if args.strict && report.stats.failed > 0 {
        return Err(CliError::run_failed(format!(
            "{} of {} tests failed",
            report.stats.failed, report.stats.total
        )));
    }
    Ok(())
}
