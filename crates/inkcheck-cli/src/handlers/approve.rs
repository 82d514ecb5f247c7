//! Approve command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::ApproveArgs;
use console::style;
use inkcheck::{normalize_name, ActualEntry, BaselineStore};
use std::path::PathBuf;
use tracing::info;

/// One actual selected for promotion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    /// Source actual image
    pub actual: PathBuf,
    /// Baseline it replaces
    pub baseline: PathBuf,
}

/// Actuals under `args.root` matching the `--test` / `--name` filters
pub fn select_approvals(args: &ApproveArgs) -> CliResult<Vec<Approval>> {
    let store = BaselineStore::new(&args.root);
    let test = args.test.as_deref().map(normalize_name);
    let name = args.name.as_deref().map(normalize_name);

    let keep = |entry: &ActualEntry| {
        test.as_ref().map_or(true, |t| *t == entry.test_name)
            && name.as_ref().map_or(true, |n| *n == entry.screenshot_name)
    };

    Ok(store
        .list_actuals(&args.browser)?
        .into_iter()
        .filter(keep)
        .map(|entry| Approval {
            baseline: store.resolve_path(&args.browser, &entry.test_name, &entry.screenshot_name),
            actual: entry.path,
        })
        .collect())
}

/// Execute the approve command
pub fn execute_approve(config: &CliConfig, args: &ApproveArgs) -> CliResult<Vec<Approval>> {
    let approvals = select_approvals(args)?;
    let store = BaselineStore::new(&args.root);

    if approvals.is_empty() {
        if !config.verbosity.is_quiet() {
            println!(
                "No actual screenshots under {} for {}",
                args.root.display(),
                args.browser
            );
        }
        return Ok(approvals);
    }

    for approval in &approvals {
        if !args.dry_run {
            store.promote(&approval.actual, &approval.baseline)?;
        }
        if !config.verbosity.is_quiet() {
            let tag = if args.dry_run {
                style("WOULD APPROVE").yellow()
            } else {
                style("APPROVED").green()
            };
            println!("{tag} {}", approval.baseline.display());
            if config.verbosity.is_verbose() {
                println!("      from {}", approval.actual.display());
            }
        }
    }
    info!(
        count = approvals.len(),
        dry_run = args.dry_run,
        browser = %args.browser,
        "baselines approved"
    );
    Ok(approvals)
}
