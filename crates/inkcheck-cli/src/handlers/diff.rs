//! Diff command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::DiffArgs;
use console::style;
use inkcheck::{encode_png, DiffOutcome, Dimensions, ImageDiffer};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of comparing two files
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    /// Actual image path
    pub actual: PathBuf,
    /// Baseline image path
    pub baseline: PathBuf,
    /// No pixel differs
    pub matches: bool,
    /// Differing pixels as a percentage
    pub diff_percentage: f64,
    /// Differing pixels
    pub diff_pixel_count: usize,
    /// Pixels compared
    pub total_pixels: usize,
    /// Sizes when they disagree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_mismatch: Option<(Dimensions, Dimensions)>,
    /// Written diff image
    pub diff_path: Option<PathBuf>,
}

impl DiffReport {
    /// Human-readable one-liner
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some((actual, baseline)) = &self.dimension_mismatch {
            return format!("dimension mismatch: actual {actual}, baseline {baseline}");
        }
        format!(
            "{:.2}% of pixels differ ({} of {})",
            self.diff_percentage, self.diff_pixel_count, self.total_pixels
        )
    }
}

/// Compare `args.actual` against `args.baseline`, writing the diff image if asked
pub fn compute_diff(args: &DiffArgs) -> CliResult<DiffReport> {
    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(CliError::invalid_argument(format!(
            "threshold must be between 0 and 1, got {}",
            args.threshold
        )));
    }
    let actual = fs::read(&args.actual)?;
    let baseline = fs::read(&args.baseline)?;
    let outcome = ImageDiffer::new(args.threshold).compare(&actual, &baseline)?;
    debug!(
        identical = outcome.is_identical(),
        diff_percentage = outcome.diff_percentage(),
        "compared"
    );

    let diff_path = match (outcome.artifact(), &args.out) {
        (Some(image), Some(out)) => {
            write_image(out, &encode_png(image)?)?;
            info!(path = %out.display(), "diff image written");
            Some(out.clone())
        }
        _ => None,
    };

    let diff_percentage = outcome.diff_percentage();
    let (diff_pixel_count, total_pixels, dimension_mismatch) = match outcome {
        DiffOutcome::Identical { dimensions } => (0, dimensions.pixel_count() as usize, None),
        DiffOutcome::Different {
            diff_pixel_count,
            total_pixels,
            ..
        } => (diff_pixel_count, total_pixels, None),
        DiffOutcome::DimensionMismatch {
            actual, baseline, ..
        } => {
            let larger = actual.pixel_count().max(baseline.pixel_count()) as usize;
            (larger, larger, Some((actual, baseline)))
        }
    };

    Ok(DiffReport {
        actual: args.actual.clone(),
        baseline: args.baseline.clone(),
        matches: diff_pixel_count == 0,
        diff_percentage,
        diff_pixel_count,
        total_pixels,
        dimension_mismatch,
        diff_path,
    })
}

/// Execute the diff command
pub fn execute_diff(config: &CliConfig, args: &DiffArgs) -> CliResult<()> {
    let report = compute_diff(args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !config.verbosity.is_quiet() {
        if report.matches {
            println!("{} images match", style("PASS").green().bold());
        } else {
            println!("{} {}", style("FAIL").red().bold(), report.describe());
            if let Some(path) = &report.diff_path {
                println!("     diff: {}", path.display());
            }
        }
    }

    if report.matches {
        Ok(())
    } else {
        Err(CliError::mismatch(report.describe()))
    }
}

fn write_image(path: &Path, bytes: &[u8]) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}
