//! Comparison orchestrator: capture → baseline lookup → diff → result.
//!
//! # State machine (one comparison)
//!
//! ```text
//! CAPTURED ─┬─► BASELINE_MISSING ─┬─► BASELINE_CREATED      (auto-create on)
//!           │                     └─► ERROR: BaselineMissing (auto-create off)
//!           └─► BASELINE_FOUND ─► DIMENSIONS_CHECKED ─┬─► IDENTICAL
//!                                                     └─► DIFFERENT
//! ```
//!
//! The comparison path never rewrites an existing baseline. Accepting
//! drift is a separate, explicit [`VisualTester::update_baseline`] call.

use crate::baseline::{write_atomic, BaselineStore};
use crate::capture::{CaptureOptions, ScreenshotCapture};
use crate::config::VisualConfig;
use crate::diff::{encode_png, DiffOutcome, Dimensions, ImageDiffer};
use crate::driver::PageDriver;
use crate::naming::normalize_name;
use crate::result::{InkcheckError, InkcheckResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sizes of both images when they differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionMismatch {
    /// Actual image size
    pub actual: Dimensions,
    /// Baseline image size
    pub baseline: Dimensions,
}

/// Terminal state of one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// No baseline existed; the actual image became the baseline
    BaselineCreated,
    /// Matches the baseline exactly (within the per-pixel threshold)
    Identical,
    /// Same size, some pixels differ
    Different,
    /// Sizes differ
    DimensionMismatch,
}

/// Outcome of one screenshot comparison
///
/// `matches` implies `diff_percentage == 0` or `baseline_created`.
/// A populated `dimension_mismatch` implies `!matches` and 100%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Normalized screenshot name
    pub name: String,
    /// Whether the screenshot is accepted
    pub matches: bool,
    /// Percentage of pixels above threshold (0.0-100.0)
    pub diff_percentage: f64,
    /// Diff visualization, written only when differences exist
    pub diff_path: Option<PathBuf>,
    /// Set when the actual image was promoted to a new baseline
    #[serde(default)]
    pub baseline_created: bool,
    /// Set when the two images differ in size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_mismatch: Option<DimensionMismatch>,
    /// Number of pixels above threshold
    pub diff_pixel_count: usize,
    /// Pixels compared
    pub total_pixels: usize,
    /// Actual image location
    pub actual_path: PathBuf,
    /// Baseline image location
    pub baseline_path: PathBuf,
}

impl ComparisonResult {
    /// Terminal state this result represents
    #[must_use]
    pub const fn outcome(&self) -> ComparisonOutcome {
        if self.baseline_created {
            ComparisonOutcome::BaselineCreated
        } else if self.dimension_mismatch.is_some() {
            ComparisonOutcome::DimensionMismatch
        } else if self.diff_pixel_count == 0 {
            ComparisonOutcome::Identical
        } else {
            ComparisonOutcome::Different
        }
    }

    /// Caller's tolerance policy: accept up to `max_diff_percentage` (0-100)
    ///
    /// Dimension mismatches never pass.
    #[must_use]
    pub fn within(&self, max_diff_percentage: f64) -> bool {
        self.dimension_mismatch.is_none() && self.diff_percentage <= max_diff_percentage
    }

    /// Human readable failure description
    #[must_use]
    pub fn describe(&self) -> String {
        let mut message = format!("{:.2}% of pixels differ", self.diff_percentage);
        if let Some(mismatch) = &self.dimension_mismatch {
            message.push_str(&format!(
                "; dimensions differ (actual {}, baseline {})",
                mismatch.actual, mismatch.baseline
            ));
        }
        if let Some(diff) = &self.diff_path {
            message.push_str(&format!("; diff image: {}", diff.display()));
        }
        message
    }

    /// Fail unless `matches`
    ///
    /// # Errors
    ///
    /// `VisualMismatch` carrying [`Self::describe`]
    pub fn assert_matches(&self) -> InkcheckResult<()> {
        if self.matches {
            Ok(())
        } else {
            Err(InkcheckError::VisualMismatch {
                name: self.name.clone(),
                message: self.describe(),
            })
        }
    }
}

/// Visual regression tester bound to one page and one test
#[derive(Debug)]
pub struct VisualTester<D: PageDriver> {
    driver: D,
    config: VisualConfig,
    store: BaselineStore,
    capture: ScreenshotCapture,
    differ: ImageDiffer,
}

impl<D: PageDriver> VisualTester<D> {
    /// Create a tester for `test_name`
    pub fn new(driver: D, test_name: &str, config: VisualConfig) -> InkcheckResult<Self> {
        config.validate()?;
        let store = BaselineStore::new(config.root_dir.clone());
        let capture = ScreenshotCapture::new(store.clone(), config.browser.clone(), test_name)
            .with_settle_delay(config.settle_delay())
            .with_timeout(config.capture_timeout())
            .with_full_page(config.full_page);
        let differ = ImageDiffer::new(config.threshold);
        Ok(Self {
            driver,
            config,
            store,
            capture,
            differ,
        })
    }

    /// Underlying driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &VisualConfig {
        &self.config
    }

    /// Baseline store
    #[must_use]
    pub const fn store(&self) -> &BaselineStore {
        &self.store
    }

    /// Normalized test name
    #[must_use]
    pub fn test_name(&self) -> &str {
        self.capture.test_name()
    }

    /// Baseline location for `name`
    #[must_use]
    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.store
            .resolve_path(&self.config.browser, self.test_name(), &normalize_name(name))
    }

    /// Actual location for `name`
    #[must_use]
    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.capture.actual_path(name)
    }

    /// Diff location for `name`
    #[must_use]
    pub fn diff_path(&self, name: &str) -> PathBuf {
        self.store
            .diff_path(&self.config.browser, self.test_name(), &normalize_name(name))
    }

    /// Capture `name` then compare it against its baseline
    pub async fn capture_and_compare(
        &self,
        name: &str,
        selector: Option<&str>,
        options: CaptureOptions,
    ) -> InkcheckResult<ComparisonResult> {
        let shot = self
            .capture
            .capture(&self.driver, name, selector, options)
            .await?;
        self.compare(&shot.name)
    }

    /// Compare the current actual image for `name` against its baseline
    ///
    /// # Errors
    ///
    /// `ActualMissing` if nothing was captured, `BaselineMissing` when no
    /// baseline exists and auto-creation is disabled, decode/IO failures.
    pub fn compare(&self, name: &str) -> InkcheckResult<ComparisonResult> {
        let name = normalize_name(name);
        let actual_path = self.actual_path(&name);
        let baseline_path = self.baseline_path(&name);

        if !self.store.exists(&actual_path) {
            return Err(InkcheckError::ActualMissing { path: actual_path });
        }
        debug!(screenshot = %name, "captured");

        if !self.store.exists(&baseline_path) {
            debug!(screenshot = %name, path = %baseline_path.display(), "baseline missing");
            if !self.config.auto_create_baselines {
                return Err(InkcheckError::BaselineMissing {
                    path: baseline_path,
                });
            }
            self.store.promote(&actual_path, &baseline_path)?;
            info!(screenshot = %name, "baseline created");
            return Ok(ComparisonResult {
                name,
                matches: true,
                diff_percentage: 0.0,
                diff_path: None,
                baseline_created: true,
                dimension_mismatch: None,
                diff_pixel_count: 0,
                total_pixels: 0,
                actual_path,
                baseline_path,
            });
        }
        debug!(screenshot = %name, "baseline found");

        let actual = std::fs::read(&actual_path)?;
        let baseline = std::fs::read(&baseline_path)?;
        let outcome = self.differ.compare(&actual, &baseline)?;
        debug!(screenshot = %name, "dimensions checked");

        let diff_percentage = outcome.diff_percentage();
        let path = self.diff_path(&name);
        let diff_path = match outcome.artifact() {
            Some(image) => {
                write_atomic(&path, &encode_png(image)?)?;
                Some(path)
            }
            None => {
                remove_stale_diff(&path)?;
                None
            }
        };

        let result = match outcome {
            DiffOutcome::Identical { dimensions } => ComparisonResult {
                name,
                matches: true,
                diff_percentage,
                diff_path,
                baseline_created: false,
                dimension_mismatch: None,
                diff_pixel_count: 0,
                total_pixels: dimensions.pixel_count() as usize,
                actual_path,
                baseline_path,
            },
            DiffOutcome::Different {
                diff_pixel_count,
                total_pixels,
                ..
            } => ComparisonResult {
                name,
                matches: false,
                diff_percentage,
                diff_path,
                baseline_created: false,
                dimension_mismatch: None,
                diff_pixel_count,
                total_pixels,
                actual_path,
                baseline_path,
            },
            DiffOutcome::DimensionMismatch {
                actual, baseline, ..
            } => ComparisonResult {
                name,
                matches: false,
                diff_percentage,
                diff_path,
                baseline_created: false,
                dimension_mismatch: Some(DimensionMismatch { actual, baseline }),
                diff_pixel_count: actual.pixel_count().max(baseline.pixel_count()) as usize,
                total_pixels: actual.pixel_count().max(baseline.pixel_count()) as usize,
                actual_path,
                baseline_path,
            },
        };
        debug!(
            screenshot = %result.name,
            outcome = ?result.outcome(),
            diff_percentage = result.diff_percentage,
            "compared"
        );
        Ok(result)
    }

    /// Accept the current actual image for `name` as its baseline
    ///
    /// # Errors
    ///
    /// `ActualMissing` if `name` has not been captured in this run
    pub fn update_baseline(&self, name: &str) -> InkcheckResult<PathBuf> {
        let actual_path = self.actual_path(name);
        if !self.store.exists(&actual_path) {
            return Err(InkcheckError::ActualMissing { path: actual_path });
        }
        let baseline_path = self.baseline_path(name);
        self.store.promote(&actual_path, &baseline_path)?;
        Ok(baseline_path)
    }
}

/// Drop a diff image left over from an earlier mismatching run
fn remove_stale_diff(path: &Path) -> InkcheckResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "stale diff removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
