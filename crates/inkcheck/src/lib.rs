//! Inkcheck: visual regression and run reporting for browser E2E suites
//!
//! Screenshots captured during a test are compared pixel by pixel against
//! stored baselines; a run reporter aggregates test outcomes into HTML and
//! JSON reports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ PageDriver   │──►│ ScreenshotCapture│──►│ actual/*.png │
//! └──────────────┘   └──────────────────┘   └──────┬───────┘
//!                                                  │
//!        ┌──────────────┐   ┌──────────────┐       ▼
//!        │ BaselineStore│◄──│ VisualTester │──► ImageDiffer ──► diff/*.png
//!        └──────────────┘   └──────┬───────┘
//!                                  ▼
//!                          ComparisonResult
//!
//! host runner ──► RunObserver (RunReporter) ──► report-<ts>/{report.html, report.json}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use inkcheck::{CaptureOptions, MockDriver, VisualConfig, VisualTester};
//!
//! # async fn demo(png: Vec<u8>) -> inkcheck::InkcheckResult<()> {
//! let driver = MockDriver::new().with_frame(png);
//! let tester = VisualTester::new(driver, "homepage", VisualConfig::default())?;
//! let result = tester.capture_and_compare("hero", None, CaptureOptions::new()).await?;
//! result.assert_matches()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod baseline;
mod capture;
mod config;
mod diff;
mod driver;
mod naming;
mod result;
mod visual;

/// Run reporter: lifecycle hooks, records, and HTML/JSON output
pub mod reporter;

#[cfg(test)]
#[allow(clippy::expect_used)]
mod testing;

pub use baseline::{ActualEntry, BaselineStore};
pub use capture::{CaptureOptions, CapturedScreenshot, ScreenshotCapture};
pub use config::{
    ReporterConfig, VisualConfig, ENV_AUTO_BASELINE, ENV_BROWSER, ENV_THRESHOLD, ENV_VISUAL_ROOT,
};
pub use diff::{
    decode_png, encode_png, DiffOutcome, Dimensions, ImageDiffer, DIFF_COLOR, MISMATCH_COLOR,
};
#[cfg(feature = "browser")]
pub use driver::ChromiumDriver;
pub use driver::{CaptureTarget, MockDriver, PageDriver};
pub use naming::{derive_test_id, normalize_name, sanitize, screenshot_file_name};
pub use reporter::{
    Attachment, RunObserver, RunOutcome, RunReport, RunReporter, RunStats, RunStatus, SuiteInfo,
    TestCase, TestOutcome, TestStatus, TestStep,
};
pub use result::{InkcheckError, InkcheckResult};
pub use visual::{ComparisonOutcome, ComparisonResult, DimensionMismatch, VisualTester};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        CaptureOptions, ComparisonResult, ImageDiffer, InkcheckError, InkcheckResult, MockDriver,
        PageDriver, ReporterConfig, RunObserver, RunReporter, VisualConfig, VisualTester,
    };
}
