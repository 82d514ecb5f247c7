//! Screenshot capture into the per-run `actual/` tree.

use crate::baseline::BaselineStore;
use crate::diff::Dimensions;
use crate::driver::{CaptureTarget, PageDriver};
use crate::naming::normalize_name;
use crate::result::{InkcheckError, InkcheckResult};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Per-call capture options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureOptions {
    /// Override full-page mode (ignored for element captures)
    pub full_page: Option<bool>,
    /// Override the element visibility timeout
    pub timeout: Option<Duration>,
}

impl CaptureOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set full-page mode
    #[must_use]
    pub const fn full_page(mut self, full_page: bool) -> Self {
        self.full_page = Some(full_page);
        self
    }

    /// Set the visibility timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A screenshot written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedScreenshot {
    /// Normalized screenshot name
    pub name: String,
    /// Location of the PNG
    pub path: PathBuf,
    /// Pixel dimensions
    pub dimensions: Dimensions,
}

/// Captures screenshots for one test on one browser page
#[derive(Debug, Clone)]
pub struct ScreenshotCapture {
    store: BaselineStore,
    browser: String,
    test_name: String,
    settle_delay: Duration,
    default_timeout: Duration,
    default_full_page: bool,
}

impl ScreenshotCapture {
    /// Create a capturer writing under `store`'s `actual/` tree
    #[must_use]
    pub fn new(
        store: BaselineStore,
        browser: impl Into<String>,
        test_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            browser: browser.into(),
            test_name: normalize_name(&test_name.into()),
            settle_delay: Duration::from_millis(500),
            default_timeout: Duration::from_millis(5000),
            default_full_page: true,
        }
    }

    /// Set the settle delay
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the default visibility timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the default full-page mode
    #[must_use]
    pub const fn with_full_page(mut self, full_page: bool) -> Self {
        self.default_full_page = full_page;
        self
    }

    /// Normalized test name
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Where the actual image for `name` lands
    #[must_use]
    pub fn actual_path(&self, name: &str) -> PathBuf {
        self.store
            .actual_path(&self.browser, &self.test_name, &normalize_name(name))
    }

    /// Capture `name`, optionally scoped to `selector`
    ///
    /// # Errors
    ///
    /// `Capture` if the element never becomes visible or the driver fails.
    /// No file is guaranteed to exist after an error.
    pub async fn capture<D>(
        &self,
        driver: &D,
        name: &str,
        selector: Option<&str>,
        options: CaptureOptions,
    ) -> InkcheckResult<CapturedScreenshot>
    where
        D: PageDriver + ?Sized,
    {
        let name = normalize_name(name);
        let target = match selector {
            Some(selector) => {
                let timeout = options.timeout.unwrap_or(self.default_timeout);
                driver
                    .wait_for_visible(selector, timeout)
                    .await
                    .map_err(|e| InkcheckError::capture(&name, &e))?;
                CaptureTarget::Element(selector.to_string())
            }
            None if options.full_page.unwrap_or(self.default_full_page) => CaptureTarget::FullPage,
            None => CaptureTarget::Viewport,
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let png = driver
            .screenshot(&target)
            .await
            .map_err(|e| InkcheckError::capture(&name, &e))?;
        let dimensions = Dimensions::of_png(&png).map_err(|e| InkcheckError::capture(&name, &e))?;

        let path = self.store.actual_path(&self.browser, &self.test_name, &name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &png)?;
        debug!(screenshot = %name, path = %path.display(), ?target, "captured");

        Ok(CapturedScreenshot {
            name,
            path,
            dimensions,
        })
    }
}
