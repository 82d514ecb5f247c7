//! PageDriver - the browser seam used by screenshot capture.
//!
//! The capture pipeline only needs three things from a browser: navigate,
//! wait for an element, and take a PNG. Anything that can do that (a CDP
//! session, a WebDriver client, a test double) can drive visual tests.
//!
//! ```text
//! ┌──────────────────────┐      ┌────────────────────┐
//! │  ScreenshotCapture   │─────►│  dyn PageDriver    │
//! └──────────────────────┘      ├────────────────────┤
//!                               │  ChromiumDriver    │  (feature = "browser")
//!                               │  MockDriver        │  (tests)
//!                               └────────────────────┘
//! ```

use crate::result::{InkcheckError, InkcheckResult};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// What a screenshot covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Visible viewport only
    Viewport,
    /// Whole scrollable page
    FullPage,
    /// A single element matched by selector
    Element(String),
}

/// Abstract browser page used for capture
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> InkcheckResult<()>;

    /// Wait until `selector` matches a visible element
    ///
    /// # Errors
    ///
    /// `Timeout` if the element is not visible within `timeout`
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> InkcheckResult<()>;

    /// Capture PNG bytes of `target`
    async fn screenshot(&self, target: &CaptureTarget) -> InkcheckResult<Vec<u8>>;
}

#[derive(Debug, Default)]
struct MockState {
    frames: VecDeque<Vec<u8>>,
    last_frame: Option<Vec<u8>>,
    visible: HashSet<String>,
    fail_screenshots: bool,
    history: Vec<String>,
}

/// Scripted driver for tests
///
/// Frames are served in order; the last one repeats once the queue drains.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a PNG frame
    #[must_use]
    pub fn with_frame(self, png: Vec<u8>) -> Self {
        self.push_frame(png);
        self
    }

    /// Mark a selector as visible
    #[must_use]
    pub fn with_visible(self, selector: impl Into<String>) -> Self {
        self.lock().visible.insert(selector.into());
        self
    }

    /// Make every screenshot call fail
    #[must_use]
    pub fn failing(self) -> Self {
        self.lock().fail_screenshots = true;
        self
    }

    /// Queue a PNG frame after construction
    pub fn push_frame(&self, png: Vec<u8>) {
        self.lock().frames.push_back(png);
    }

    /// Calls made so far, e.g. `"wait:#hero"`, `"screenshot:FullPage"`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked mid-call
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> InkcheckResult<()> {
        self.lock().history.push(format!("navigate:{url}"));
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> InkcheckResult<()> {
        let mut state = self.lock();
        state.history.push(format!("wait:{selector}"));
        if state.visible.contains(selector) {
            Ok(())
        } else {
            Err(InkcheckError::Timeout {
                ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn screenshot(&self, target: &CaptureTarget) -> InkcheckResult<Vec<u8>> {
        let mut state = self.lock();
        state.history.push(format!("screenshot:{target:?}"));
        if state.fail_screenshots {
            return Err(InkcheckError::driver("mock screenshot failure"));
        }
        if let Some(frame) = state.frames.pop_front() {
            state.last_frame = Some(frame.clone());
            return Ok(frame);
        }
        state
            .last_frame
            .clone()
            .ok_or_else(|| InkcheckError::driver("No mock screenshot set"))
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{async_trait, CaptureTarget, Duration, InkcheckError, InkcheckResult, PageDriver};
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
    use futures::StreamExt;
    use std::time::Instant;

    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Chromium page driven over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: CdpBrowser,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Launch a headless Chromium and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(chromium_path: Option<&str>) -> InkcheckResult<Self> {
            let mut builder = CdpConfig::builder().no_sandbox();
            if let Some(path) = chromium_path {
                builder = builder.chrome_executable(path);
            }
            let config = builder.build().map_err(InkcheckError::driver)?;

            let (browser, mut handler) = CdpBrowser::launch(config)
                .await
                .map_err(|e| InkcheckError::driver(e.to_string()))?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| InkcheckError::driver(e.to_string()))?;

            Ok(Self {
                browser,
                page,
                handle,
            })
        }

        /// Close the browser
        pub async fn close(mut self) -> InkcheckResult<()> {
            self.browser
                .close()
                .await
                .map_err(|e| InkcheckError::driver(e.to_string()))?;
            self.handle.abort();
            Ok(())
        }

        async fn is_visible(&self, selector: &str) -> bool {
            let Ok(element) = self.page.find_element(selector).await else {
                return false;
            };
            element.bounding_box().await.is_ok()
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> InkcheckResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| InkcheckError::driver(format!("navigation to {url} failed: {e}")))?;
            Ok(())
        }

        async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> InkcheckResult<()> {
            let started = Instant::now();
            loop {
                if self.is_visible(selector).await {
                    return Ok(());
                }
                if started.elapsed() >= timeout {
                    return Err(InkcheckError::Timeout {
                        ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        async fn screenshot(&self, target: &CaptureTarget) -> InkcheckResult<Vec<u8>> {
            match target {
                CaptureTarget::Element(selector) => {
                    let element = self
                        .page
                        .find_element(selector.as_str())
                        .await
                        .map_err(|e| InkcheckError::driver(e.to_string()))?;
                    element
                        .screenshot(CaptureScreenshotFormat::Png)
                        .await
                        .map_err(|e| InkcheckError::driver(e.to_string()))
                }
                CaptureTarget::Viewport | CaptureTarget::FullPage => {
                    let params = ScreenshotParams::builder()
                        .format(CaptureScreenshotFormat::Png)
                        .full_page(*target == CaptureTarget::FullPage)
                        .build();
                    self.page
                        .screenshot(params)
                        .await
                        .map_err(|e| InkcheckError::driver(e.to_string()))
                }
            }
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
