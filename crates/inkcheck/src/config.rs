//! Configuration for visual comparison and run reporting.

use crate::result::{InkcheckError, InkcheckResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`VisualConfig::root_dir`]
pub const ENV_VISUAL_ROOT: &str = "INKCHECK_VISUAL_ROOT";
/// Environment variable overriding [`VisualConfig::browser`]
pub const ENV_BROWSER: &str = "INKCHECK_BROWSER";
/// Environment variable overriding [`VisualConfig::threshold`]
pub const ENV_THRESHOLD: &str = "INKCHECK_THRESHOLD";
/// Environment variable overriding [`VisualConfig::auto_create_baselines`]
pub const ENV_AUTO_BASELINE: &str = "INKCHECK_AUTO_BASELINE";

/// Configuration for visual regression testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Root holding `baseline/`, `actual/` and `diff/`
    pub root_dir: PathBuf,
    /// Browser target name, part of the baseline identity
    pub browser: String,
    /// Per-channel difference threshold (0.0-1.0)
    pub threshold: f64,
    /// Promote the actual image when no baseline exists
    pub auto_create_baselines: bool,
    /// Delay before capture so transitions settle
    pub settle_delay_ms: u64,
    /// How long to wait for a selector to become visible
    pub capture_timeout_ms: u64,
    /// Capture the full scrollable page rather than the viewport
    pub full_page: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("test-results/visual"),
            browser: String::from("chromium"),
            threshold: 0.1,
            auto_create_baselines: true,
            settle_delay_ms: 500,
            capture_timeout_ms: 5000,
            full_page: true,
        }
    }
}

impl VisualConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory
    #[must_use]
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = dir.into();
        self
    }

    /// Set the browser name
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Set the per-channel threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable automatic baseline creation
    #[must_use]
    pub const fn with_auto_create_baselines(mut self, enabled: bool) -> Self {
        self.auto_create_baselines = enabled;
        self
    }

    /// Set the settle delay
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the element visibility timeout
    #[must_use]
    pub const fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the default full-page mode
    #[must_use]
    pub const fn with_full_page(mut self, full_page: bool) -> Self {
        self.full_page = full_page;
        self
    }

    /// Settle delay as a `Duration`
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Capture timeout as a `Duration`
    #[must_use]
    pub const fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> InkcheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: &Path) -> InkcheckResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply `INKCHECK_*` overrides from the process environment
    pub fn apply_env(self) -> InkcheckResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_vars<F>(mut self, lookup: F) -> InkcheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_VISUAL_ROOT) {
            self.root_dir = PathBuf::from(root);
        }
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser = browser;
        }
        if let Some(threshold) = lookup(ENV_THRESHOLD) {
            self.threshold = threshold.trim().parse().map_err(|_| {
                InkcheckError::config(format!("{ENV_THRESHOLD} is not a number: {threshold}"))
            })?;
        }
        if let Some(flag) = lookup(ENV_AUTO_BASELINE) {
            self.auto_create_baselines =
                !matches!(flag.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> InkcheckResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(InkcheckError::config(format!(
                "threshold must be within 0.0..=1.0, got {}",
                self.threshold
            )));
        }
        if self.browser.trim().is_empty() {
            return Err(InkcheckError::config("browser name must not be empty"));
        }
        Ok(())
    }
}

/// Configuration for the run reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Directory under which `report-<timestamp>/` is created
    pub output_root: PathBuf,
    /// Title shown in the HTML report
    pub suite_name: String,
    /// Embed screenshots as data URIs rather than relative links
    pub inline_screenshots: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("test-results"),
            suite_name: String::from("E2E Test Run"),
            inline_screenshots: true,
        }
    }
}

impl ReporterConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output root
    #[must_use]
    pub fn with_output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    /// Set the suite name
    #[must_use]
    pub fn with_suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Toggle inline screenshots
    #[must_use]
    pub const fn with_inline_screenshots(mut self, inline: bool) -> Self {
        self.inline_screenshots = inline;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    mod visual_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = VisualConfig::default();
            assert_eq!(config.root_dir, PathBuf::from("test-results/visual"));
            assert_eq!(config.browser, "chromium");
            assert!((config.threshold - 0.1).abs() < f64::EPSILON);
            assert!(config.auto_create_baselines);
            assert_eq!(config.settle_delay(), Duration::from_millis(500));
            assert_eq!(config.capture_timeout(), Duration::from_secs(5));
        }

        #[test]
        fn test_builder() {
            let config = VisualConfig::new()
                .with_browser("firefox")
                .with_threshold(0.2)
                .with_auto_create_baselines(false)
                .with_settle_delay(Duration::ZERO);
            assert_eq!(config.browser, "firefox");
            assert!(!config.auto_create_baselines);
            assert_eq!(config.settle_delay_ms, 0);
        }

        #[test]
        fn test_from_yaml_partial() {
            let config = VisualConfig::from_yaml_str("browser: webkit\nthreshold: 0.05\n").unwrap();
            assert_eq!(config.browser, "webkit");
            assert!((config.threshold - 0.05).abs() < f64::EPSILON);
            assert_eq!(config.capture_timeout_ms, 5000);
        }

        #[test]
        fn test_from_yaml_rejects_bad_threshold() {
            let err = VisualConfig::from_yaml_str("threshold: 3.0\n").unwrap_err();
            assert!(matches!(err, InkcheckError::Config { .. }));
        }

        #[test]
        fn test_from_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("inkcheck.yaml");
            std::fs::write(&path, "root_dir: shots\nauto_create_baselines: false\n").unwrap();
            let config = VisualConfig::from_yaml_file(&path).unwrap();
            assert_eq!(config.root_dir, PathBuf::from("shots"));
            assert!(!config.auto_create_baselines);
        }

        #[test]
        fn test_apply_vars() {
            let vars: HashMap<&str, &str> = [
                (ENV_VISUAL_ROOT, "/tmp/visual"),
                (ENV_BROWSER, "firefox"),
                (ENV_THRESHOLD, "0.25"),
                (ENV_AUTO_BASELINE, "false"),
            ]
            .into_iter()
            .collect();
            let config = VisualConfig::default()
                .apply_vars(|k| vars.get(k).map(|v| (*v).to_string()))
                .unwrap();
            assert_eq!(config.root_dir, PathBuf::from("/tmp/visual"));
            assert_eq!(config.browser, "firefox");
            assert!((config.threshold - 0.25).abs() < f64::EPSILON);
            assert!(!config.auto_create_baselines);
        }

        #[test]
        fn test_apply_vars_bad_threshold() {
            let result = VisualConfig::default().apply_vars(|k| {
                (k == ENV_THRESHOLD).then(|| "lots".to_string())
            });
            assert!(result.is_err());
        }
    }

    mod reporter_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ReporterConfig::default();
            assert_eq!(config.output_root, PathBuf::from("test-results"));
            assert!(config.inline_screenshots);
        }

        #[test]
        fn test_builder() {
            let config = ReporterConfig::new()
                .with_suite_name("Studio site")
                .with_inline_screenshots(false);
            assert_eq!(config.suite_name, "Studio site");
            assert!(!config.inline_screenshots);
        }
    }
}
