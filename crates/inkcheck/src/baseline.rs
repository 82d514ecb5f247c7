//! Baseline store: a directory hierarchy of accepted screenshots.
//!
//! ```text
//! <root>/
//!   baseline/<browser>/<test>_<shot>.png
//!   actual/<browser>/<test>/<test>_<shot>.png
//!   diff/<browser>/<test>/<test>_<shot>.png
//! ```
//!
//! Baselines are only ever written through [`BaselineStore::promote`].
//! Promotion writes a synced temp file next to the destination and renames
//! it into place, so concurrent promoters of the same key never leave a
//! half-written PNG behind (last rename wins).

use crate::naming::screenshot_file_name;
use crate::result::InkcheckResult;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

const BASELINE_DIR: &str = "baseline";
const ACTUAL_DIR: &str = "actual";
const DIFF_DIR: &str = "diff";

/// An actual screenshot found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualEntry {
    /// Normalized test name
    pub test_name: String,
    /// Normalized screenshot name
    pub screenshot_name: String,
    /// Location of the PNG
    pub path: PathBuf,
}

/// Directory-backed baseline repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineStore {
    root: PathBuf,
}

impl BaselineStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Baseline location for (browser, test, screenshot)
    #[must_use]
    pub fn resolve_path(&self, browser: &str, test_name: &str, screenshot_name: &str) -> PathBuf {
        self.root
            .join(BASELINE_DIR)
            .join(browser)
            .join(screenshot_file_name(test_name, screenshot_name))
    }

    /// Actual (current run) location for (browser, test, screenshot)
    #[must_use]
    pub fn actual_path(&self, browser: &str, test_name: &str, screenshot_name: &str) -> PathBuf {
        self.root
            .join(ACTUAL_DIR)
            .join(browser)
            .join(test_name)
            .join(screenshot_file_name(test_name, screenshot_name))
    }

    /// Diff artifact location for (browser, test, screenshot)
    #[must_use]
    pub fn diff_path(&self, browser: &str, test_name: &str, screenshot_name: &str) -> PathBuf {
        self.root
            .join(DIFF_DIR)
            .join(browser)
            .join(test_name)
            .join(screenshot_file_name(test_name, screenshot_name))
    }

    /// Whether a file exists at `path`
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Copy `actual` over `baseline`, creating directories as needed
    pub fn promote(&self, actual: &Path, baseline: &Path) -> InkcheckResult<()> {
        let bytes = fs::read(actual)?;
        write_atomic(baseline, &bytes)?;
        info!(
            actual = %actual.display(),
            baseline = %baseline.display(),
            "baseline promoted"
        );
        Ok(())
    }

    /// Every actual screenshot recorded for `browser`, sorted by path
    pub fn list_actuals(&self, browser: &str) -> InkcheckResult<Vec<ActualEntry>> {
        let browser_dir = self.root.join(ACTUAL_DIR).join(browser);
        if !browser_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for test_dir in fs::read_dir(&browser_dir)? {
            let test_dir = test_dir?;
            if !test_dir.file_type()?.is_dir() {
                continue;
            }
            let test_name = test_dir.file_name().to_string_lossy().into_owned();
            let prefix = format!("{test_name}_");

            for file in fs::read_dir(test_dir.path())? {
                let path = file?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("png") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if let Some(screenshot_name) = stem.strip_prefix(&prefix) {
                    entries.push(ActualEntry {
                        test_name: test_name.clone(),
                        screenshot_name: screenshot_name.to_string(),
                        path: path.clone(),
                    });
                }
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

/// Write `bytes` to `dest` via temp file + fsync + rename
///
/// The temp file is removed on every error path.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> InkcheckResult<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file_mut().sync_all()?;
    temp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
