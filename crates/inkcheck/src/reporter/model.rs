//! Records kept by the run reporter and serialized into `report.json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    /// Started, not yet finished
    Running,
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
    /// Test exceeded its timeout
    TimedOut,
    /// Run stopped before the test finished
    Interrupted,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::Interrupted)
    }

    /// Lowercase label used in HTML classes and logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::TimedOut => "timedout",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Step status; moves from `Running` only at step end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    /// Started, not yet finished
    Running,
    /// Completed without error
    Passed,
    /// Completed with an error
    Failed,
}

/// One step inside a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Step title
    pub title: String,
    /// Host category (e.g. `test.step`, `expect`, `pw:api`)
    pub category: String,
    /// Step status
    pub status: StepStatus,
    /// Duration once finished
    pub duration_ms: Option<u64>,
    /// Error message when failed
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) started: Option<Instant>,
}

impl StepRecord {
    pub(crate) fn start(title: &str, category: &str) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            status: StepStatus::Running,
            duration_ms: None,
            error: None,
            started: Some(Instant::now()),
        }
    }

    pub(crate) fn finish(&mut self, error: Option<&str>) {
        self.duration_ms = self.started.map(|s| s.elapsed().as_millis() as u64);
        self.error = error.map(str::to_string);
        self.status = if error.is_some() {
            StepStatus::Failed
        } else {
            StepStatus::Passed
        };
    }
}

/// Kind of artifact attached to a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentKind {
    /// Image
    Screenshot,
    /// Screen recording
    Video,
    /// Trace archive
    Trace,
    /// Anything else (logs, text); recorded but not copied
    Other,
}

impl AttachmentKind {
    /// Classify by attachment name and content type
    #[must_use]
    pub fn classify(name: &str, content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Screenshot
        } else if content_type.starts_with("video/") {
            Self::Video
        } else if name == "trace" || content_type == "application/zip" {
            Self::Trace
        } else {
            Self::Other
        }
    }

    /// Report subdirectory for copied artifacts of this kind
    #[must_use]
    pub const fn directory(&self) -> Option<&'static str> {
        match self {
            Self::Screenshot => Some("screenshots"),
            Self::Video => Some("videos"),
            Self::Trace => Some("traces"),
            Self::Other => None,
        }
    }
}

/// One attachment on a test record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRecord {
    /// Attachment name
    pub name: String,
    /// Kind
    pub kind: AttachmentKind,
    /// MIME type
    pub content_type: String,
    /// Path relative to the report directory, once copied
    pub path: Option<PathBuf>,
    /// Where the host runner left the file
    pub original_path: Option<PathBuf>,
}

/// Everything recorded about one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    /// Derived test ID (spec-file basename + title, sanitized)
    pub id: String,
    /// Test title
    pub title: String,
    /// `file:line:column`
    pub location: String,
    /// Final (or current) status
    pub status: TestStatus,
    /// Duration of the last attempt
    pub duration_ms: u64,
    /// Error of the last attempt
    pub error: Option<String>,
    /// Attachments across all attempts
    pub attachments: Vec<AttachmentRecord>,
    /// Steps of the last attempt
    pub steps: Vec<StepRecord>,
    /// Status of every finished attempt, in order
    pub attempts: Vec<TestStatus>,
    /// An error was recorded at some point
    pub had_error: bool,
}

impl TestRecord {
    pub(crate) fn new(id: String, title: &str, location: String) -> Self {
        Self {
            id,
            title: title.to_string(),
            location,
            status: TestStatus::Running,
            duration_ms: 0,
            error: None,
            attachments: Vec::new(),
            steps: Vec::new(),
            attempts: Vec::new(),
            had_error: false,
        }
    }

    /// Passed in the end but not cleanly
    ///
    /// True when the final status is `Passed` and either an earlier attempt
    /// did not pass or an error was recorded along the way.
    #[must_use]
    pub fn is_flaky(&self) -> bool {
        if !self.status.is_passed() {
            return false;
        }
        let earlier = self.attempts.len().saturating_sub(1);
        self.had_error || self.attempts[..earlier].iter().any(|s| !s.is_passed())
    }
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Tests recorded
    pub total: usize,
    /// Final status passed (flaky included)
    pub passed: usize,
    /// Failed, timed out or interrupted
    pub failed: usize,
    /// Skipped
    pub skipped: usize,
    /// Passed but flaky
    pub flaky: usize,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl RunStats {
    /// Compute stats over `records`
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.status {
                TestStatus::Passed => stats.passed += 1,
                TestStatus::Skipped => stats.skipped += 1,
                s if s.is_failed() => stats.failed += 1,
                _ => {}
            }
            if record.is_flaky() {
                stats.flaky += 1;
            }
        }
        stats
    }

    /// Pass rate (0.0 to 1.0) over non-skipped tests
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.passed + self.failed;
        if ran == 0 {
            return 1.0;
        }
        self.passed as f64 / ran as f64
    }
}

/// Overall run status reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    /// Every test passed or was skipped
    Passed,
    /// At least one failure
    Failed,
    /// Global timeout hit
    TimedOut,
    /// Stopped by the user or a signal
    Interrupted,
}

/// Machine-readable run report (`report.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Suite title
    pub suite_name: String,
    /// RFC 3339 run start
    pub started_at: String,
    /// RFC 3339 run end
    pub finished_at: Option<String>,
    /// Tests the host planned to run
    pub planned_tests: usize,
    /// Host-reported status
    pub status: Option<RunStatus>,
    /// Aggregates
    pub stats: RunStats,
    /// Per-test records, ordered by test ID
    pub tests: Vec<TestRecord>,
}

impl RunReport {
    /// One-line human summary
    #[must_use]
    pub fn summary_line(&self) -> String {
        let s = &self.stats;
        format!(
            "{}: {} passed, {} failed, {} skipped, {} flaky ({} total) in {:.2}s",
            self.suite_name,
            s.passed,
            s.failed,
            s.skipped,
            s.flaky,
            s.total,
            s.duration_ms as f64 / 1000.0
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(id: &str, status: TestStatus) -> TestRecord {
        let mut r = TestRecord::new(id.to_string(), id, format!("{id}.spec.ts:1:1"));
        r.status = status;
        r.attempts.push(status);
        r
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_failed_family() {
            assert!(TestStatus::Failed.is_failed());
            assert!(TestStatus::TimedOut.is_failed());
            assert!(TestStatus::Interrupted.is_failed());
            assert!(!TestStatus::Skipped.is_failed());
            assert!(!TestStatus::Running.is_failed());
        }

        #[test]
        fn test_serialized_names() {
            assert_eq!(
                serde_json::to_string(&TestStatus::TimedOut).unwrap(),
                "\"timedOut\""
            );
        }
    }

    mod attachment_tests {
        use super::*;

        #[test]
        fn test_classify() {
            assert_eq!(
                AttachmentKind::classify("screenshot", "image/png"),
                AttachmentKind::Screenshot
            );
            assert_eq!(
                AttachmentKind::classify("video", "video/webm"),
                AttachmentKind::Video
            );
            assert_eq!(
                AttachmentKind::classify("trace", "application/zip"),
                AttachmentKind::Trace
            );
            assert_eq!(
                AttachmentKind::classify("stdout", "text/plain"),
                AttachmentKind::Other
            );
            assert_eq!(AttachmentKind::Other.directory(), None);
        }
    }

    mod flaky_tests {
        use super::*;

        #[test]
        fn test_clean_pass_is_not_flaky() {
            assert!(!record("a", TestStatus::Passed).is_flaky());
        }

        #[test]
        fn test_pass_after_failed_attempt() {
            let mut r = record("a", TestStatus::Failed);
            r.attempts.push(TestStatus::Passed);
            r.status = TestStatus::Passed;
            assert!(r.is_flaky());
        }

        #[test]
        fn test_pass_with_recorded_error() {
            let mut r = record("a", TestStatus::Passed);
            r.had_error = true;
            assert!(r.is_flaky());
        }

        #[test]
        fn test_failure_is_never_flaky() {
            let mut r = record("a", TestStatus::Failed);
            r.had_error = true;
            assert!(!r.is_flaky());
        }

        #[test]
        fn test_no_attempts_recorded() {
            let mut r = record("a", TestStatus::Passed);
            r.attempts.clear();
            assert!(!r.is_flaky());
        }
    }

    mod stats_tests {
        use super::*;

        #[test]
        fn test_known_outcomes() {
            let records = [
                record("p1", TestStatus::Passed),
                record("p2", TestStatus::Passed),
                record("p3", TestStatus::Passed),
                record("f1", TestStatus::Failed),
                record("f2", TestStatus::TimedOut),
                record("s1", TestStatus::Skipped),
            ];
            let stats = RunStats::from_records(&records);
            assert_eq!(stats.total, 6);
            assert_eq!(stats.passed, 3);
            assert_eq!(stats.failed, 2);
            assert_eq!(stats.skipped, 1);
            assert_eq!(stats.flaky, 0);
            assert!((stats.pass_rate() - 0.6).abs() < f64::EPSILON);
        }

        #[test]
        fn test_empty_pass_rate() {
            assert!((RunStats::default().pass_rate() - 1.0).abs() < f64::EPSILON);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn test_step_lifecycle() {
            let mut step = StepRecord::start("fill booking form", "test.step");
            assert_eq!(step.status, StepStatus::Running);
            step.finish(None);
            assert_eq!(step.status, StepStatus::Passed);
            assert!(step.duration_ms.is_some());

            let mut failing = StepRecord::start("submit", "test.step");
            failing.finish(Some("button disabled"));
            assert_eq!(failing.status, StepStatus::Failed);
            assert_eq!(failing.error.as_deref(), Some("button disabled"));
        }
    }
}
