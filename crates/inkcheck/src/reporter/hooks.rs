//! Lifecycle interface a host test runner drives.
//!
//! The host calls these synchronously, in order, for one run. Every method
//! is infallible: an observer must never change a test's outcome.

use super::model::{RunStatus, TestStatus};
use crate::naming::derive_test_id;
use std::path::PathBuf;
use std::time::Duration;

/// Suite-level information available at run start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteInfo {
    /// Number of tests the host intends to run
    pub total_tests: usize,
    /// Host worker count
    pub workers: usize,
}

/// Identity of one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Test title
    pub title: String,
    /// Spec file path
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl TestCase {
    /// Create a test case
    #[must_use]
    pub fn new(file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
            line: 0,
            column: 0,
        }
    }

    /// Set source position
    #[must_use]
    pub const fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Reporter key: sanitized spec-file basename + sanitized title
    #[must_use]
    pub fn id(&self) -> String {
        derive_test_id(&self.file, &self.title)
    }

    /// `file:line:column`
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One step inside a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStep {
    /// Step title
    pub title: String,
    /// Host category
    pub category: String,
}

impl TestStep {
    /// Create a step
    #[must_use]
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
        }
    }
}

/// An artifact produced by the host for a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment name (`screenshot`, `video`, `trace`, ...)
    pub name: String,
    /// MIME type
    pub content_type: String,
    /// File the host wrote, if any
    pub path: Option<PathBuf>,
    /// Inline payload, if the host kept it in memory
    pub body: Option<Vec<u8>>,
}

impl Attachment {
    /// Attachment backed by a file
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            path: Some(path.into()),
            body: None,
        }
    }

    /// Attachment carried in memory
    #[must_use]
    pub fn inline(name: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            path: None,
            body: Some(body),
        }
    }
}

/// Result of one test attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Final status of this attempt
    pub status: TestStatus,
    /// Attempt duration
    pub duration: Duration,
    /// First error, if any
    pub error: Option<String>,
    /// Artifacts
    pub attachments: Vec<Attachment>,
    /// Zero-based retry index
    pub retry: u32,
}

impl TestOutcome {
    /// Create an outcome
    #[must_use]
    pub const fn new(status: TestStatus, duration: Duration) -> Self {
        Self {
            status,
            duration,
            error: None,
            attachments: Vec::new(),
            retry: 0,
        }
    }

    /// Attach an error
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Add an attachment
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Set retry index
    #[must_use]
    pub const fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }
}

/// Host-reported end of run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Overall status
    pub status: RunStatus,
}

/// Observer of a test run's lifecycle
pub trait RunObserver {
    /// Run begins
    fn on_run_start(&mut self, suite: &SuiteInfo);

    /// A test attempt begins
    fn on_test_start(&mut self, test: &TestCase);

    /// A step begins
    fn on_step_start(&mut self, test: &TestCase, step: &TestStep);

    /// A step ends; `error` is set when it failed
    fn on_step_end(&mut self, test: &TestCase, step: &TestStep, error: Option<&str>);

    /// A test attempt ends
    fn on_test_end(&mut self, test: &TestCase, outcome: &TestOutcome);

    /// Run ends
    fn on_run_end(&mut self, outcome: &RunOutcome);
}
