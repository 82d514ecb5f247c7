//! Run reporter.
//!
//! [`RunReporter`] observes one run through [`RunObserver`] and writes a
//! timestamped report directory:
//!
//! ```text
//! report-<timestamp>/
//!   summary.json
//!   report.html
//!   report.json
//!   test-run.log
//!   screenshots/<testId>-<file>
//!   videos/<testId>-<file>
//!   traces/<testId>-<file>
//! ```
//!
//! The directory is claimed with `create_dir`, so reporters started in the
//! same millisecond get `report-<timestamp>-1/`, `-2/` and so on. Retry
//! attachments are named `<testId>-retry<N>-<file>`; any remaining clash
//! gets a numeric suffix.
//!
//! Every filesystem operation is best effort: failures are logged with
//! `tracing::warn!` and never reach the host runner.

mod hooks;
mod html;
mod model;

pub use hooks::{
    Attachment, RunObserver, RunOutcome, SuiteInfo, TestCase, TestOutcome, TestStep,
};
pub use html::render_html;
pub use model::{
    AttachmentKind, AttachmentRecord, RunReport, RunStats, RunStatus, StepRecord, StepStatus,
    TestRecord, TestStatus,
};

use crate::config::ReporterConfig;
use crate::naming::sanitize;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

const RUN_LOG: &str = "test-run.log";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    suite_name: &'a str,
    started_at: &'a str,
    finished_at: Option<&'a str>,
    planned_tests: usize,
    status: Option<RunStatus>,
    stats: RunStats,
}

/// Reporter that writes HTML and JSON reports for one run
#[derive(Debug)]
pub struct RunReporter {
    config: ReporterConfig,
    output_dir: PathBuf,
    started_at: String,
    started: Instant,
    planned_tests: usize,
    records: BTreeMap<String, TestRecord>,
    report: Option<RunReport>,
}

impl RunReporter {
    /// Create a reporter; the output directory is stamped again at run start
    #[must_use]
    pub fn new(config: ReporterConfig) -> Self {
        let (started_at, dir_name) = stamp();
        Self {
            output_dir: config.output_root.join(dir_name),
            config,
            started_at,
            started: Instant::now(),
            planned_tests: 0,
            records: BTreeMap::new(),
            report: None,
        }
    }

    /// Report directory for this run
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reporter configuration
    #[must_use]
    pub const fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// All records, ordered by test ID
    pub fn records(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.values()
    }

    /// Record for one test ID
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&TestRecord> {
        self.records.get(id)
    }

    /// Final report, available after `on_run_end`
    #[must_use]
    pub const fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// Aggregate counts over the records seen so far
    #[must_use]
    pub fn generate_stats(&self) -> RunStats {
        let mut stats = RunStats::from_records(self.records.values());
        stats.duration_ms = self.started.elapsed().as_millis() as u64;
        stats
    }

    fn record_mut(&mut self, test: &TestCase) -> &mut TestRecord {
        self.records
            .entry(test.id())
            .or_insert_with_key(|id| TestRecord::new(id.clone(), &test.title, test.location()))
    }

    fn write_summary(&self, finished_at: Option<&str>, status: Option<RunStatus>, stats: RunStats) {
        let summary = Summary {
            suite_name: &self.config.suite_name,
            started_at: &self.started_at,
            finished_at,
            planned_tests: self.planned_tests,
            status,
            stats,
        };
        let path = self.output_dir.join("summary.json");
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => best_effort("write summary", &path, fs::write(&path, json)),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to serialize summary"),
        }
    }

    fn append_log(&self, line: &str) {
        let path = self.output_dir.join(RUN_LOG);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{line}"));
        best_effort("append run log", &path, result);
    }

    /// Copy or write one attachment into the report tree
    fn store_attachment(
        &self,
        test_id: &str,
        retry: u32,
        attachment: &Attachment,
    ) -> AttachmentRecord {
        let kind = AttachmentKind::classify(&attachment.name, &attachment.content_type);
        let mut record = AttachmentRecord {
            name: attachment.name.clone(),
            kind,
            content_type: attachment.content_type.clone(),
            path: None,
            original_path: attachment.path.clone(),
        };
        let Some(subdir) = kind.directory() else {
            return record;
        };

        let file_name = match (&attachment.path, &attachment.body) {
            (Some(source), _) => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| sanitize(&attachment.name)),
            (None, Some(_)) => format!(
                "{}.{}",
                sanitize(&attachment.name),
                extension_for(&attachment.content_type)
            ),
            (None, None) => return record,
        };
        let prefix = if retry == 0 {
            test_id.to_string()
        } else {
            format!("{test_id}-retry{retry}")
        };
        let dir = self.output_dir.join(subdir);
        let rel = Path::new(subdir).join(free_name(&dir, &prefix, &file_name));
        let dest = self.output_dir.join(&rel);

        let result = match (&attachment.path, &attachment.body) {
            (Some(source), _) => fs::copy(source, &dest).map(|_| ()),
            (None, Some(body)) => fs::write(&dest, body),
            (None, None) => return record,
        };
        match result {
            Ok(()) => {
                debug!(test = %test_id, attachment = %attachment.name, path = %dest.display(), "attachment stored");
                record.path = Some(rel);
            }
            Err(e) => warn!(
                test = %test_id,
                attachment = %attachment.name,
                error = %e,
                "failed to copy attachment"
            ),
        }
        record
    }
}

impl RunObserver for RunReporter {
    fn on_run_start(&mut self, suite: &SuiteInfo) {
        let (started_at, dir_name) = stamp();
        self.started_at = started_at;
        self.output_dir = claim_output_dir(&self.config.output_root, &dir_name);
        self.started = Instant::now();
        self.planned_tests = suite.total_tests;
        self.records.clear();
        self.report = None;

        for kind in [
            AttachmentKind::Screenshot,
            AttachmentKind::Video,
            AttachmentKind::Trace,
        ] {
            if let Some(subdir) = kind.directory() {
                let dir = self.output_dir.join(subdir);
                best_effort("create report directory", &dir, fs::create_dir_all(&dir));
            }
        }
        self.write_summary(None, None, RunStats::default());
        info!(
            dir = %self.output_dir.display(),
            tests = suite.total_tests,
            workers = suite.workers,
            "run started"
        );
    }

    fn on_test_start(&mut self, test: &TestCase) {
        let record = self.record_mut(test);
        record.status = TestStatus::Running;
        record.error = None;
        record.steps.clear();
        debug!(test = %record.id, "test started");
    }

    fn on_step_start(&mut self, test: &TestCase, step: &TestStep) {
        self.record_mut(test)
            .steps
            .push(StepRecord::start(&step.title, &step.category));
    }

    fn on_step_end(&mut self, test: &TestCase, step: &TestStep, error: Option<&str>) {
        let record = self.record_mut(test);
        let open = record
            .steps
            .iter_mut()
            .rev()
            .find(|s| s.title == step.title && s.status == StepStatus::Running);
        match open {
            Some(s) => s.finish(error),
            None => debug!(test = %record.id, step = %step.title, "step end without start"),
        }
    }

    fn on_test_end(&mut self, test: &TestCase, outcome: &TestOutcome) {
        let id = test.id();
        let stored: Vec<AttachmentRecord> = outcome
            .attachments
            .iter()
            .map(|a| self.store_attachment(&id, outcome.retry, a))
            .collect();

        let record = self.record_mut(test);
        record.status = outcome.status;
        record.duration_ms = outcome.duration.as_millis() as u64;
        record.error = outcome.error.clone();
        record.had_error |= outcome.error.is_some();
        record.attempts.push(outcome.status);
        record.attachments.extend(stored);

        let mut line = format!(
            "[{}] {} ({} ms, attempt {})",
            outcome.status.label(),
            id,
            record.duration_ms,
            outcome.retry + 1
        );
        if let Some(error) = &outcome.error {
            warn!(test = %id, status = outcome.status.label(), error = %error, "test did not pass cleanly");
            line.push_str(": ");
            line.push_str(error);
        } else {
            debug!(test = %id, status = outcome.status.label(), "test finished");
        }
        self.append_log(&line);
    }

    fn on_run_end(&mut self, outcome: &RunOutcome) {
        let stats = self.generate_stats();
        let finished_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let report = RunReport {
            suite_name: self.config.suite_name.clone(),
            started_at: self.started_at.clone(),
            finished_at: Some(finished_at.clone()),
            planned_tests: self.planned_tests,
            status: Some(outcome.status),
            stats,
            tests: self.records.values().cloned().collect(),
        };

        let json_path = self.output_dir.join("report.json");
        match serde_json::to_string_pretty(&report) {
            Ok(json) => best_effort("write JSON report", &json_path, fs::write(&json_path, json)),
            Err(e) => warn!(error = %e, "failed to serialize report"),
        }

        let html_path = self.output_dir.join("report.html");
        let html = render_html(&report, &self.output_dir, self.config.inline_screenshots);
        best_effort("write HTML report", &html_path, fs::write(&html_path, html));

        self.write_summary(Some(&finished_at), Some(outcome.status), stats);

        let line = report.summary_line();
        println!("{line}");
        self.append_log(&line);
        info!(dir = %self.output_dir.display(), "report written");
        self.report = Some(report);
    }
}

/// RFC 3339 timestamp and the report directory name derived from it
fn stamp() -> (String, String) {
    let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let dir_name = format!("report-{}", started_at.replace([':', '.'], "-"));
    (started_at, dir_name)
}

/// Create `root/name`, or `root/name-<n>` when another reporter got there first
fn claim_output_dir(root: &Path, name: &str) -> PathBuf {
    let mut candidate = root.join(name);
    if let Err(e) = fs::create_dir_all(root) {
        warn!(path = %root.display(), error = %e, "failed to create report root");
        return candidate;
    }
    let mut suffix = 0u32;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return candidate,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                suffix += 1;
                candidate = root.join(format!("{name}-{suffix}"));
            }
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, "failed to create report directory");
                return candidate;
            }
        }
    }
}

/// `<prefix>-<file>`, or `<prefix>-<stem>-<n>.<ext>` if that is taken in `dir`
fn free_name(dir: &Path, prefix: &str, file_name: &str) -> String {
    let name = format!("{prefix}-{file_name}");
    if !dir.join(&name).exists() {
        return name;
    }
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (file_name, String::new()),
    };
    let mut n = 1u32;
    loop {
        let name = format!("{prefix}-{stem}-{n}{ext}");
        if !dir.join(&name).exists() {
            return name;
        }
        n += 1;
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "video/webm" => "webm",
        "video/mp4" => "mp4",
        "application/zip" => "zip",
        _ => "bin",
    }
}

fn best_effort(action: &str, path: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "failed to {action}");
    }
}
