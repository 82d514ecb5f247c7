//! HTML rendering for run reports.

use super::model::{
    AttachmentKind, AttachmentRecord, RunReport, StepStatus, TestRecord, TestStatus,
};
use base64::Engine;
use std::path::Path;

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; color: #222; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .progress-bar .fill { background: #4caf50; height: 100%; }
        .counts span { margin-right: 16px; font-weight: 600; }
        .filters button { margin-right: 6px; padding: 4px 12px; border: 1px solid #bbb; border-radius: 4px; background: #fff; cursor: pointer; }
        .filters button.active { background: #333; color: #fff; }
        .test { padding: 10px; margin: 8px 0; border-radius: 4px; }
        .test.passed { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.flaky { background: #fffde7; border-left: 4px solid #fbc02d; }
        .test.failed, .test.timedout, .test.interrupted { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skipped, .test.running { background: #fff3e0; border-left: 4px solid #ff9800; }
        .location { color: #666; font-size: 0.85em; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .steps { margin: 6px 0 0 0; padding-left: 18px; font-size: 0.9em; }
        .steps .failed { color: #d32f2f; }
        .attachments { display: flex; flex-wrap: wrap; gap: 10px; margin-top: 8px; }
        .attachments img, .attachments video { max-width: 320px; border: 1px solid #ddd; }
"#;

const SCRIPT: &str = r#"
        function filterTests(status) {
            document.querySelectorAll('.filters button').forEach(function (b) {
                b.classList.toggle('active', b.dataset.status === status);
            });
            document.querySelectorAll('.test').forEach(function (t) {
                var show = status === 'all' || t.dataset.status === status
                    || (status === 'passed' && t.dataset.passed === 'true');
                t.style.display = show ? '' : 'none';
            });
        }
"#;

/// Render a self-contained HTML report
///
/// `report_dir` resolves attachment paths when screenshots are inlined.
#[must_use]
pub fn render_html(report: &RunReport, report_dir: &Path, inline_screenshots: bool) -> String {
    let stats = &report.stats;
    let mut html = String::new();

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{STYLE}    </style>
    <script>{SCRIPT}    </script>
</head>
<body>
"#,
        title = escape_html(&report.suite_name)
    ));

    html.push_str(&format!(
        r#"<div class="summary">
    <h1>{}</h1>
    <p>Started {} &middot; Duration {:.2}s</p>
    <div class="progress-bar"><div class="fill" style="width: {:.1}%"></div></div>
    <p class="counts"><span>Total {}</span><span>Passed {}</span><span>Failed {}</span><span>Skipped {}</span><span>Flaky {}</span></p>
</div>
<div class="filters">
    <button class="active" data-status="all" onclick="filterTests('all')">All</button>
    <button data-status="passed" onclick="filterTests('passed')">Passed</button>
    <button data-status="failed" onclick="filterTests('failed')">Failed</button>
    <button data-status="flaky" onclick="filterTests('flaky')">Flaky</button>
    <button data-status="skipped" onclick="filterTests('skipped')">Skipped</button>
</div>
"#,
        escape_html(&report.suite_name),
        escape_html(&report.started_at),
        stats.duration_ms as f64 / 1000.0,
        stats.pass_rate() * 100.0,
        stats.total,
        stats.passed,
        stats.failed,
        stats.skipped,
        stats.flaky,
    ));

    html.push_str("<h2>Tests</h2>\n");
    for test in &report.tests {
        render_test(&mut html, test, report_dir, inline_screenshots);
    }

    html.push_str(
        r#"
<footer>
    <p>Generated by Inkcheck</p>
</footer>
</body>
</html>
"#,
    );
    html
}

fn filter_status(test: &TestRecord) -> &'static str {
    if test.is_flaky() {
        "flaky"
    } else if test.status.is_failed() {
        "failed"
    } else {
        test.status.label()
    }
}

fn render_test(html: &mut String, test: &TestRecord, report_dir: &Path, inline: bool) {
    let status = filter_status(test);
    let passed = matches!(test.status, TestStatus::Passed);
    html.push_str(&format!(
        r#"<div class="test {status}" data-status="{status}" data-passed="{passed}">
    <strong>{}</strong> &mdash; {} ({} ms)
    <div class="location">{}</div>
"#,
        escape_html(&test.title),
        test.status.label(),
        test.duration_ms,
        escape_html(&test.location),
    ));

    if let Some(error) = &test.error {
        html.push_str(&format!(
            "    <div class=\"error\">{}</div>\n",
            escape_html(error)
        ));
    }

    if !test.steps.is_empty() {
        html.push_str("    <ul class=\"steps\">\n");
        for step in &test.steps {
            let class = match step.status {
                StepStatus::Failed => "failed",
                StepStatus::Passed => "passed",
                StepStatus::Running => "running",
            };
            html.push_str(&format!(
                "        <li class=\"{class}\">{} <small>{}</small></li>\n",
                escape_html(&step.title),
                step.duration_ms
                    .map(|ms| format!("{ms} ms"))
                    .unwrap_or_default()
            ));
        }
        html.push_str("    </ul>\n");
    }

    if !test.attachments.is_empty() {
        html.push_str("    <div class=\"attachments\">\n");
        for attachment in &test.attachments {
            render_attachment(html, attachment, report_dir, inline);
        }
        html.push_str("    </div>\n");
    }

    html.push_str("</div>\n");
}

fn render_attachment(html: &mut String, attachment: &AttachmentRecord, report_dir: &Path, inline: bool) {
    let Some(rel) = &attachment.path else {
        html.push_str(&format!(
            "        <span>{} (not copied)</span>\n",
            escape_html(&attachment.name)
        ));
        return;
    };
    let href = escape_html(&rel.to_string_lossy().replace('\\', "/"));
    let name = escape_html(&attachment.name);

    match attachment.kind {
        AttachmentKind::Screenshot => {
            let src = if inline {
                std::fs::read(report_dir.join(rel)).ok().map(|bytes| {
                    format!(
                        "data:{};base64,{}",
                        escape_html(&attachment.content_type),
                        base64::engine::general_purpose::STANDARD.encode(bytes)
                    )
                })
            } else {
                None
            };
            html.push_str(&format!(
                "        <a href=\"{href}\"><img alt=\"{name}\" src=\"{}\"></a>\n",
                src.unwrap_or_else(|| href.clone())
            ));
        }
        AttachmentKind::Video => {
            html.push_str(&format!(
                "        <video controls src=\"{href}\" title=\"{name}\"></video>\n"
            ));
        }
        AttachmentKind::Trace | AttachmentKind::Other => {
            html.push_str(&format!("        <a href=\"{href}\">{name}</a>\n"));
        }
    }
}

/// Escape HTML special characters
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
