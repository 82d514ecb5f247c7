//! Smoke tests for the inkcheck CLI
//!
//! These tests run the real binary against files in a temp directory.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the inkcheck binary
fn inkcheck() -> Command {
    let mut cmd = Command::cargo_bin("inkcheck").expect("inkcheck binary should exist");
    cmd.env_remove("INKCHECK_THRESHOLD")
        .env_remove("INKCHECK_VISUAL_ROOT")
        .env_remove("INKCHECK_BROWSER")
        .env_remove("RUST_LOG");
    cmd
}

fn png(path: &Path, width: u32, height: u32, dot: Option<(u32, u32)>) -> PathBuf {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([250, 250, 250, 255]));
    if let Some((x, y)) = dot {
        img.put_pixel(x, y, Rgba([10, 10, 10, 255]));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    img.save(path).unwrap();
    path.to_path_buf()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    inkcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_flag() {
    inkcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn test_no_args_shows_help() {
    inkcheck().assert().failure();
}

// ============================================================================
// Diff
// ============================================================================

#[test]
fn test_diff_identical_succeeds() {
    let dir = TempDir::new().unwrap();
    let a = png(&dir.path().join("a.png"), 20, 20, None);
    let b = png(&dir.path().join("b.png"), 20, 20, None);

    inkcheck()
        .args(["diff"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn test_diff_mismatch_fails_and_writes_image() {
    let dir = TempDir::new().unwrap();
    let a = png(&dir.path().join("a.png"), 50, 50, Some((5, 5)));
    let b = png(&dir.path().join("b.png"), 50, 50, None);
    let out = dir.path().join("out/diff.png");

    inkcheck()
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("0.04%"))
        .stderr(predicate::str::contains("Images differ"));
    assert!(out.is_file());
}

#[test]
fn test_diff_json_output() {
    let dir = TempDir::new().unwrap();
    let a = png(&dir.path().join("a.png"), 100, 100, None);
    let b = png(&dir.path().join("b.png"), 200, 150, None);

    let output = inkcheck()
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .arg("--json")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["matches"], false);
    assert_eq!(json["diffPercentage"], 100.0);
    assert!(json["dimensionMismatch"].is_array());
}

#[test]
fn test_diff_threshold_from_env() {
    let dir = TempDir::new().unwrap();
    let a = png(&dir.path().join("a.png"), 4, 4, Some((0, 0)));
    let b = png(&dir.path().join("b.png"), 4, 4, None);

    inkcheck()
        .env("INKCHECK_THRESHOLD", "1.0")
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .assert()
        .success();
}

#[test]
fn test_diff_missing_file() {
    let dir = TempDir::new().unwrap();
    let a = png(&dir.path().join("a.png"), 4, 4, None);
    inkcheck()
        .arg("diff")
        .arg(&a)
        .arg(dir.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// Approve
// ============================================================================

#[test]
fn test_approve_promotes_actuals() {
    let dir = TempDir::new().unwrap();
    png(
        &dir.path().join("actual/chromium/homepage/homepage_hero.png"),
        8,
        8,
        None,
    );

    inkcheck()
        .arg("approve")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED"));
    assert!(dir
        .path()
        .join("baseline/chromium/homepage_hero.png")
        .is_file());
}

#[test]
fn test_verbose_approve_shows_source() {
    let dir = TempDir::new().unwrap();
    png(
        &dir.path().join("actual/chromium/gallery/gallery_grid.png"),
        8,
        8,
        None,
    );

    inkcheck()
        .args(["-v", "approve", "--dry-run", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from "))
        .stdout(predicate::str::contains("gallery_grid.png"));
}

#[test]
fn test_approve_root_from_env_dry_run() {
    let dir = TempDir::new().unwrap();
    png(
        &dir.path().join("actual/firefox/cart/cart_total.png"),
        8,
        8,
        None,
    );

    inkcheck()
        .env("INKCHECK_VISUAL_ROOT", dir.path())
        .env("INKCHECK_BROWSER", "firefox")
        .args(["approve", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WOULD APPROVE"));
    assert!(!dir.path().join("baseline/firefox/cart_total.png").exists());
}

// ============================================================================
// Summary
// ============================================================================

const REPORT: &str = r#"{
  "suiteName": "Studio",
  "startedAt": "2026-10-19T10:00:00.000Z",
  "finishedAt": "2026-10-19T10:00:03.000Z",
  "plannedTests": 2,
  "status": "failed",
  "stats": { "total": 2, "passed": 1, "failed": 1, "skipped": 0, "flaky": 0, "durationMs": 3000 },
  "tests": [
    { "id": "site_spec-booking", "title": "booking", "location": "site.spec.ts:3:1",
      "status": "failed", "durationMs": 20, "error": "Visual mismatch for 'form'",
      "attachments": [], "steps": [], "attempts": ["failed"], "hadError": true },
    { "id": "site_spec-home", "title": "home", "location": "site.spec.ts:1:1",
      "status": "passed", "durationMs": 10, "error": null,
      "attachments": [], "steps": [], "attempts": ["passed"], "hadError": false }
  ]
}"#;

#[test]
fn test_summary_prints_stats() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, REPORT).unwrap();

    inkcheck()
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 passed, 1 failed"))
        .stdout(predicate::str::contains("Visual mismatch for 'form'"));
}

#[test]
fn test_summary_strict_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, REPORT).unwrap();

    inkcheck()
        .args(["summary", "--strict"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 tests failed"));
}

#[test]
fn test_quiet_suppresses_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, REPORT).unwrap();

    inkcheck()
        .args(["-q", "summary"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
