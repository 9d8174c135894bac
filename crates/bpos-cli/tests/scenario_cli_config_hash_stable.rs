//! Scenario: `bpos config-hash` is deterministic and layer-aware.
//!
//! No database required — config hashing is pure file work.

use std::io::Write;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn write_yaml(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).expect("create yaml");
    f.write_all(content.as_bytes()).expect("write yaml");
    path.to_string_lossy().to_string()
}

#[test]
fn config_hash_is_stable_across_invocations() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = write_yaml(
        &dir,
        "base.yaml",
        "placement:\n  max_attempts: 3\n  backoff_base_ms: 25\n",
    );

    let first = Command::cargo_bin("bpos")?
        .args(["config-hash", &base])
        .output()?;
    assert!(first.status.success());

    let second = Command::cargo_bin("bpos")?
        .args(["config-hash", &base])
        .output()?;
    assert!(second.status.success());

    assert_eq!(
        String::from_utf8_lossy(&first.stdout),
        String::from_utf8_lossy(&second.stdout),
        "same input must hash identically across invocations"
    );

    Ok(())
}

#[test]
fn overlay_changes_the_hash() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = write_yaml(
        &dir,
        "base.yaml",
        "placement:\n  max_attempts: 3\n",
    );
    let overlay = write_yaml(
        &dir,
        "overlay.yaml",
        "placement:\n  max_attempts: 5\n",
    );

    let base_only = Command::cargo_bin("bpos")?
        .args(["config-hash", &base])
        .output()?;
    let layered = Command::cargo_bin("bpos")?
        .args(["config-hash", &base, &overlay])
        .output()?;

    assert!(base_only.status.success());
    assert!(layered.status.success());
    assert_ne!(
        String::from_utf8_lossy(&base_only.stdout),
        String::from_utf8_lossy(&layered.stdout),
        "an overlay that changes a value must change the hash"
    );

    Ok(())
}

#[test]
fn secret_literal_fails_the_command() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bad = write_yaml(
        &dir,
        "bad.yaml",
        "database:\n  password: \"sk-live-abc123secretvalue\"\n",
    );

    Command::cargo_bin("bpos")?
        .args(["config-hash", &bad])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"));

    Ok(())
}
