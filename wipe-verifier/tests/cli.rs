//! Integration tests for the `wipe-verifier` binary.

#![allow(deprecated)] // cargo_bin deprecation

mod common;

use assert_cmd::Command;
use common::fixture;
use predicates::prelude::*;
use std::io::Write;

fn wipe_verifier() -> Command {
    let mut cmd = Command::cargo_bin("wipe-verifier").expect("wipe-verifier binary not found");
    cmd.env_remove("WIPE_VERIFIER_PUBLIC_KEY")
        .env_remove("WIPE_VERIFIER_PUBLIC_KEY_URL")
        .env_remove("WIPE_VERIFIER_STRICT");
    cmd
}

#[test]
fn signed_certificate_with_report_passes() {
    wipe_verifier()
        .arg(fixture("certificate_signed.json"))
        .arg("--key")
        .arg(fixture("signer_pub.pem"))
        .arg("--artifact")
        .arg(fixture("report.pdf"))
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("sha256Pdf: match"))
        .stdout(predicate::str::contains("canonical+pss(salt=32)"));
}

#[test]
fn tampered_certificate_fails_in_strict_mode() {
    wipe_verifier()
        .arg(fixture("certificate_tampered.json"))
        .arg("--key")
        .arg(fixture("signer_pub.pem"))
        .arg("--strict")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Certificate invalid"));
}

#[test]
fn strict_mode_from_environment() {
    wipe_verifier()
        .arg(fixture("certificate_tampered.json"))
        .env("WIPE_VERIFIER_PUBLIC_KEY", fixture("signer_pub.pem"))
        .env("WIPE_VERIFIER_STRICT", "true")
        .assert()
        .code(1);
}

#[test]
fn tampered_certificate_is_annotated_in_lenient_mode() {
    wipe_verifier()
        .arg(fixture("certificate_tampered.json"))
        .arg("--key")
        .arg(fixture("signer_pub.pem"))
        .assert()
        .success()
        .stdout(predicate::str::contains("signature: not verified"));
}

#[test]
fn json_output_from_stdin() {
    let text = r#"{"certificate_id":"c1","device_id":"d1","wiped_at":"2024-01-01"}"#;
    let output = wipe_verifier()
        .arg("-")
        .arg("--json")
        .write_stdin(text)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let verdict: serde_json::Value = serde_json::from_slice(&output).expect("JSON verdict");
    assert_eq!(verdict["status"], "ok");
    assert_eq!(verdict["message"], "Certificate valid");
    assert_eq!(verdict["checks"]["signature"]["attempted"], false);
}

#[test]
fn missing_field_exits_with_one() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"certificateId":"c1","wipedAt":"x"}}"#).unwrap();
    wipe_verifier()
        .arg(file.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing required field: deviceId"));
}

#[test]
fn invalid_json_exits_with_two() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    wipe_verifier()
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("invalid JSON"));
}

#[test]
fn missing_certificate_file_is_an_error() {
    wipe_verifier()
        .arg("/nonexistent/certificate.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}
