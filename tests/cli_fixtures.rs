use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stutter_cli"))
}

fn fixture_file(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("JSON payload on stdout")
}

#[test]
fn fixture_matches_expectations() {
    let output = cli()
        .args(["fixture", "--name", "silence"])
        .output()
        .expect("failed to run stutter_cli fixture");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let json = stdout_json(&output);
    assert_eq!(json["filename"], "silence");
    assert_eq!(json["category"], "none");
    assert_eq!(json["confidence"], 80);
    assert_eq!(json["features"].as_array().map(Vec::len), Some(27));
}

#[test]
fn fixture_detects_mismatch() {
    let output = cli()
        .args([
            "fixture",
            "--name",
            "silence",
            "--expect",
            &fixture_file("silence_incorrect.expect.json"),
        ])
        .output()
        .expect("failed to run mismatch fixture");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("\"failures\""),
        "expected diff JSON in stderr, got {stderr}"
    );
}

#[test]
fn dump_fixtures_lists_assets() {
    let output = cli()
        .arg("dump-fixtures")
        .output()
        .expect("failed to run dump-fixtures");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(
        stdout.contains("silence") && stdout.contains("sustained_tone"),
        "expected fixture listing, got {stdout}"
    );
}

#[test]
fn dump_fixtures_respects_override_dir() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli()
        .args(["dump-fixtures", "--fixtures-dir"])
        .arg(dir.path())
        .output()
        .expect("failed to run dump-fixtures");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("No fixtures found"), "got {stdout}");
}

#[test]
fn analyze_prints_report() {
    let output = cli()
        .args(["analyze", "--input", &fixture_file("sustained_tone.wav")])
        .output()
        .expect("failed to run analyze");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["filename"], "sustained_tone.wav");
    assert_eq!(json["sample_rate"], 16_000);
    assert!((json["duration_secs"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    let confidence = json["confidence"].as_u64().unwrap();
    assert!(confidence <= 100);
    assert!(json["remedies"].as_array().is_some_and(|r| !r.is_empty()));
}

#[test]
fn analyze_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let output = cli()
        .args(["analyze", "--input", &fixture_file("silence.wav"), "--output"])
        .arg(&report_path)
        .output()
        .expect("failed to run analyze");
    assert!(output.status.success());

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["category"], "none");
    assert_eq!(json["has_disfluency"], false);
}

#[test]
fn analyze_rejects_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let output = cli()
        .args(["analyze", "--input"])
        .arg(&path)
        .output()
        .expect("failed to run analyze");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("Unsupported audio format"), "got {stderr}");
}

#[test]
fn classify_feature_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("features.json");
    let mut features = vec![0.0f64; 27];
    features[14] = 0.15;
    features[17] = 0.25;
    std::fs::write(&path, serde_json::to_string(&features).unwrap()).unwrap();

    let output = cli()
        .args(["classify", "--features"])
        .arg(&path)
        .output()
        .expect("failed to run classify");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["category"], "blocks");
    assert_eq!(json["confidence"], 60);
    assert_eq!(json["has_disfluency"], true);
}

#[test]
fn classify_from_stdin() {
    let mut child = cli()
        .args(["classify", "--features", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn classify");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(serde_json::to_string(&vec![0.0f64; 27]).unwrap().as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["category"], "none");
    assert_eq!(json["confidence"], 80);
}

#[test]
fn classify_rejects_wrong_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.json");
    std::fs::write(&path, serde_json::to_string(&vec![0.0f64; 26]).unwrap()).unwrap();

    let output = cli()
        .args(["classify", "--features"])
        .arg(&path)
        .output()
        .expect("failed to run classify");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn remedies_for_known_and_unknown_labels() {
    let output = cli()
        .args(["remedies", "--category", "blocks"])
        .output()
        .expect("failed to run remedies");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["category"], "blocks");
    assert_eq!(json["remedies"][0], "Practice easy onset of speech");

    let output = cli()
        .args(["remedies", "--category", "mumbling"])
        .output()
        .expect("failed to run remedies");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["category"], "none");
    assert_eq!(json["remedies"][0], "Continue practicing good speech habits");
}
