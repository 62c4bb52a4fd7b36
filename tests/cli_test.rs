use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_extract(file: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_licence-capture"))
        .arg("extract")
        .arg(file)
        .args(extra)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run licence-capture")
}

fn write_fixture(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

#[test]
fn test_pdf_rejected_with_specific_message() {
    let dir = TempDir::new().unwrap();
    let pdf = write_fixture(&dir, "licence.pdf", b"%PDF-1.4\n%%EOF\n");

    let output = run_extract(&pdf, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("PDF files are not supported. Please upload an image file."),
        "unexpected stderr: {}",
        stderr
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_text_file_rejected_with_generic_message() {
    let dir = TempDir::new().unwrap();
    let txt = write_fixture(&dir, "licence.txt", b"DRIVING LICENCE");

    let output = run_extract(&txt, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid file type. Please upload an image (e.g., .jpg, .jpeg, .png)."),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let output = run_extract(&dir.path().join("absent.png"), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading the file"));
}

#[test]
fn test_empty_image_file_is_no_file() {
    let dir = TempDir::new().unwrap();
    let empty = write_fixture(&dir, "licence.png", b"");

    let output = run_extract(&empty, &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Please upload a valid document."));
}

#[test]
fn test_json_output_reports_failed_state() {
    let dir = TempDir::new().unwrap();
    let pdf = write_fixture(&dir, "licence.pdf", b"%PDF-1.4");

    let output = run_extract(&pdf, &["--json"]);

    assert!(!output.status.success());
    let state: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(state["state"], "failed");
    assert_eq!(
        state["message"],
        "PDF files are not supported. Please upload an image file."
    );
}

#[test]
fn test_oversized_file_rejected() {
    let dir = TempDir::new().unwrap();
    let png = write_fixture(&dir, "licence.png", &[0u8; 64]);

    let output = run_extract(&png, &["--max-file-size", "16"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File too large: 64 bytes (max: 16 bytes)"));
}
