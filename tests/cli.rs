//! CLI integration tests.
//!
//! Tests the command-line interface by running the binary as a subprocess.

mod common;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use common::{docx_with_paragraphs, BRIEF, BRIEF_TABLE};
use tempfile::TempDir;

/// Path to the compiled binary
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_toa-extract"))
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ============================================
// Tests for CLI argument parsing
// ============================================

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("toa-extract") || stdout.contains("Table of Authorities"),
        "Help should mention the tool name or purpose: {}",
        stdout
    );
    assert!(output.status.success(), "Help should exit with success");
}

#[test]
fn test_cli_missing_input() {
    let output = run(&["extract"]);
    assert!(!output.status.success(), "extract without input should fail");
    assert!(
        stderr(&output).contains("required") || stderr(&output).contains("Usage"),
        "Should report the missing argument: {}",
        stderr(&output)
    );
}

#[test]
fn test_cli_rejects_invalid_font_size() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);
    let output = run(&["extract", doc.to_str().unwrap(), "--font-size", "0"]);
    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}

// ============================================
// Tests for the one-shot commands
// ============================================

#[test]
fn test_extract_prints_table() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);

    let output = run(&["extract", doc.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, BRIEF_TABLE);
    assert!(
        stderr(&output).contains("skipped 2 non-case citation(s)"),
        "Load summary should mention filtered citations: {}",
        stderr(&output)
    );
}

#[test]
fn test_extract_json() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);

    let output = run(&["extract", doc.to_str().unwrap(), "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["citations"].as_array().unwrap().len(), BRIEF_TABLE.len());
    assert_eq!(value["report"]["recognized"], 6);
    assert_eq!(value["report"]["filtered"], 2);
    assert_eq!(value["source"], doc.to_str().unwrap());
}

#[test]
fn test_export_txt_is_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);
    let out = dir.path().join("toa.txt");

    let first = run(&["export-txt", doc.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let first_bytes = fs::read(&out).unwrap();

    let second = run(&["export-txt", doc.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(second.status.success(), "stderr: {}", stderr(&second));

    assert_eq!(fs::read(&out).unwrap(), first_bytes);
    assert_eq!(String::from_utf8(first_bytes).unwrap(), BRIEF_TABLE.join("\n"));
    assert!(stderr(&second).contains("wrote"));
}

#[test]
fn test_export_docx_with_custom_heading() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);
    let out = dir.path().join("toa.docx");

    let output = run(&[
        "export-docx",
        doc.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--heading",
        "Authorities Cited",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = toa_extract::extract_text(&out).unwrap();
    assert_eq!(text, format!("Authorities Cited {}", BRIEF_TABLE.join(" ")));
}

#[test]
fn test_insert_writes_copy_next_to_original() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);
    let original = fs::read(&doc).unwrap();

    let output = run(&["insert", doc.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read(&doc).unwrap(), original, "original must not change");
    let copy = dir.path().join("brief_with_TOA.docx");
    let text = toa_extract::extract_text(&copy).unwrap();
    assert!(text.starts_with(BRIEF[0]));
    assert!(text.ends_with(&format!("Table of Authorities {}", BRIEF_TABLE.join(" "))));
}

#[test]
fn test_nothing_to_do_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "plain.docx", &["No authorities are cited here."]);
    let out = dir.path().join("toa.txt");

    let output = run(&["export-txt", doc.to_str().unwrap(), "-o", out.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("No citations to export."));
    assert!(!out.exists(), "No file should be written for an empty table");
}

#[test]
fn test_copy_with_nothing_to_do_skips_clipboard() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "plain.docx", &["Nothing to see."]);

    let output = run(&["copy", doc.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("No citations to copy."));
}

// ============================================
// Tests for exit codes (semantic: 10-15)
// ============================================

#[test]
fn test_exit_code_10_input_file_not_found() {
    let output = run(&["extract", "/nonexistent/brief.docx"]);
    assert_eq!(
        output.status.code(),
        Some(10),
        "Missing input file should exit with code 10, got {:?}. stderr: {}",
        output.status.code(),
        stderr(&output)
    );
}

#[test]
fn test_exit_code_11_not_a_docx() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.docx");
    fs::write(&path, "plain text, not a zip").unwrap();

    let output = run(&["extract", path.to_str().unwrap()]);

    assert_eq!(
        output.status.code(),
        Some(11),
        "Invalid document should exit with code 11, got {:?}. stderr: {}",
        output.status.code(),
        stderr(&output)
    );
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn test_exit_code_15_output_dir_not_writable() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);

    let output = run(&["export-txt", doc.to_str().unwrap(), "-o", "/nonexistent/dir/toa.txt"]);

    assert_eq!(
        output.status.code(),
        Some(15),
        "Unwritable output path should exit with code 15, got {:?}. stderr: {}",
        output.status.code(),
        stderr(&output)
    );
}

// ============================================
// Tests for session mode
// ============================================

#[test]
fn test_session_keeps_state_across_commands() {
    let dir = TempDir::new().unwrap();
    let doc = docx_with_paragraphs(dir.path(), "brief.docx", BRIEF);
    let out = dir.path().join("toa.txt");

    let script = format!(
        "show\nexport-txt {out}\nload /nonexistent/brief.docx\nload {doc}\nload /nonexistent/other.docx\nshow\nexport-txt {out}\nbogus\nquit\nshow\n",
        out = out.display(),
        doc = doc.display()
    );

    let mut child = Command::new(binary_path())
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin.write_all(script.as_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Only the one `show` after a successful load prints citations.
    assert_eq!(stdout.lines().collect::<Vec<_>>(), BRIEF_TABLE);

    let err = stderr(&output);
    assert!(err.contains("No citations loaded."));
    assert!(err.contains("No citations to export."));
    assert_eq!(err.matches("Error:").count(), 2, "stderr: {}", err);
    assert!(err.contains("unknown command 'bogus'"));
    assert_eq!(fs::read_to_string(&out).unwrap(), BRIEF_TABLE.join("\n"));
}

#[test]
fn test_session_help_columns_line_up() {
    let mut child = Command::new(binary_path())
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin.write_all(b"help\nquit\n").unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 8, "stdout: {}", stdout);
    assert!(lines.iter().any(|line| line.starts_with("quit")));
    for line in lines {
        let (command, description) = line.split_at(21);
        assert!(command.ends_with(' '), "misaligned: {:?}", line);
        assert!(!description.starts_with(' '), "misaligned: {:?}", line);
    }
}
