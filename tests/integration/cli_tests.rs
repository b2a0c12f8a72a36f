//! Command-line contract of the `muni-catalog` binary

use std::process::Command;
use tempfile::TempDir;

fn muni_catalog() -> Command {
    Command::new(env!("CARGO_BIN_EXE_muni-catalog"))
}

#[test]
fn test_non_http_base_url_exits_with_one() {
    let dir = TempDir::new().unwrap();

    for bad in ["ftp://example.gov/", "example.gov", "file:///etc/passwd"] {
        let output = muni_catalog()
            .arg(bad)
            .arg("--output")
            .arg(dir.path())
            .arg("--quiet")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1), "{} was accepted", bad);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Error"), "no error printed for {}", bad);
    }

    // Rejected before the output directory is touched
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_base_url_is_usage_error() {
    let output = muni_catalog().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
