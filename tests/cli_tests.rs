#![cfg(feature = "cli")]

use std::process::Command;
use tempfile::TempDir;

fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "pom.xml",
        r#"<project>
  <groupId>com.x</groupId>
  <artifactId>parent</artifactId>
  <version>1.0</version>
  <modules><module>a</module><module>b</module></modules>
</project>"#,
    );
    write(
        &dir,
        "a/pom.xml",
        "<project><groupId>com.x</groupId><artifactId>a</artifactId><version>1.0</version></project>",
    );
    write(
        &dir,
        "b/pom.xml",
        "<project><groupId>com.x</groupId><artifactId>b</artifactId><version>1.0</version></project>",
    );
    dir
}

fn assert_report(stdout: &[u8], dir: &TempDir) {
    let report: serde_json::Value = serde_json::from_slice(stdout).unwrap();
    let modules = report["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["artifact_id"], "a");
    assert_eq!(modules[1]["artifact_id"], "b");
    assert!(!dir.path().join("pom_new.xml").exists());
}

#[test]
fn test_dry_run_prints_only_the_report() {
    let dir = project();

    let output = Command::new(env!("CARGO_BIN_EXE_pom2bom"))
        .arg("--base-dir")
        .arg(dir.path())
        .arg("--dry-run")
        .arg("--verbose")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_report(&output.stdout, &dir);
}

#[test]
fn test_toml_dry_run_prints_only_the_report() {
    let dir = project();
    let config_path = dir.path().join("pom2bom.toml");
    std::fs::write(
        &config_path,
        format!("[project]\nbase_dir = '{}'\n", dir.path().display()),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_toml_pom2bom"))
        .arg("--config")
        .arg(&config_path)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_report(&output.stdout, &dir);
}
