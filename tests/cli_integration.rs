//! CLI integration tests for nativepack.
//!
//! These tests run the binary against scratch projects. `HOME` is pointed at the
//! scratch directory so a user-wide `~/.nativepack/config.toml` never leaks in.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the nativepack binary command, isolated from the user's configuration.
fn nativepack(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nativepack").unwrap();
    cmd.env("HOME", home)
        .env_remove("NATIVEPACK_NO_LOCAL_PROFILING")
        .arg("--no-color");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a Nativepack.toml with the given extra sections.
fn write_manifest(dir: &Path, extra: &str) {
    fs::write(
        dir.join("Nativepack.toml"),
        format!("[project]\nname = \"demo\"\nversion = \"1.2.3\"\n{}", extra),
    )
    .unwrap();
}

fn check_json(tmp: &TempDir, extra_args: &[&str]) -> serde_json::Value {
    let output = nativepack(tmp.path())
        .args(["check", "--format", "json"])
        .args(extra_args)
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// nativepack init
// ============================================================================

#[test]
fn test_init_in_empty_directory() {
    let tmp = temp_dir();
    let project_dir = tmp.path().join("myapp");
    fs::create_dir(&project_dir).unwrap();

    nativepack(tmp.path())
        .args(["init"])
        .current_dir(&project_dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Initialized plain project `myapp`"));

    let manifest = fs::read_to_string(project_dir.join("Nativepack.toml")).unwrap();
    assert!(manifest.contains("name = \"myapp\""));
    assert!(manifest.contains("kind = \"plain\""));
}

#[test]
fn test_init_service_project() {
    let tmp = temp_dir();

    nativepack(tmp.path())
        .args(["init", "--name", "svc", "--kind", "windows_service", "svc"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("svc/Nativepack.toml")).unwrap();
    assert!(manifest.contains("kind = \"windows-service\""));
    assert!(manifest.contains("[service]"));
}

#[test]
fn test_init_rejects_unknown_kind() {
    let tmp = temp_dir();

    nativepack(tmp.path())
        .args(["init", "--kind", "applet"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("applet"));
}

#[test]
fn test_init_fails_if_manifest_exists() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "");

    nativepack(tmp.path())
        .args(["init"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// nativepack check
// ============================================================================

#[test]
fn test_check_minimal_project() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "");

    nativepack(tmp.path())
        .args(["check", "--os", "windows", "--edition", "enterprise"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Project:   demo"))
        .stdout(predicate::str::contains("Packaging: zip"))
        .stdout(predicate::str::contains("[project]"))
        .stdout(predicate::str::contains("artifact-name = \"demo\""));
}

#[test]
fn test_check_json_output() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "");

    let json = check_json(&tmp, &["--os", "linux", "--edition", "professional"]);
    assert_eq!(json["project"], "demo");
    assert_eq!(json["packaging"], "zip");
    assert_eq!(json["config"]["runtime"]["profile"], "auto");
    assert_eq!(json["config"]["version-info"]["version"], "1.2.3.0");
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[test]
fn test_check_fails_without_manifest() {
    let tmp = temp_dir();

    nativepack(tmp.path())
        .args(["check"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read manifest"))
        .stderr(predicate::str::contains("Nativepack.toml"));
}

#[test]
fn test_check_reports_fatal_error_with_key() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "[runtime]\nprofile = \"compact1\"\n");

    nativepack(tmp.path())
        .args(["check", "--os", "linux", "--edition", "standard"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("compact1"))
        .stderr(predicate::str::contains("key: CompactProfilesNotSupported"));
}

#[test]
fn test_check_soft_violation_warns_and_succeeds() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "[runtime]\ndisk-footprint-reduction = \"medium\"\n");

    nativepack(tmp.path())
        .args(["check", "--os", "windows", "--edition", "enterprise"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("only applies with the global optimizer"))
        .stdout(predicate::str::contains("Warnings:  1"));
}

#[test]
fn test_check_cross_compilation_overrides_local_profiling() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "[profiles]\nprofile-locally = true\n");

    let json = check_json(&tmp, &["--os", "linux", "--cross"]);
    assert_eq!(json["config"]["profiles"]["profile-locally"], false);
    assert_eq!(json["warnings"][0]["key"], "ProfileLocallyOverridden");
}

#[test]
fn test_check_no_local_profiling_from_env() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "");

    let output = nativepack(tmp.path())
        .args(["check", "--format", "json", "--os", "windows"])
        .env("NATIVEPACK_NO_LOCAL_PROFILING", "true")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["profiles"]["profile-locally"], false);
}

#[test]
fn test_check_uses_project_config() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "[runtime]\nprofile = \"compact2\"\n");
    fs::create_dir(tmp.path().join(".nativepack")).unwrap();
    fs::write(
        tmp.path().join(".nativepack/config.toml"),
        "[target]\nos = \"linux\"\nedition = \"standard\"\n",
    )
    .unwrap();

    nativepack(tmp.path())
        .args(["check"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("key: CompactProfilesNotSupported"));

    // Flags override the config file
    nativepack(tmp.path())
        .args(["check", "--edition", "enterprise"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

#[test]
fn test_check_missing_package_file_points_at_path() {
    let tmp = temp_dir();
    write_manifest(tmp.path(), "[[package-files]]\npath = \"docs/missing.txt\"\n");

    nativepack(tmp.path())
        .args(["check", "--os", "windows"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("key: PackageFileDoesNotExist"))
        .stderr(predicate::str::contains("missing.txt"));
}

// ============================================================================
// nativepack capabilities
// ============================================================================

#[test]
fn test_capabilities_table() {
    let tmp = temp_dir();

    nativepack(tmp.path())
        .args(["capabilities", "--os", "osx", "--edition", "professional"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Target: osx professional 15.3.0"))
        .stdout(predicate::str::contains("[OK] osx-app-bundle"))
        .stdout(predicate::str::contains("[--] excelsior-installer"));
}

#[test]
fn test_capabilities_json() {
    let tmp = temp_dir();

    let output = nativepack(tmp.path())
        .args([
            "capabilities",
            "--os",
            "windows",
            "--toolchain-version",
            "11.0",
            "--format",
            "json",
        ])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let features = json["features"].as_array().unwrap();
    let advanced = features
        .iter()
        .find(|f| f["name"] == "advanced-installer-features")
        .unwrap();
    assert_eq!(advanced["supported"], false);
}

#[test]
fn test_capabilities_rejects_unknown_os() {
    let tmp = temp_dir();

    nativepack(tmp.path())
        .args(["capabilities", "--os", "beos"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("beos"));
}
