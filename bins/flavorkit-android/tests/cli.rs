//! Integration tests for the `flavorkit-android` binary.
//!
//! Each test builds a throwaway project with an `android/` directory and
//! drives the CLI against it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("android")).unwrap();
    dir
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_flavorkit-android"));
    cmd.env_remove("RUST_LOG")
        .env_remove("FLUTTER_ROOT")
        .arg("--no-color")
        .arg("--project-dir")
        .arg(dir);
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

const KEYSTORE: &str = "keyAlias=k\nkeyPassword=p\nstoreFile=/ks.jks\nstorePassword=s\n";

#[test]
fn test_resolve_release_huawei() {
    let dir = project();
    write(dir.path(), "android/key.properties", KEYSTORE);

    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "release", "--channel", "huawei", "--json", "--no-git",
    ]));

    assert_eq!(json["applicationIdSuffix"], ".huawei");
    assert_eq!(json["versionNameSuffix"], "-hw");
    assert_eq!(json["versionCode"], 1);
    assert_eq!(json["versionName"], "1.0");
    assert_eq!(json["isDebug"], false);
    assert_eq!(json["apiBaseUrl"], "https://api.example.com");
    assert_eq!(json["channelLabel"], "Huawei");
    assert_eq!(json["applicationId"], "com.example.demo.huawei");
    assert_eq!(json["fullVersionName"], "1.0-hw");
    assert_eq!(json["gradleVariant"], "huaweiRelease");
    assert_eq!(json["signing"]["keyAlias"], "k");
    assert_eq!(json["signing"]["storeFile"], "/ks.jks");
    assert_eq!(json["signing"]["keyPassword"], "********");
    assert!(json.get("traceability").is_none());
}

#[test]
fn test_resolve_show_secrets() {
    let dir = project();
    write(dir.path(), "android/key.properties", KEYSTORE);

    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "release", "--channel", "huawei", "--json", "--no-git",
        "--show-secrets",
    ]));
    assert_eq!(json["signing"]["keyPassword"], "p");
    assert_eq!(json["signing"]["storePassword"], "s");
}

#[test]
fn test_resolve_reads_local_properties() {
    let dir = project();
    write(
        dir.path(),
        "android/local.properties",
        "# generated\nflutter.versionCode=42\nflutter.versionName=2.1.0\n",
    );

    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "debug", "--channel", "xiaomi", "--json",
    ]));
    assert_eq!(json["versionCode"], 42);
    assert_eq!(json["fullVersionName"], "2.1.0-debug-mi");
    assert_eq!(json["applicationId"], "com.example.demo.debug.xiaomi");
    assert_eq!(json["isDebug"], true);
    assert!(json["traceability"]["gitCommit"].is_string());
    assert!(json.get("signing").is_none());
}

#[test]
fn test_malformed_version_code_falls_back() {
    let dir = project();
    write(dir.path(), "android/local.properties", "flutter.versionCode=abc\n");

    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "profile", "--channel", "direct", "--json", "--no-git",
    ]));
    assert_eq!(json["versionCode"], 1);
    assert_eq!(json["apiBaseUrl"], "https://api-staging.example.com");
}

#[test]
fn test_resolve_profile_reports_fallbacks() {
    let dir = project();
    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "profile", "--channel", "xiaomi", "--json", "--no-git",
    ]));
    assert_eq!(json["flavorDimension"], "channel");
    assert_eq!(json["matchingFallbacks"], serde_json::json!(["debug", "release"]));

    cli(dir.path())
        .args(["resolve", "--variant", "profile", "--channel", "xiaomi", "--no-git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debug, release"));
}

#[test]
fn test_resolve_human_output() {
    let dir = project();
    cli(dir.path())
        .args(["resolve", "--variant", "release", "--channel", "googleplay", "--no-git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("googleplayRelease"))
        .stdout(predicate::str::contains("com.example.demo.googleplay"))
        .stdout(predicate::str::contains("unsigned"));
}

#[test]
fn test_unknown_variant_is_validation_error() {
    let dir = project();
    cli(dir.path())
        .args(["resolve", "--variant", "staging", "--channel", "huawei"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown build variant"));
}

#[test]
fn test_unknown_channel_is_validation_error() {
    let dir = project();
    cli(dir.path())
        .args(["resolve", "--variant", "debug", "--channel", "appstore"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("googleplay, huawei, xiaomi, direct"));
}

#[test]
fn test_matrix_json() {
    let dir = project();
    let json = json_output(cli(dir.path()).args(["matrix", "--json"]));
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 12);

    let ids: std::collections::HashSet<_> = entries
        .iter()
        .map(|e| e["applicationId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 8, "debug ids differ, release and profile share ids");
}

#[test]
fn test_matrix_variant_filter() {
    let dir = project();
    let json = json_output(cli(dir.path()).args(["matrix", "--variant", "debug", "--json"]));
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e["variant"] == "debug"));
}

#[test]
fn test_fields_gradle() {
    let dir = project();
    cli(dir.path())
        .args(["fields", "--variant", "release", "--channel", "huawei"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"buildConfigField("String", "CHANNEL", "\"Huawei\"")"#,
        ))
        .stdout(predicate::str::contains(
            r#"buildConfigField("Boolean", "IS_DEBUG", "false")"#,
        ))
        .stdout(predicate::str::contains(
            r#"buildConfigField("String", "BUILD_TYPE_NAME", "\"android\"")"#,
        ));
}

#[test]
fn test_fields_json() {
    let dir = project();
    let json = json_output(cli(dir.path()).args([
        "fields", "--variant", "debug", "--channel", "direct", "--format", "json",
    ]));
    assert_eq!(json["variant"], "directDebug");
    assert_eq!(json["manifestPlaceholders"]["app_name"], "Demo Debug");
}

#[test]
fn test_fields_unknown_format() {
    let dir = project();
    cli(dir.path())
        .args(["fields", "--variant", "debug", "--channel", "direct", "--format", "xml"])
        .assert()
        .code(2);
}

#[test]
fn test_set_version_then_version_info() {
    let dir = project();
    write(
        dir.path(),
        "android/local.properties",
        "sdk.dir=/opt/android\nflutter.versionCode=3\n",
    );

    cli(dir.path())
        .args(["set-version", "--name", "2.0.0", "--code", "7"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("android/local.properties")).unwrap();
    assert!(content.starts_with("sdk.dir=/opt/android\n"));
    assert!(content.contains("flutter.versionCode=7"));
    assert!(content.contains("flutter.versionName=2.0.0"));
    assert!(!content.contains("flutter.versionCode=3"));

    let json = json_output(cli(dir.path()).args(["version-info", "--json"]));
    assert_eq!(json["versionCode"], 7);
    assert_eq!(json["versionName"], "2.0.0");
    assert!(json["gitCommit"].is_string());
    assert!(json["buildTime"].is_string());
}

#[test]
fn test_set_version_rejects_invalid_code() {
    let dir = project();
    for code in ["0", "-1", "abc"] {
        cli(dir.path())
            .args(["set-version", "--code", code])
            .assert()
            .code(2);
    }
    assert!(!dir.path().join("android/local.properties").exists());
}

#[test]
fn test_set_version_requires_a_value() {
    let dir = project();
    cli(dir.path())
        .arg("set-version")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_version_info_defaults() {
    let dir = project();
    cli(dir.path())
        .arg("version-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0"));
}

#[test]
fn test_config_file_overrides_locations() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        ".flavorkit.toml",
        "[project]\nbase_application_id = \"org.sample.app\"\nandroid_dir = \"mobile\"\n",
    );
    write(dir.path(), "mobile/local.properties", "flutter.versionCode=9\n");

    let json = json_output(cli(dir.path()).args([
        "resolve", "--variant", "release", "--channel", "direct", "--json", "--no-git",
    ]));
    assert_eq!(json["applicationId"], "org.sample.app.direct");
    assert_eq!(json["versionCode"], 9);
}

#[test]
fn test_defaults_source_is_lowest_layer() {
    let dir = project();
    write(
        dir.path(),
        ".flavorkit.toml",
        "[sources]\ndefaults = \"defaults.properties\"\n",
    );
    write(
        dir.path(),
        "android/defaults.properties",
        "flutter.versionCode=5\nflutter.versionName=0.5\n",
    );
    write(dir.path(), "android/local.properties", "flutter.versionName=0.6\n");

    let json = json_output(cli(dir.path()).args(["version-info", "--json"]));
    assert_eq!(json["versionCode"], 5);
    assert_eq!(json["versionName"], "0.6");
}

#[test]
fn test_missing_explicit_config_is_config_error() {
    let dir = project();
    cli(dir.path())
        .args(["--config", "nope.toml", "matrix"])
        .assert()
        .code(3);
}

#[test]
fn test_malformed_config_is_config_error() {
    let dir = project();
    write(dir.path(), ".flavorkit.toml", "[project\nbroken");
    cli(dir.path()).arg("matrix").assert().code(3);
}

#[test]
fn test_build_without_wrapper_fails() {
    let dir = project();
    cli(dir.path())
        .args(["build", "--variant", "debug", "--channel", "direct"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Gradle wrapper not found"));
}

#[cfg(unix)]
fn write_stub_wrapper(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("android/gradlew");
    write(dir, "android/gradlew", "#!/bin/sh\nexit 0\n");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_build_from_project_root_without_project_dir() {
    let dir = project();
    write(dir.path(), "android/key.properties", KEYSTORE);
    write_stub_wrapper(dir.path());

    Command::new(env!("CARGO_BIN_EXE_flavorkit-android"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("FLUTTER_ROOT")
        .args(["--no-color", "build", "--variant", "release", "--channel", "huawei"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assembleHuaweiRelease succeeded"))
        .stdout(predicate::str::contains(
            "Release build completed for assembleHuaweiRelease",
        ));
}

#[cfg(unix)]
#[test]
fn test_bundle_build_is_not_reported_as_release_apk() {
    let dir = project();
    write_stub_wrapper(dir.path());

    cli(dir.path())
        .args(["build", "--variant", "release", "--channel", "xiaomi", "--bundle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bundleXiaomiRelease succeeded"))
        .stdout(predicate::str::contains("Release build completed").not());
}

#[test]
fn test_doctor_json_reports_missing_wrapper() {
    let dir = project();
    let output = cli(dir.path()).args(["doctor", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "unhealthy");
    let wrapper = report["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "gradle-wrapper")
        .unwrap();
    assert_eq!(wrapper["status"], "unhealthy");
}

#[test]
fn test_doctor_degraded_with_wrapper() {
    let dir = project();
    write(dir.path(), "android/gradlew", "#!/bin/sh\n");
    write(dir.path(), "android/gradlew.bat", "@echo off\n");

    let output = cli(dir.path()).args(["doctor", "--json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_ne!(report["status"], "unhealthy");
}
