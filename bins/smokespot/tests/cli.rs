use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SUPABASE_VARS: [&str; 7] = [
    "SMOKESPOT_SUPABASE_URL",
    "SUPABASE_URL",
    "EXPO_PUBLIC_SUPABASE_URL",
    "SMOKESPOT_SUPABASE_ANON_KEY",
    "SUPABASE_ANON_KEY",
    "EXPO_PUBLIC_SUPABASE_ANON_KEY",
    "SMOKESPOT_ENV",
];

/// The binary, isolated from the user's config and Supabase environment
fn smokespot(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("smokespot").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("SMOKESPOT_CONFIG")
        .env_remove("SMOKESPOT_AT")
        .env_remove("SMOKESPOT_LOG");
    for var in SUPABASE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("map"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn missing_explicit_config_is_a_config_error() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .args(["--config", "does-not-exist.toml", "map"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn invalid_config_value_is_a_config_error() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("smokespot.toml"),
        "[location]\nfallback_latitude = 120.0\n",
    )
    .unwrap();

    smokespot(&home).arg("whoami").assert().code(3);
}

#[test]
fn add_without_supabase_settings_fails_cleanly() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .args(["add", "--name", "Riverside bench", "--default-location"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SUPABASE"));
}

#[test]
fn add_needs_a_location_source() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .args(["add", "--name", "Riverside bench"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--here"));
}

#[test]
fn reverse_rejects_out_of_range_coordinate() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .args(["reverse", "95,121.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid coordinate"));
}

#[test]
fn json_format_reports_errors_on_stdout() {
    let home = TempDir::new().unwrap();
    smokespot(&home)
        .args(["--format", "json", "add", "--name", "Riverside bench", "--default-location"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"code_str\": \"E3000\""))
        .stdout(predicate::str::contains("\"category\": \"Configuration\""));
}
