//! Integration tests for duckdex

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Isolated config and data directory per test; the shell origin is
    /// unreachable so nothing touches a real network
    fn duckdex(temp: &TempDir) -> Command {
        let config = temp.path().join("config.toml");
        if !config.exists() {
            std::fs::write(
                &config,
                r#"
[shell]
origin = "http://127.0.0.1:9"
fetch_timeout_secs = 2

[[catalog]]
id = "1"
name = "Hat Duck"
fact = "Wears a tiny hat."
image = "/images/duck_hat.png"
"#,
            )
            .unwrap();
        }

        let mut cmd = cargo_bin_cmd!("duckdex");
        cmd.env("DUCKDEX_CONFIG", &config)
            .env("DUCKDEX_DATA_DIR", temp.path().join("data"))
            .env("CI", "1");
        cmd
    }

    fn storage(temp: &TempDir) -> String {
        std::fs::read_to_string(Path::new(&temp.path().join("data/storage.json")))
            .unwrap_or_default()
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("collect ducks"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("duckdex"));
    }

    #[test]
    fn discover_new_then_repeat() {
        let temp = TempDir::new().unwrap();

        duckdex(&temp)
            .args(["discover", "--id", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("NEW DUCK"))
            .stdout(predicate::str::contains("Hat Duck"))
            .stdout(predicate::str::contains("Just now"));

        duckdex(&temp)
            .args(["discover", "--id", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("NEW DUCK").not())
            .stdout(predicate::str::contains("Times scanned: 1"));
    }

    #[test]
    fn counted_repeat_shows_count_before_the_scan() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            r#"
[ledger]
cooldown_secs = 0

[[catalog]]
id = "1"
name = "Hat Duck"
fact = "Wears a tiny hat."
"#,
        )
        .unwrap();

        for _ in 0..2 {
            duckdex(&temp).args(["discover", "--id", "1"]).assert().success();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        duckdex(&temp)
            .args(["discover", "--id", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Times scanned: 2"));

        duckdex(&temp)
            .args(["collection", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"scans\": 3"));
    }

    #[test]
    fn discover_from_scan_parameters() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["discover", "--name", "Mustache Duck", "--html"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<h3>Mustache Duck</h3>"))
            .stdout(predicate::str::contains("No fact available."));
    }

    #[test]
    fn discover_unknown_duck() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["discover", "--id", "404"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Duck not found."));
        assert!(!storage(&temp).contains("404"));
    }

    #[test]
    fn collection_json() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp).args(["discover", "--id", "1"]).assert().success();

        duckdex(&temp)
            .args(["collection", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"firstFound\""))
            .stdout(predicate::str::contains("\"scans\": 1"));
    }

    #[test]
    fn collection_empty() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["collection", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn show_missing_duck() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["show", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No duck 'nope'"));
    }

    #[test]
    fn reset_clears_collection() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp).args(["discover", "--id", "1"]).assert().success();

        duckdex(&temp)
            .args(["reset", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("starts fresh"));

        duckdex(&temp)
            .args(["collection", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn reset_without_yes_is_cancelled() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp).args(["discover", "--id", "1"]).assert().success();

        duckdex(&temp)
            .arg("reset")
            .assert()
            .success()
            .stdout(predicate::str::contains("cancelled"));
        assert!(storage(&temp).contains("Hat Duck"));
    }

    #[test]
    fn status_runs() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("uninstalled"));
    }

    #[test]
    fn install_decline_is_remembered() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["install", "--decline"])
            .assert()
            .success()
            .stdout(predicate::str::contains("declined"));

        duckdex(&temp)
            .args(["install", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("declined earlier"));
    }

    #[test]
    fn install_needs_an_answer_when_not_interactive() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--yes or --decline"));
    }

    #[test]
    fn install_offline_reports_shell_failure() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["install", "--yes", "--images", "no"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline shell not installed"));
    }

    #[test]
    fn install_retries_after_shell_failure() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["install", "--yes", "--images", "no"])
            .assert()
            .success();

        duckdex(&temp)
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("retrying the shell install"))
            .stdout(predicate::str::contains("Offline shell not installed"));
    }

    #[test]
    fn fetch_fails_offline() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["fetch", "/index.html"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("could not be served"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[shell]"))
            .stdout(predicate::str::contains("127.0.0.1:9"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        duckdex(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("duckdex"));
    }
}
