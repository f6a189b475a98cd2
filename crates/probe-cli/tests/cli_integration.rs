use assert_cmd::Command;
use predicates::prelude::*;
use probe_client::mock::{BackgroundMockServer, Fault};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn probe() -> Command {
    let mut cmd = Command::cargo_bin("kanban-probe").unwrap();
    cmd.env_remove("KANBAN_PROBE_TOKEN")
        .env_remove("KANBAN_PROBE_CONFIG")
        .env_remove("KANBAN_PROBE_BASE_URL")
        .env_remove("KANBAN_PROBE_DEBUG_LOG");
    cmd
}

/// A command pointed at `server` with the startup delay disabled.
fn probe_against(server: &BackgroundMockServer) -> Command {
    let mut cmd = probe();
    cmd.args(["--base-url", &server.base_url(), "--startup-delay-ms", "0"]);
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_str(&String::from_utf8_lossy(output)).expect("Failed to parse JSON output")
}

fn token_for(server: &BackgroundMockServer) -> String {
    let output = probe_against(server)
        .args(["--format", "json", "auth", "register"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_json_output(&output);
    json["data"]["response"]["body"]["token"]
        .as_str()
        .unwrap()
        .to_string()
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_run_auth() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["run", "auth"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Testing User Registration"))
            .stdout(predicate::str::contains("Response Status: 201"))
            .stdout(predicate::str::contains("Login successful. Token: "))
            .stdout(predicate::str::contains("auth: 2 passed, 0 failed, 0 skipped"));
    }

    #[test]
    fn test_run_boards() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["run", "boards", "--strict"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Testing Board Operations"))
            .stdout(predicate::str::contains("Registered new user: boardtest"))
            .stdout(predicate::str::contains("Authorization: Bearer ***"))
            .stdout(predicate::str::contains("Response Status: 204"))
            .stdout(predicate::str::contains("Response Status: 404"))
            .stdout(predicate::str::contains("Board testing complete."))
            .stdout(predicate::str::contains("0 failed"));
    }

    #[test]
    fn test_run_lists() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["run", "lists", "--strict"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created board with ID: "))
            .stdout(predicate::str::contains("Updated Test List"))
            .stdout(predicate::str::contains("List testing complete."));
    }

    #[test]
    fn test_run_comments() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["run", "comments", "--strict"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created card with ID: "))
            .stdout(predicate::str::contains("\"text\": \"Second test comment\""))
            .stdout(predicate::str::contains("Updated test comment"))
            .stdout(predicate::str::contains("Comment testing complete."));
    }

    #[test]
    fn test_run_list_validation_prints_compact_statuses() {
        let server = BackgroundMockServer::start().unwrap();
        let output = probe_against(&server)
            .args(["run", "list-validation", "--strict"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let stdout = String::from_utf8_lossy(&output);

        let statuses: Vec<&str> = stdout
            .lines()
            .filter(|line| line.starts_with("Status: "))
            .collect();
        assert_eq!(
            statuses,
            vec!["Status: 400", "Status: 404", "Status: 400", "Status: 201"]
        );
        assert!(stdout.contains("Created list: "));
        assert!(!stdout.contains("Response Headers:"));
    }

    #[test]
    fn test_run_all_json_report() {
        let server = BackgroundMockServer::start().unwrap();
        let output = probe_against(&server)
            .args(["--format", "json", "run", "all"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(json["success"].as_bool().unwrap());
        let reports = json["data"].as_array().unwrap();
        let names: Vec<&str> = reports
            .iter()
            .map(|r| r["scenario"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["auth", "boards", "lists", "comments", "list-validation"]
        );
        for report in reports {
            assert!(report.get("aborted").is_none());
            for step in report["steps"].as_array().unwrap() {
                assert_eq!(step["outcome"], "passed", "step {}", step["label"]);
            }
        }
    }

    #[test]
    fn test_unreachable_server_aborts_with_exit_code_1() {
        probe()
            .args([
                "--base-url",
                "http://127.0.0.1:9/api",
                "--startup-delay-ms",
                "0",
                "--timeout-secs",
                "2",
                "run",
                "boards",
            ])
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("Aborted: Connection error"));
    }

    #[test]
    fn test_failed_step_exits_0_without_strict() {
        let server =
            BackgroundMockServer::start_with_faults(vec![Fault::new("GET", "/members", 500)])
                .unwrap();
        probe_against(&server)
            .args(["run", "boards"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Response Status: 500"))
            .stdout(predicate::str::contains("boards: 9 passed, 1 failed, 0 skipped"));
    }

    #[test]
    fn test_failed_step_exits_1_with_strict() {
        let server =
            BackgroundMockServer::start_with_faults(vec![Fault::new("GET", "/members", 500)])
                .unwrap();
        probe_against(&server)
            .args(["run", "boards", "--strict"])
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("1 failed"));
    }

    #[test]
    fn test_strict_json_report_marks_failure() {
        let server =
            BackgroundMockServer::start_with_faults(vec![Fault::new("GET", "/members", 500)])
                .unwrap();
        let output = probe_against(&server)
            .args(["--format", "json", "run", "boards", "--strict"])
            .assert()
            .failure()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert!(!json["success"].as_bool().unwrap());
        assert_eq!(json["error"], "scenario steps failed");
        let failed: Vec<&Value> = json["data"][0]["steps"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|step| step["outcome"] == "failed")
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["label"], "GET /boards/:id/members");
        assert_eq!(failed[0]["status"], 500);
    }

    #[test]
    fn test_failed_create_skips_every_remaining_step() {
        let server =
            BackgroundMockServer::start_with_faults(vec![Fault::new("POST", "/boards", 500)])
                .unwrap();
        probe_against(&server)
            .args(["run", "boards"])
            .assert()
            .success()
            .stdout(predicate::str::contains("boards: 3 passed, 1 failed, 6 skipped"));
    }

    #[test]
    fn test_fixture_failure_aborts_with_exit_code_1() {
        let server =
            BackgroundMockServer::start_with_faults(vec![Fault::new("POST", "/boards", 500)])
                .unwrap();
        probe_against(&server)
            .args(["run", "lists"])
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::contains("Failed to create board. Exiting."))
            .stdout(predicate::str::contains(
                "lists: 2 passed, 1 failed, 0 skipped (aborted: Failed to create board. Exiting.)",
            ));
    }

    #[test]
    fn test_comments_send_server_payload_keys() {
        let server = BackgroundMockServer::start().unwrap();
        let output = probe_against(&server)
            .args(["--format", "json", "run", "comments", "--strict"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&output);
        assert!(json["data"][0].get("aborted").is_none());
        assert!(json["data"][0]["steps"]
            .as_array()
            .unwrap()
            .iter()
            .any(|step| step["label"] == "POST /cards (fixture)" && step["outcome"] == "passed"));
    }

    #[test]
    fn test_config_file_supplies_base_url() {
        let server = BackgroundMockServer::start().unwrap();
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "base_url = \"{}\"\nstartup_delay_ms = 0\nemail_domain = \"probe.test\"\n",
                server.base_url()
            ),
        )
        .unwrap();

        probe()
            .args(["--config", config.to_str().unwrap(), "run", "auth"])
            .assert()
            .success()
            .stdout(predicate::str::contains("@probe.test"));
    }
}

mod endpoint_tests {
    use super::*;

    #[test]
    fn test_board_commands_require_token() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["board", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not authenticated"));
    }

    #[test]
    fn test_board_create_get_delete() {
        let server = BackgroundMockServer::start().unwrap();
        let token = token_for(&server);

        let output = probe_against(&server)
            .args([
                "--format",
                "json",
                "--token",
                &token,
                "board",
                "create",
                "--title",
                "CLI Board",
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&output);
        assert_eq!(json["data"]["response"]["status"], 201);
        assert_eq!(json["data"]["request"]["method"], "POST");
        let id = json["data"]["response"]["body"]["id"].to_string();

        let auth_header = json["data"]["request"]["headers"]["Authorization"]
            .as_str()
            .unwrap();
        assert!(auth_header.starts_with("Bearer ***"));
        assert!(!auth_header.contains(&token));

        probe_against(&server)
            .args(["--token", &token, "board", "get", "--id", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"title\": \"CLI Board\""));

        probe_against(&server)
            .args(["--token", &token, "board", "delete", "--id", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("Response Status: 204"));

        probe_against(&server)
            .args(["--token", &token, "board", "get", "--id", &id])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Response Status: 404"));
    }

    #[test]
    fn test_json_failure_envelope_keeps_exchange() {
        let server = BackgroundMockServer::start().unwrap();
        let token = token_for(&server);

        let output = probe_against(&server)
            .args([
                "--format", "json", "--token", &token, "list", "get", "--id", "424242",
            ])
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&output);
        assert!(!json["success"].as_bool().unwrap());
        assert_eq!(json["data"]["response"]["status"], 404);
        assert!(json["error"].as_str().unwrap().contains("Unexpected status 404"));
    }

    #[test]
    fn test_login_with_unknown_user_fails() {
        let server = BackgroundMockServer::start().unwrap();
        probe_against(&server)
            .args(["auth", "login", "--email", "nobody@example.com"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Response Status: 401"));
    }
}

mod misc_tests {
    use super::*;

    #[test]
    fn test_completions() {
        probe()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("kanban-probe"));
    }

    #[test]
    fn test_version_includes_package_version() {
        probe()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
