//! End-to-end tests driving the compiled `grafanactl` binary as a
//! subprocess, against an isolated config directory and (where a server is
//! needed) a `wiremock` stand-in for the Grafana resource API.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run `grafanactl` with `args`, pointing its config directory at `config_dir`
/// so tests never touch the real user config file.
fn grafanactl(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grafanactl"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_dir)
        .output()
        .expect("failed to execute grafanactl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

mod config_command {
    use super::*;

    #[test]
    fn view_on_missing_config_prints_empty_contexts() {
        let dir = TempDir::new().unwrap();

        let output = grafanactl(dir.path(), &["config", "view"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("contexts"));
    }

    #[test]
    fn set_context_then_view_round_trips() {
        let dir = TempDir::new().unwrap();

        let set = grafanactl(
            dir.path(),
            &["config", "set-context", "prod", "--grafana-server", "https://grafana.example.com", "--org-id", "1"],
        );
        assert!(set.status.success(), "stderr: {}", String::from_utf8_lossy(&set.stderr));

        let view = grafanactl(dir.path(), &["config", "view"]);
        let out = stdout(&view);
        assert!(out.contains("prod"));
        assert!(out.contains("https://grafana.example.com"));
    }

    #[test]
    fn use_context_on_unknown_name_fails() {
        let dir = TempDir::new().unwrap();

        let output = grafanactl(dir.path(), &["config", "use-context", "does-not-exist"]);

        assert!(!output.status.success());
    }
}

mod resources_command {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_server_with_one_dashboard() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/apis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "groups": [{
                    "name": "dashboard.grafana.app",
                    "versions": [{"groupVersion": "dashboard.grafana.app/v1", "version": "v1"}],
                    "preferredVersion": {"groupVersion": "dashboard.grafana.app/v1", "version": "v1"}
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apis/dashboard.grafana.app/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "groupVersion": "dashboard.grafana.app/v1",
                "resources": [{"name": "dashboards", "singularName": "dashboard", "namespaced": true, "kind": "Dashboard"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apis/dashboard.grafana.app/v1/namespaces/org-1/dashboards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "apiVersion": "dashboard.grafana.app/v1",
                    "kind": "Dashboard",
                    "metadata": {"name": "release-overview"}
                }]
            })))
            .mount(&server)
            .await;

        server
    }

    fn write_context(config_dir: &Path, server_url: &str) {
        let grafanactl_dir = config_dir.join("grafanactl");
        std::fs::create_dir_all(&grafanactl_dir).unwrap();
        std::fs::write(
            grafanactl_dir.join("config.yaml"),
            format!(
                "contexts:\n  test:\n    grafana:\n      server: {server_url}\n      org-id: 1\ncurrent-context: test\n"
            ),
        )
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_prints_discovered_kinds() {
        let server = mock_server_with_one_dashboard().await;
        let dir = TempDir::new().unwrap();
        write_context(dir.path(), &server.uri());

        let output = tokio::task::spawn_blocking({
            let config_dir = dir.path().to_path_buf();
            move || grafanactl(&config_dir, &["resources", "list"])
        })
        .await
        .unwrap();

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let out = stdout(&output);
        assert!(out.contains("Dashboard"));
        assert!(out.contains("dashboard.grafana.app"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_renders_fetched_resource_as_yaml() {
        let server = mock_server_with_one_dashboard().await;
        let dir = TempDir::new().unwrap();
        write_context(dir.path(), &server.uri());

        let output = tokio::task::spawn_blocking({
            let config_dir = dir.path().to_path_buf();
            move || grafanactl(&config_dir, &["resources", "get", "dashboards"])
        })
        .await
        .unwrap();

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let out = stdout(&output);
        assert!(out.contains("release-overview"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_without_selector_or_all_is_a_usage_error() {
        let server = mock_server_with_one_dashboard().await;
        let dir = TempDir::new().unwrap();
        write_context(dir.path(), &server.uri());

        let output = tokio::task::spawn_blocking({
            let config_dir = dir.path().to_path_buf();
            move || grafanactl(&config_dir, &["resources", "delete"])
        })
        .await
        .unwrap();

        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(64));
    }
}
