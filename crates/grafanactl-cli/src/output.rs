//! Rendering a batch of resources for `resources get`, and the `--on-error`
//! policy shared by `pull`/`push`/`validate`.

use clap::ValueEnum;
use grafanactl_resource::Resource;

use crate::exit_codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Yaml,
    Json,
    Text,
    Wide,
}

pub fn render(resources: &[Resource], format: OutputFormat) -> String {
    match format {
        OutputFormat::Yaml => resources
            .iter()
            .map(|r| serde_yaml::to_string(r).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("---\n"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(resources).unwrap_or_default() + "\n"
        }
        OutputFormat::Text => render_table(resources, false),
        OutputFormat::Wide => render_table(resources, true),
    }
}

fn render_table(resources: &[Resource], wide: bool) -> String {
    let mut out = String::new();
    if wide {
        out.push_str(&format!("{:<30}{:<30}{:<20}{}\n", "KIND", "NAME", "NAMESPACE", "API VERSION"));
    } else {
        out.push_str(&format!("{:<30}{}\n", "KIND", "NAME"));
    }
    for resource in resources {
        let name = resource.name().unwrap_or("<none>");
        if wide {
            out.push_str(&format!(
                "{:<30}{:<30}{:<20}{}\n",
                resource.kind,
                name,
                resource.namespace().unwrap_or("-"),
                resource.api_version
            ));
        } else {
            out.push_str(&format!("{:<30}{}\n", resource.kind, name));
        }
    }
    out
}

/// `--on-error` policy shared by `pull`, `push`, and `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OnError {
    /// Exit `0` no matter how many per-resource failures were recorded.
    Ignore,
    /// Run to completion; exit non-zero if any resource failed.
    Fail,
    /// Stop at the first failure; exit non-zero.
    Abort,
}

impl OnError {
    pub fn stop_on_error(self) -> bool {
        matches!(self, OnError::Abort)
    }

    /// Map a summary's failure count to this policy's exit code.
    pub fn exit_code(self, failed: u64) -> i32 {
        match self {
            OnError::Ignore => exit_codes::SUCCESS,
            OnError::Fail | OnError::Abort => {
                if failed > 0 {
                    exit_codes::ERROR
                } else {
                    exit_codes::SUCCESS
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resource {
        let mut r = Resource::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        r.metadata.name = Some("foo".into());
        r
    }

    #[test]
    fn yaml_and_json_round_trip_through_serde() {
        let resources = vec![sample()];
        let yaml = render(&resources, OutputFormat::Yaml);
        assert!(yaml.contains("kind: Dashboard"));
        let json = render(&resources, OutputFormat::Json);
        assert!(json.contains("\"kind\": \"Dashboard\""));
    }

    #[test]
    fn text_table_lists_kind_and_name() {
        let table = render(&[sample()], OutputFormat::Text);
        assert!(table.contains("Dashboard"));
        assert!(table.contains("foo"));
    }

    #[test]
    fn ignore_policy_always_succeeds() {
        assert_eq!(OnError::Ignore.exit_code(5), exit_codes::SUCCESS);
    }

    #[test]
    fn fail_policy_fails_on_any_failure() {
        assert_eq!(OnError::Fail.exit_code(0), exit_codes::SUCCESS);
        assert_eq!(OnError::Fail.exit_code(1), exit_codes::ERROR);
    }

    #[test]
    fn abort_policy_stops_on_error() {
        assert!(OnError::Abort.stop_on_error());
        assert!(!OnError::Fail.stop_on_error());
    }
}
