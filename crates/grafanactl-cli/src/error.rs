//! Classifies errors from every collaborating crate into a `DetailedError`
//! and renders it as a colored block (or plain text when color is off).

use console::style;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// Errors the CLI layer can produce or re-classify from a collaborating
/// crate, each carrying enough context for `DetailedError` presentation.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::config))]
    Config(#[from] grafanactl_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::selector))]
    Selector(#[from] grafanactl_selector::SelectorError),

    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::discovery))]
    Discovery(#[from] grafanactl_discovery::DiscoveryError),

    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::client))]
    Client(#[from] grafanactl_client::ClientError),

    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::fs))]
    Fs(#[from] grafanactl_fs::FsError),

    #[error(transparent)]
    #[diagnostic(code(grafanactl::cli::codec))]
    Codec(#[from] grafanactl_codec::CodecError),

    #[error("{0}")]
    #[diagnostic(code(grafanactl::cli::usage))]
    Usage(String),

    #[error("{failed} of {total} resource(s) failed")]
    #[diagnostic(code(grafanactl::cli::operation))]
    Operation { failed: u64, total: u64 },

    #[error("{0}")]
    #[diagnostic(code(grafanactl::cli::other))]
    Other(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

/// The structured shape §7 prescribes for CLI-facing error presentation:
/// a one-line summary, optional elaboration, an optional parent cause
/// already folded into `details`, and actionable next steps.
pub struct DetailedError {
    pub summary: String,
    pub details: Option<String>,
    pub suggestions: Vec<String>,
    pub exit_code: i32,
}

impl CliError {
    pub fn detail(&self) -> DetailedError {
        match self {
            CliError::Config(source) => DetailedError {
                summary: "configuration error".to_string(),
                details: Some(source.to_string()),
                suggestions: vec![
                    "run `grafanactl config view` to inspect the current context".to_string(),
                    "run `grafanactl config set-context NAME --grafana-server=...` to create one".to_string(),
                ],
                exit_code: exit_codes::CONFIG_ERROR,
            },
            CliError::Selector(source) => DetailedError {
                summary: "invalid selector".to_string(),
                details: Some(source.to_string()),
                suggestions: vec!["selectors look like `kind[.version].group][/uid[,uid...]]`, e.g. `dashboards/my-dashboard`".to_string()],
                exit_code: exit_codes::USAGE_ERROR,
            },
            CliError::Discovery(source) => DetailedError {
                summary: "discovery failed".to_string(),
                details: Some(source.to_string()),
                suggestions: vec!["run `grafanactl resources list` to see what the server currently advertises".to_string()],
                exit_code: exit_codes::ERROR,
            },
            CliError::Client(source) => DetailedError {
                summary: "request to the server failed".to_string(),
                details: Some(source.to_string()),
                suggestions: match source {
                    grafanactl_client::ClientError::Unauthorized(_) => {
                        vec!["check the `user`/`password` or `token` configured for this context".to_string()]
                    }
                    grafanactl_client::ClientError::Forbidden(_) => {
                        vec!["the configured credentials don't have permission for this operation".to_string()]
                    }
                    _ => Vec::new(),
                },
                exit_code: exit_codes::ERROR,
            },
            CliError::Fs(source) => DetailedError {
                summary: "filesystem error".to_string(),
                details: Some(source.to_string()),
                suggestions: Vec::new(),
                exit_code: exit_codes::ERROR,
            },
            CliError::Codec(source) => DetailedError {
                summary: "could not decode or encode a resource".to_string(),
                details: Some(source.to_string()),
                suggestions: vec!["only `.yaml`, `.yml` and `.json` files are recognised".to_string()],
                exit_code: exit_codes::ERROR,
            },
            CliError::Usage(message) => DetailedError {
                summary: message.clone(),
                details: None,
                suggestions: Vec::new(),
                exit_code: exit_codes::USAGE_ERROR,
            },
            CliError::Operation { failed, total } => DetailedError {
                summary: format!("{failed} of {total} resource(s) failed"),
                details: None,
                suggestions: vec!["re-run with `--on-error=abort` to stop at the first failure".to_string()],
                exit_code: exit_codes::VALIDATION_ERROR,
            },
            CliError::Other(message) => {
                DetailedError { summary: message.clone(), details: None, suggestions: Vec::new(), exit_code: exit_codes::ERROR }
            }
        }
    }
}

/// Print a `CliError` as a colored block to stderr and return the exit
/// code it maps to.
pub fn present(err: &CliError) -> i32 {
    let detail = err.detail();
    eprintln!("{} {}", style("✗").red().bold(), style(&detail.summary).bold());
    if let Some(details) = &detail.details {
        eprintln!("  {}", style(details).dim());
    }
    for suggestion in &detail.suggestions {
        eprintln!("  {} {}", style("hint:").blue(), suggestion);
    }
    detail.exit_code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_map_to_usage_exit_code() {
        let err = CliError::usage("bad flag");
        assert_eq!(err.detail().exit_code, exit_codes::USAGE_ERROR);
    }

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err = CliError::from(grafanactl_config::ConfigError::NoCurrentContext);
        assert_eq!(err.detail().exit_code, exit_codes::CONFIG_ERROR);
    }
}
