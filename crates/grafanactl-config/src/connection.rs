//! Connection details for a single Grafana instance.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{ConfigError, Result};

fn stacks_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^stacks-\d+$").expect("valid regex"))
}

/// TLS options for reaching a Grafana server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsConfig {
    #[serde(default)]
    pub insecure: bool,
    #[serde(default, rename = "ca-cert")]
    pub ca_cert: Option<String>,
    #[serde(default, rename = "client-cert")]
    pub client_cert: Option<String>,
    #[serde(default, rename = "client-key")]
    pub client_key: Option<String>,
}

/// How requests to the server should be authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Basic { user: String, password: String },
    Bearer { token: String },
    Anonymous,
}

/// Everything needed to reach and authenticate against one Grafana instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrafanaConnection {
    pub server: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "org-id")]
    pub org_id: Option<i64>,
    #[serde(default, rename = "stack-id")]
    pub stack_id: Option<i64>,
    #[serde(default)]
    pub tls: TlsConfig,
}

impl GrafanaConnection {
    /// Apply `GRAFANA_SERVER`/`GRAFANA_USER`/`GRAFANA_PASSWORD`/`GRAFANA_TOKEN`
    /// environment overrides on top of the configured values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(server) = std::env::var("GRAFANA_SERVER") {
            self.server = server;
        }
        if let Ok(user) = std::env::var("GRAFANA_USER") {
            self.user = Some(user);
        }
        if let Ok(password) = std::env::var("GRAFANA_PASSWORD") {
            self.password = Some(password);
        }
        if let Ok(token) = std::env::var("GRAFANA_TOKEN") {
            self.token = Some(token);
        }
        self
    }

    /// Which authentication scheme requests should use. Token takes
    /// precedence over basic auth, which takes precedence over anonymous.
    pub fn auth_method(&self) -> AuthMethod {
        if let Some(token) = &self.token {
            return AuthMethod::Bearer { token: token.clone() };
        }
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            return AuthMethod::Basic { user: user.clone(), password: password.clone() };
        }
        AuthMethod::Anonymous
    }

    /// Resolve the tenant namespace to embed in every API path: explicit
    /// `org-id` or `stack-id` win outright; otherwise ask the server's
    /// `/bootdata` endpoint.
    pub async fn resolve_namespace(&self, client: &reqwest::Client) -> Result<String> {
        if let Some(org_id) = self.org_id {
            return Ok(org_namespace(org_id));
        }
        if let Some(stack_id) = self.stack_id {
            return Ok(cloud_namespace(stack_id));
        }

        let url = format!("{}/bootdata", self.server.trim_end_matches('/'));
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| ConfigError::Bootdata { server: self.server.clone(), source })?;
        let body: serde_json::Value = response
            .error_for_status()
            .map_err(|source| ConfigError::Bootdata { server: self.server.clone(), source })?
            .json()
            .await
            .map_err(|source| ConfigError::Bootdata { server: self.server.clone(), source })?;

        let namespace = body
            .pointer("/settings/namespace")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConfigError::BootdataMissingNamespace { server: self.server.clone() })?;

        if stacks_pattern().is_match(namespace) {
            Ok(namespace.to_string())
        } else {
            Ok(org_namespace(1))
        }
    }
}

fn org_namespace(org_id: i64) -> String {
    format!("org-{org_id}")
}

fn cloud_namespace(stack_id: i64) -> String {
    format!("stacks-{stack_id}")
}
