//! Wires a resolved context into a connected `DynamicClient` + discovered
//! `Registry`, the pair every `resources` subcommand operates over.

use grafanactl_client::{build_http_client, DynamicClient};
use grafanactl_config::{ConfigFile, GrafanaConnection};
use grafanactl_discovery::Registry;

use crate::error::CliError;

/// Platform/infra groups users must not manipulate through this tool.
/// Mirrors the teacher's convention of a small `const` blocklist rather
/// than a configurable one, since no command in §6 exposes a flag for it.
const IGNORED_GROUPS: &[&str] = &["iam.grafana.app", "secret.grafana.app"];

pub struct Session {
    pub connection: GrafanaConnection,
    pub client: DynamicClient,
    pub registry: Registry,
}

/// Load the config file, resolve the requested (or current) context,
/// connect, resolve the tenant namespace, and discover the server's
/// resource API.
pub async fn connect(context: Option<&str>) -> Result<Session, CliError> {
    let config = ConfigFile::load()?;
    let connection = config.resolve(context)?.clone().with_env_overrides();

    let http = build_http_client(&connection)?;
    let namespace = connection.resolve_namespace(&http).await?;
    let client = DynamicClient::with_http_client(http.clone(), &connection, namespace);

    let ignored_groups: std::collections::HashSet<String> = IGNORED_GROUPS.iter().map(|s| s.to_string()).collect();
    let registry = Registry::new(http, connection.server.clone(), ignored_groups);
    registry.discover().await?;

    Ok(Session { connection, client, registry })
}
