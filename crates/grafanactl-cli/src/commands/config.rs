//! `grafanactl config view | set-context | use-context`.

use grafanactl_config::{ConfigFile, GrafanaConnection, TlsConfig};

use crate::error::CliError;
use crate::exit_codes;

pub fn view() -> Result<i32, CliError> {
    let config = ConfigFile::load()?;
    let yaml = serde_yaml::to_string(&config).expect("ConfigFile always serializes");
    print!("{yaml}");
    Ok(exit_codes::SUCCESS)
}

/// Field overrides accepted by `set-context`. `None` leaves the existing
/// (or default) value for that field untouched.
#[derive(Default)]
pub struct SetContextArgs {
    pub grafana_server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub org_id: Option<i64>,
    pub stack_id: Option<i64>,
    pub tls_insecure: Option<bool>,
}

pub fn set_context(name: String, args: SetContextArgs) -> Result<i32, CliError> {
    let mut config = ConfigFile::load()?;

    let mut connection: GrafanaConnection =
        config.contexts.get(&name).map(|ctx| ctx.grafana.clone()).unwrap_or_default();

    if let Some(server) = args.grafana_server {
        connection.server = server;
    }
    if let Some(user) = args.user {
        connection.user = Some(user);
    }
    if let Some(password) = args.password {
        connection.password = Some(password);
    }
    if let Some(token) = args.token {
        connection.token = Some(token);
    }
    if let Some(org_id) = args.org_id {
        connection.org_id = Some(org_id);
    }
    if let Some(stack_id) = args.stack_id {
        connection.stack_id = Some(stack_id);
    }
    if let Some(insecure) = args.tls_insecure {
        connection.tls = TlsConfig { insecure, ..connection.tls };
    }

    config.set_context(name, connection);
    config.save()?;
    Ok(exit_codes::SUCCESS)
}

pub fn use_context(name: String) -> Result<i32, CliError> {
    let mut config = ConfigFile::load()?;
    config.use_context(&name)?;
    config.save()?;
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_context_args_default_to_untouched() {
        let args = SetContextArgs::default();
        assert!(args.grafana_server.is_none());
        assert!(args.tls_insecure.is_none());
    }
}
