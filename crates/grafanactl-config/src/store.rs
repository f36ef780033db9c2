//! The on-disk context file: `$XDG_CONFIG_HOME/grafanactl/config.yaml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::connection::GrafanaConnection;
use crate::error::{ConfigError, Result};

/// A single named context: a Grafana connection plus whatever else future
/// context-scoped settings need.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    pub grafana: GrafanaConnection,
}

/// The full context file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub contexts: IndexMap<String, Context>,
    #[serde(default, rename = "current-context")]
    pub current_context: Option<String>,
}

impl ConfigFile {
    /// Load from the default location. A missing file is treated as empty,
    /// not an error.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: path.display().to_string(), source })?;
        }
        let content = serde_yaml::to_string(self).expect("ConfigFile always serializes");
        std::fs::write(path, content).map_err(|source| ConfigError::Write { path: path.display().to_string(), source })
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("grafanactl").join("config.yaml"))
    }

    /// Set (or replace) a context's connection and save.
    pub fn set_context(&mut self, name: impl Into<String>, grafana: GrafanaConnection) {
        self.contexts.insert(name.into(), Context { grafana });
    }

    /// Switch the current context, failing if it doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if !self.contexts.contains_key(name) {
            return Err(ConfigError::ContextNotFound { name: name.to_string() });
        }
        self.current_context = Some(name.to_string());
        Ok(())
    }

    /// Resolve a connection by context name, or the current context if
    /// `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<&GrafanaConnection> {
        let name = match name {
            Some(n) => n,
            None => self.current_context.as_deref().ok_or(ConfigError::NoCurrentContext)?,
        };
        self.contexts
            .get(name)
            .map(|ctx| &ctx.grafana)
            .ok_or_else(|| ConfigError::ContextNotFound { name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_connection() -> GrafanaConnection {
        GrafanaConnection { server: "https://grafana.example.com".into(), ..Default::default() }
    }

    #[test]
    fn round_trips_through_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = ConfigFile::default();
        config.set_context("prod", sample_connection());
        config.use_context("prod").unwrap();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.current_context.as_deref(), Some("prod"));
        assert_eq!(loaded.resolve(None).unwrap().server, "https://grafana.example.com");
    }

    #[test]
    fn use_context_requires_existing_context() {
        let mut config = ConfigFile::default();
        assert!(matches!(config.use_context("missing"), Err(ConfigError::ContextNotFound { .. })));
    }

    #[test]
    fn resolve_without_current_context_fails() {
        let config = ConfigFile::default();
        assert!(matches!(config.resolve(None), Err(ConfigError::NoCurrentContext)));
    }

    #[test]
    fn resolve_by_explicit_name_ignores_current_context() {
        let mut config = ConfigFile::default();
        config.set_context("staging", sample_connection());
        config.set_context("prod", GrafanaConnection { server: "https://prod".into(), ..Default::default() });
        config.use_context("prod").unwrap();

        let resolved = config.resolve(Some("staging")).unwrap();
        assert_eq!(resolved.server, "https://grafana.example.com");
    }
}
