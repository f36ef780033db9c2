//! The Resource document type and its stable reference.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::gvk::GroupVersionKind;

/// Annotation key recording the codec format a resource was decoded from.
pub const SOURCE_SCHEME_ANNOTATION: &str = "grafanactl.grafana.app/source-scheme";
/// Annotation key recording the filesystem path a resource was decoded from.
pub const SOURCE_PATH_ANNOTATION: &str = "grafanactl.grafana.app/source-path";
/// Annotation naming the tool that manages a resource's lifecycle.
pub const MANAGED_BY_ANNOTATION: &str = "grafana.app/managed-by";
/// The value `MANAGED_BY_ANNOTATION` carries for resources owned by this tool.
pub const MANAGED_BY_SELF: &str = "grafanactl";

/// Kind name given special folder-first push ordering (see engine crate).
pub const FOLDER_KIND: &str = "Folder";

/// `metadata` spine common to every resource document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// An opaque Kubernetes-style resource document.
///
/// `spec` (and any other top-level field the server or disk copy carries,
/// e.g. `status` or `data`) is kept as an untyped JSON map: the tool never
/// needs to understand resource-specific schemas, only the `apiVersion`,
/// `kind`, and `metadata` spine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Resource {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            api_version: GroupVersionKind::new(group, version, kind).api_version(),
            kind: kind.to_string(),
            metadata: ObjectMeta::default(),
            fields: serde_json::Map::new(),
        }
    }

    /// Validate the two invariants guaranteed after successful decoding.
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_empty() {
            return Err(ResourceError::MissingKind);
        }
        if self.metadata.name.as_deref().unwrap_or("").is_empty() {
            return Err(ResourceError::MissingName);
        }
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    pub fn group(&self) -> String {
        self.gvk().group
    }

    pub fn version(&self) -> String {
        self.gvk().version
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(&self.api_version, &self.kind)
    }

    /// The stable reference for this resource within a `ResourceSet`.
    pub fn reference(&self) -> ResourceRef {
        let gvk = self.gvk();
        ResourceRef {
            group: gvk.group,
            version: gvk.version,
            kind: gvk.kind,
            namespace: self.metadata.namespace.clone().unwrap_or_default(),
            name: self.metadata.name.clone().unwrap_or_default(),
        }
    }

    /// `(scheme, path)` the resource was decoded from, if read off disk.
    pub fn source(&self) -> Option<(&str, &str)> {
        let scheme = self.metadata.annotations.get(SOURCE_SCHEME_ANNOTATION)?;
        let path = self.metadata.annotations.get(SOURCE_PATH_ANNOTATION)?;
        Some((scheme.as_str(), path.as_str()))
    }

    pub fn set_source(&mut self, scheme: &str, path: &str) {
        self.metadata
            .annotations
            .insert(SOURCE_SCHEME_ANNOTATION.to_string(), scheme.to_string());
        self.metadata
            .annotations
            .insert(SOURCE_PATH_ANNOTATION.to_string(), path.to_string());
    }

    /// The tool named by `grafana.app/managed-by`, if any.
    pub fn managed_by(&self) -> Option<&str> {
        self.metadata.annotations.get(MANAGED_BY_ANNOTATION).map(String::as_str)
    }

    /// True when another tool (not this one) declares ownership of this resource.
    pub fn is_managed_by_other(&self) -> bool {
        matches!(self.managed_by(), Some(owner) if owner != MANAGED_BY_SELF)
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.metadata.resource_version.as_deref()
    }

    pub fn set_resource_version(&mut self, version: impl Into<String>) {
        self.metadata.resource_version = Some(version.into());
    }

    pub fn is_folder(&self) -> bool {
        self.kind == FOLDER_KIND
    }
}

/// Stable identifier for a `Resource` within a `ResourceSet`:
/// group/version/kind + namespace + name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_version = if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        };
        write!(f, "{}/{}:{}/{}", api_version, self.kind, self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resource {
        let mut r = Resource::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        r.metadata.name = Some("foo".into());
        r.metadata.namespace = Some("org-1".into());
        r
    }

    #[test]
    fn validate_requires_name() {
        let mut r = sample();
        r.metadata.name = None;
        assert!(matches!(r.validate(), Err(ResourceError::MissingName)));
    }

    #[test]
    fn reference_round_trips_identity() {
        let r = sample();
        let reference = r.reference();
        assert_eq!(reference.to_string(), "dashboard.grafana.app/v1alpha1/Dashboard:org-1/foo");
    }

    #[test]
    fn managed_by_other_detection() {
        let mut r = sample();
        assert!(!r.is_managed_by_other());
        r.metadata
            .annotations
            .insert(MANAGED_BY_ANNOTATION.to_string(), "terraform".to_string());
        assert!(r.is_managed_by_other());
        r.metadata
            .annotations
            .insert(MANAGED_BY_ANNOTATION.to_string(), MANAGED_BY_SELF.to_string());
        assert!(!r.is_managed_by_other());
    }

    #[test]
    fn source_annotations_round_trip() {
        let mut r = sample();
        assert_eq!(r.source(), None);
        r.set_source("yaml", "/tmp/out/Dashboard/foo.yaml");
        assert_eq!(r.source(), Some(("yaml", "/tmp/out/Dashboard/foo.yaml")));
    }
}
