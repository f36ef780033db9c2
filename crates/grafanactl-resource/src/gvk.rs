//! Group/Version/Kind identity types.

use std::fmt;

/// Identity of a resource document: the `apiVersion` + `kind` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// `group + "/" + version`, or just `version` when group is empty.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Parse `apiVersion` + `kind` into a GVK. Empty group yields `("", version)`.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((g, v)) => (g.to_string(), v.to_string()),
            None => (String::new(), api_version.to_string()),
        };
        Self { group, version, kind: kind.to_string() }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Identity of the HTTP path used to reach a resource type: `apiVersion` + plural name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: impl Into<String>, version: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}

/// A fully resolved resource identity, as returned by the discovery registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub singular: String,
    pub plural: String,
}

impl Descriptor {
    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::new(&self.group, &self.version, &self.kind)
    }

    pub fn group_version_resource(&self) -> GroupVersionResource {
        GroupVersionResource::new(&self.group, &self.version, &self.plural)
    }

    /// Whether this descriptor identifies the given GVK.
    pub fn matches(&self, gvk: &GroupVersionKind) -> bool {
        self.group == gvk.group && self.version == gvk.version && self.kind == gvk.kind
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group_version_resource())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_version_with_empty_group() {
        let gvk = GroupVersionKind::new("", "v1", "ConfigMap");
        assert_eq!(gvk.api_version(), "v1");
    }

    #[test]
    fn api_version_with_group() {
        let gvk = GroupVersionKind::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        assert_eq!(gvk.api_version(), "dashboard.grafana.app/v1alpha1");
    }

    #[test]
    fn from_api_version_roundtrip() {
        let gvk = GroupVersionKind::from_api_version("dashboard.grafana.app/v1alpha1", "Dashboard");
        assert_eq!(gvk.group, "dashboard.grafana.app");
        assert_eq!(gvk.version, "v1alpha1");
        assert_eq!(gvk.api_version(), "dashboard.grafana.app/v1alpha1");
    }

    #[test]
    fn descriptor_matches() {
        let desc = Descriptor {
            group: "dashboard.grafana.app".into(),
            version: "v1alpha1".into(),
            kind: "Dashboard".into(),
            singular: "dashboard".into(),
            plural: "dashboards".into(),
        };
        assert!(desc.matches(&GroupVersionKind::new("dashboard.grafana.app", "v1alpha1", "Dashboard")));
        assert!(!desc.matches(&GroupVersionKind::new("dashboard.grafana.app", "v1", "Dashboard")));
    }
}
