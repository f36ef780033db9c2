//! The discovery registry: a cache of the server's advertised groups,
//! versions and kinds, rebuilt wholesale on [`Registry::discover`] and
//! queried lock-free in between.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use grafanactl_resource::{Descriptor, GroupVersionResource};
use grafanactl_selector::{Filter, Filters, PartialGvk, SelectorKind, Selectors};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{instrument, warn};

use crate::error::{DiscoveryError, Result};
use crate::wire::{ApiGroupList, ApiResourceList};

const MAX_CONCURRENT_DISCOVERIES: usize = 8;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    descriptors: Vec<Descriptor>,
    by_gvr: HashMap<(String, String, String), Descriptor>,
    preferred: HashMap<(String, String), GroupVersionResource>,
    kind_index: HashMap<String, Vec<Descriptor>>,
    group_versions: HashMap<String, Vec<String>>,
    group_alias: HashMap<String, String>,
}

/// Caches what a Grafana instance's resource API advertises, resolves
/// partial kind specs against it, and turns [`Selector`]s into [`Filter`]s.
pub struct Registry {
    client: reqwest::Client,
    base_url: String,
    ignored_groups: HashSet<String>,
    snapshot: RwLock<Snapshot>,
}

impl Registry {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, ignored_groups: HashSet<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            ignored_groups,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Re-fetch groups and resources from the server and atomically replace
    /// the cached indices.
    #[instrument(skip(self))]
    pub async fn discover(&self) -> Result<()> {
        let groups = self.fetch_groups().await?;

        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_DISCOVERIES));
        let mut join_set = JoinSet::new();

        for group in &groups.groups {
            if self.ignored_groups.contains(&group.name) {
                continue;
            }
            for version in &group.versions {
                let client = self.client.clone();
                let base_url = self.base_url.clone();
                let sem = semaphore.clone();
                let group_name = group.name.clone();
                let group_version = version.group_version.clone();
                let version_name = version.version.clone();

                join_set.spawn(async move {
                    let _permit = sem.acquire_owned().await.expect("semaphore closed");
                    let resources = fetch_resources(&client, &base_url, &group_version).await;
                    (group_name, version_name, resources)
                });
            }
        }

        let mut fetched: HashMap<(String, String), ApiResourceList> = HashMap::new();
        while let Some(joined) = join_set.join_next().await {
            let (group, version, result) = joined.map_err(DiscoveryError::TaskPanicked)?;
            match result {
                Ok(list) => {
                    fetched.insert((group, version), list);
                }
                Err(e) => {
                    warn!(group = %group, version = %version, error = %e, "failed to discover resources");
                }
            }
        }

        let snapshot = build_snapshot(&groups, &fetched);
        *self.snapshot.write().await = snapshot;
        Ok(())
    }

    async fn fetch_groups(&self) -> Result<ApiGroupList> {
        let url = format!("{}/apis", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(DiscoveryError::FetchGroups)?;
        response
            .error_for_status()
            .map_err(DiscoveryError::FetchGroups)?
            .json::<ApiGroupList>()
            .await
            .map_err(DiscoveryError::FetchGroups)
    }

    /// Optionally run `discover` on a fixed interval in the background.
    /// Returns a handle the caller can abort to stop refreshing.
    pub fn spawn_refresher(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.discover().await {
                    warn!(error = %e, "background discovery refresh failed");
                }
            }
        })
    }

    /// Every (group, version, plural) the server currently advertises.
    pub async fn descriptors(&self) -> Vec<Descriptor> {
        self.snapshot.read().await.descriptors.clone()
    }

    /// One `Descriptor` per (group, plural), at that group's preferred version.
    pub async fn preferred_resources(&self) -> Vec<Descriptor> {
        let snapshot = self.snapshot.read().await;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for gvr in snapshot.preferred.values() {
            let key = (gvr.group.clone(), gvr.version.clone(), gvr.resource.clone());
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(desc) = snapshot.by_gvr.get(&key) {
                out.push(desc.clone());
            }
        }
        out
    }

    /// Resolve a partial kind spec into a fully qualified [`Descriptor`].
    pub async fn lookup_partial_gvk(&self, partial: &PartialGvk) -> Result<Descriptor> {
        let snapshot = self.snapshot.read().await;
        lookup(&snapshot, partial)
    }

    /// Resolve an already-fully-qualified GVK (as carried by a decoded
    /// resource document) against the server's advertised resources.
    pub async fn resolve_gvk(&self, gvk: &grafanactl_resource::GroupVersionKind) -> Result<Descriptor> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .descriptors
            .iter()
            .find(|d| d.matches(gvk))
            .cloned()
            .ok_or_else(|| DiscoveryError::UnsupportedResource { group: gvk.group.clone(), kind: gvk.kind.clone() })
    }

    /// Resolve every selector into a `Filter` against the current snapshot.
    pub async fn make_filters(&self, selectors: &Selectors) -> Result<Filters> {
        let snapshot = self.snapshot.read().await;
        let mut filters = Vec::with_capacity(selectors.0.len());
        for selector in &selectors.0 {
            let descriptor = lookup(&snapshot, &selector.partial_gvk)?;
            filters.push(Filter {
                kind: selector.kind,
                descriptor,
                uids: selector.uids.clone(),
            });
        }
        Ok(Filters::new(filters))
    }
}

async fn fetch_resources(client: &reqwest::Client, base_url: &str, group_version: &str) -> Result<ApiResourceList> {
    let path = if group_version.contains('/') {
        format!("apis/{group_version}")
    } else {
        format!("api/{group_version}")
    };
    let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
    let group = group_version.to_string();
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| DiscoveryError::FetchResources { group: group.clone(), source })?;
    response
        .error_for_status()
        .map_err(|source| DiscoveryError::FetchResources { group: group.clone(), source })?
        .json::<ApiResourceList>()
        .await
        .map_err(|source| DiscoveryError::FetchResources { group, source })
}

fn build_snapshot(groups: &ApiGroupList, fetched: &HashMap<(String, String), ApiResourceList>) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for group in &groups.groups {
        let versions: Vec<String> = group.versions.iter().map(|v| v.version.clone()).collect();
        snapshot.group_versions.insert(group.name.clone(), versions);

        snapshot.group_alias.insert(group.name.clone(), group.name.clone());
        if let Some(short) = group.name.split('.').next() {
            snapshot.group_alias.entry(short.to_string()).or_insert_with(|| group.name.clone());
        }

        for version in &group.versions {
            let Some(list) = fetched.get(&(group.name.clone(), version.version.clone())) else {
                continue;
            };
            for resource in &list.resources {
                if !resource.namespaced || resource.name.contains('/') {
                    continue;
                }
                let descriptor = Descriptor {
                    group: group.name.clone(),
                    version: version.version.clone(),
                    kind: resource.kind.clone(),
                    singular: resource.singular_name.clone(),
                    plural: resource.name.clone(),
                };
                snapshot
                    .by_gvr
                    .insert((group.name.clone(), version.version.clone(), resource.name.clone()), descriptor.clone());
                snapshot.descriptors.push(descriptor.clone());

                if version.version == group.preferred_version.version {
                    snapshot.preferred.insert(
                        (group.name.clone(), resource.name.clone()),
                        GroupVersionResource::new(&group.name, &version.version, &resource.name),
                    );
                    for key in [descriptor.singular.to_lowercase(), descriptor.plural.to_lowercase()] {
                        snapshot.kind_index.entry(key).or_default().push(descriptor.clone());
                    }
                }
            }
        }
    }

    snapshot
}

fn resolve_group_alias(snapshot: &Snapshot, name: &str) -> Option<String> {
    if snapshot.group_versions.contains_key(name) {
        return Some(name.to_string());
    }
    snapshot.group_alias.get(name).cloned()
}

fn lookup(snapshot: &Snapshot, partial: &PartialGvk) -> Result<Descriptor> {
    let mut group: Option<String> = None;
    let mut version = partial.version.clone();

    if let Some(requested_group) = &partial.group {
        let canonical = resolve_group_alias(snapshot, requested_group)
            .ok_or_else(|| DiscoveryError::UnsupportedGroup { group: requested_group.clone() })?;
        if let Some(v) = &version {
            let supported = snapshot.group_versions.get(&canonical).map(|vs| vs.iter().any(|sv| sv == v)).unwrap_or(false);
            if !supported {
                return Err(DiscoveryError::UnsupportedVersion { group: canonical, version: v.clone() });
            }
        }
        group = Some(canonical);
    }

    let key = partial.kind.to_lowercase();
    let candidates = snapshot.kind_index.get(&key).ok_or_else(|| DiscoveryError::UnsupportedResource {
        group: group.clone().unwrap_or_default(),
        kind: partial.kind.clone(),
    })?;

    let candidate = match &group {
        Some(g) => candidates.iter().find(|d| &d.group == g),
        None => candidates.first(),
    }
    .ok_or_else(|| DiscoveryError::UnsupportedResource {
        group: group.clone().unwrap_or_default(),
        kind: partial.kind.clone(),
    })?;

    let resolved_group = candidate.group.clone();
    let plural = candidate.plural.clone();

    let resolved_version = match version.take() {
        Some(v) => v,
        None => snapshot
            .preferred
            .get(&(resolved_group.clone(), plural.clone()))
            .map(|gvr| gvr.version.clone())
            .unwrap_or_else(|| candidate.version.clone()),
    };

    snapshot
        .by_gvr
        .get(&(resolved_group.clone(), resolved_version.clone(), plural.clone()))
        .cloned()
        .ok_or(DiscoveryError::UnsupportedVersion { group: resolved_group, version: resolved_version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ApiGroup, ApiResource, GroupVersion};

    fn sample_groups() -> ApiGroupList {
        ApiGroupList {
            groups: vec![ApiGroup {
                name: "dashboard.grafana.app".to_string(),
                versions: vec![
                    GroupVersion { group_version: "dashboard.grafana.app/v1".to_string(), version: "v1".to_string() },
                    GroupVersion { group_version: "dashboard.grafana.app/v2".to_string(), version: "v2".to_string() },
                ],
                preferred_version: GroupVersion { group_version: "dashboard.grafana.app/v2".to_string(), version: "v2".to_string() },
            }],
        }
    }

    fn sample_resources() -> HashMap<(String, String), ApiResourceList> {
        let mut map = HashMap::new();
        for version in ["v1", "v2"] {
            map.insert(
                ("dashboard.grafana.app".to_string(), version.to_string()),
                ApiResourceList {
                    group_version: format!("dashboard.grafana.app/{version}"),
                    resources: vec![ApiResource {
                        name: "dashboards".to_string(),
                        singular_name: "dashboard".to_string(),
                        namespaced: true,
                        kind: "Dashboard".to_string(),
                    }],
                },
            );
        }
        map
    }

    #[test]
    fn preferred_version_lookup() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk { kind: "dashboards".to_string(), version: None, group: None };
        let descriptor = lookup(&snapshot, &partial).unwrap();
        assert_eq!(descriptor.group, "dashboard.grafana.app");
        assert_eq!(descriptor.version, "v2");
        assert_eq!(descriptor.plural, "dashboards");
    }

    #[test]
    fn explicit_version_lookup() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk {
            kind: "dashboards".to_string(),
            version: Some("v1".to_string()),
            group: Some("dashboard.grafana.app".to_string()),
        };
        let descriptor = lookup(&snapshot, &partial).unwrap();
        assert_eq!(descriptor.version, "v1");
    }

    #[test]
    fn unknown_group_errors() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk { kind: "dashboards".to_string(), version: None, group: Some("bogus.group".to_string()) };
        assert!(matches!(lookup(&snapshot, &partial), Err(DiscoveryError::UnsupportedGroup { .. })));
    }

    #[test]
    fn unsupported_version_errors() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk {
            kind: "dashboards".to_string(),
            version: Some("v99".to_string()),
            group: Some("dashboard.grafana.app".to_string()),
        };
        assert!(matches!(lookup(&snapshot, &partial), Err(DiscoveryError::UnsupportedVersion { .. })));
    }

    #[test]
    fn unknown_kind_errors() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk { kind: "widgets".to_string(), version: None, group: None };
        assert!(matches!(lookup(&snapshot, &partial), Err(DiscoveryError::UnsupportedResource { .. })));
    }

    #[test]
    fn short_group_alias_resolves() {
        let snapshot = build_snapshot(&sample_groups(), &sample_resources());
        let partial = PartialGvk { kind: "dashboards".to_string(), version: None, group: Some("dashboard".to_string()) };
        let descriptor = lookup(&snapshot, &partial).unwrap();
        assert_eq!(descriptor.group, "dashboard.grafana.app");
    }

    #[tokio::test]
    async fn preferred_resources_lists_preferred_version_only() {
        let registry = Registry::new(reqwest::Client::new(), "http://localhost", HashSet::new());
        *registry.snapshot.write().await = build_snapshot(&sample_groups(), &sample_resources());
        let preferred = registry.preferred_resources().await;
        assert_eq!(preferred.len(), 1);
        assert_eq!(preferred[0].version, "v2");
    }
}
