//! An in-memory, deduplicated collection of resources with change callbacks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::resource::{Resource, ResourceRef};

type ChangeCallback = Box<dyn Fn(&ResourceRef, &Resource) + Send + Sync>;

/// Unordered mapping from `ResourceRef` to `Resource`.
///
/// Insertion is deduplicating: a later `add` with the same reference
/// replaces the earlier document, and registered callbacks fire
/// synchronously on every insert (including replacements).
#[derive(Default)]
pub struct ResourceSet {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    resources: BTreeMap<ResourceRef, Resource>,
    callbacks: Vec<ChangeCallback>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback fired synchronously on every `add`.
    ///
    /// Callbacks must return quickly: they run under the set's internal
    /// lock, fanned out in registration order.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&ResourceRef, &Resource) + Send + Sync + 'static,
    {
        self.inner.lock().unwrap().callbacks.push(Box::new(callback));
    }

    /// Insert (or replace) a resource, returning its reference.
    pub fn add(&self, resource: Resource) -> ResourceRef {
        let reference = resource.reference();
        let mut inner = self.inner.lock().unwrap();
        inner.resources.insert(reference.clone(), resource.clone());
        for callback in &inner.callbacks {
            callback(&reference, &resource);
        }
        reference
    }

    pub fn find(&self, kind: &str, name: &str) -> Option<Resource> {
        self.inner
            .lock()
            .unwrap()
            .resources
            .iter()
            .find(|(reference, _)| reference.kind == kind && reference.name == name)
            .map(|(_, resource)| resource.clone())
    }

    pub fn get(&self, reference: &ResourceRef) -> Option<Resource> {
        self.inner.lock().unwrap().resources.get(reference).cloned()
    }

    /// Merge every resource of `other` into `self`, firing change callbacks.
    pub fn merge(&self, other: &ResourceSet) {
        for resource in other.as_list() {
            self.add(resource);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_list(&self) -> Vec<Resource> {
        self.inner.lock().unwrap().resources.values().cloned().collect()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Resource),
    {
        for resource in self.as_list() {
            f(&resource);
        }
    }

    /// Group the current snapshot by `kind`, preserving first-seen order of kinds.
    pub fn group_by_kind(&self) -> Vec<(String, Vec<Resource>)> {
        let mut order = Vec::new();
        let mut groups: BTreeMap<String, Vec<Resource>> = BTreeMap::new();
        for resource in self.as_list() {
            groups.entry(resource.kind.clone()).or_insert_with(|| {
                order.push(resource.kind.clone());
                Vec::new()
            });
            groups.get_mut(&resource.kind).unwrap().push(resource);
        }
        order.into_iter().map(|kind| {
            let resources = groups.remove(&kind).unwrap_or_default();
            (kind, resources)
        }).collect()
    }

    /// Snapshot the set and run `f` over every resource, bounded to
    /// `max_inflight` concurrent tasks. Returns once every task completes.
    pub async fn for_each_concurrently<F, Fut>(&self, max_inflight: usize, f: F)
    where
        F: Fn(Resource) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let resources = self.as_list();
        let semaphore = Arc::new(Semaphore::new(max_inflight.max(1)));
        let f = Arc::new(f);
        let mut tasks = JoinSet::new();

        for resource in resources {
            let semaphore = Arc::clone(&semaphore);
            let f = Arc::clone(&f);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                f(resource).await;
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "resource set task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dashboard(name: &str) -> Resource {
        let mut r = Resource::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        r.metadata.name = Some(name.into());
        r.metadata.namespace = Some("org-1".into());
        r
    }

    #[test]
    fn add_deduplicates_by_reference() {
        let set = ResourceSet::new();
        set.add(dashboard("foo"));
        set.add(dashboard("foo"));
        set.add(dashboard("bar"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_replaces_with_last_write() {
        let set = ResourceSet::new();
        let mut first = dashboard("foo");
        first.metadata.resource_version = Some("1".into());
        set.add(first);

        let mut second = dashboard("foo");
        second.metadata.resource_version = Some("2".into());
        set.add(second);

        let found = set.find("Dashboard", "foo").unwrap();
        assert_eq!(found.resource_version(), Some("2"));
    }

    #[test]
    fn change_callback_fires_on_every_add() {
        let set = ResourceSet::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        set.on_change(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        set.add(dashboard("foo"));
        set.add(dashboard("foo"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn for_each_concurrently_visits_every_resource() {
        let set = ResourceSet::new();
        for i in 0..5 {
            set.add(dashboard(&format!("d{i}")));
        }
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        set.for_each_concurrently(2, move |resource| {
            let seen = Arc::clone(&seen_clone);
            async move {
                seen.lock().unwrap().push(resource.name().unwrap().to_string());
            }
        })
        .await;
        assert_eq!(seen.lock().unwrap().len(), 5);
    }
}
