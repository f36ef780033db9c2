//! Bounded-concurrency push with folders-before-rest ordering.

use std::sync::Arc;

use grafanactl_client::{ClientError, DynamicClient, GetOptions, WriteOptions};
use grafanactl_discovery::Registry;
use grafanactl_resource::{Resource, ResourceSet, FOLDER_KIND};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::summary::OperationSummary;

pub struct PushOptions {
    pub max_concurrent: usize,
    pub stop_on_error: bool,
    pub overwrite: bool,
    pub dry_run: bool,
    /// Suppresses the per-failure warn log, for callers (like `validate`)
    /// that present their own table from the summary.
    pub suppress_failure_log: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self { max_concurrent: 10, stop_on_error: false, overwrite: false, dry_run: false, suppress_failure_log: false }
    }
}

/// Push every resource in `set`. Folders are pushed to completion before
/// any other kind starts; within a phase there is no ordering guarantee.
pub async fn push(client: &DynamicClient, registry: &Registry, set: &ResourceSet, opts: &PushOptions) -> OperationSummary {
    let summary = OperationSummary::new();
    let groups = set.group_by_kind();

    let (folders, rest): (Vec<_>, Vec<_>) = groups.into_iter().partition(|(kind, _)| kind == FOLDER_KIND);

    let folder_resources: Vec<Resource> = folders.into_iter().flat_map(|(_, resources)| resources).collect();
    push_batch(client, registry, folder_resources, opts, &summary).await;

    if opts.stop_on_error && summary.failed_count() > 0 {
        return summary;
    }

    let rest_resources: Vec<Resource> = rest.into_iter().flat_map(|(_, resources)| resources).collect();
    push_batch(client, registry, rest_resources, opts, &summary).await;

    summary
}

async fn push_batch(client: &DynamicClient, registry: &Registry, resources: Vec<Resource>, opts: &PushOptions, summary: &OperationSummary) {
    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut join_set: JoinSet<Result<(), (Resource, String)>> = JoinSet::new();

    for resource in resources {
        let sem = semaphore.clone();
        let client = client.clone();
        let registry_descriptor = registry.resolve_gvk(&resource.gvk()).await;

        let descriptor = match registry_descriptor {
            Ok(d) => d,
            Err(e) => {
                summary.record_failure(Some(resource.reference()), format!("resource not supported by the API: {e}"));
                if opts.stop_on_error {
                    break;
                }
                continue;
            }
        };

        let dry_run = opts.dry_run;
        let overwrite = opts.overwrite;

        join_set.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore closed");
            push_one(&client, &descriptor, resource.clone(), overwrite, dry_run)
                .await
                .map_err(|e| (resource, e))
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(())) => summary.record_success(),
            Ok(Err((resource, error))) => {
                if !opts.suppress_failure_log {
                    warn!(resource = %resource.reference(), error = %error, "push failed");
                }
                summary.record_failure(Some(resource.reference()), error);
            }
            Err(e) => warn!(error = %e, "push task panicked"),
        }
    }
}

async fn push_one(client: &DynamicClient, descriptor: &grafanactl_resource::Descriptor, mut resource: Resource, overwrite: bool, dry_run: bool) -> Result<(), String> {
    let name = resource.name().ok_or("resource has no name")?.to_string();
    let write_opts = WriteOptions { dry_run };

    match client.get(descriptor, &name, &GetOptions::default()).await {
        Err(ClientError::NotFound { .. }) => {
            client.create(descriptor, &resource, &write_opts).await.map_err(|e| e.to_string())?;
            Ok(())
        }
        Ok(server_copy) => {
            let local_version = resource.resource_version();
            let server_version = server_copy.resource_version();

            if local_version == server_version {
                client.update(descriptor, &resource, &write_opts).await.map_err(|e| e.to_string())?;
                Ok(())
            } else if !overwrite {
                Err(format!(
                    "resource already exists with a different resource version: server has {}",
                    server_version.unwrap_or("<none>")
                ))
            } else {
                if let Some(v) = server_version {
                    resource.set_resource_version(v);
                }
                client.update(descriptor, &resource, &write_opts).await.map_err(|e| e.to_string())?;
                Ok(())
            }
        }
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_spec_defaults() {
        let opts = PushOptions::default();
        assert_eq!(opts.max_concurrent, 10);
        assert!(!opts.overwrite);
        assert!(!opts.dry_run);
    }
}
