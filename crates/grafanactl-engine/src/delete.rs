//! Bounded-concurrency delete.

use std::sync::Arc;

use grafanactl_client::{DeleteOptions as ClientDeleteOptions, DynamicClient};
use grafanactl_discovery::Registry;
use grafanactl_resource::ResourceSet;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::summary::OperationSummary;

pub struct DeleteOptions {
    pub max_concurrent: usize,
    pub stop_on_error: bool,
    pub dry_run: bool,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self { max_concurrent: 10, stop_on_error: false, dry_run: false }
    }
}

/// Delete every resource in `set`. Resources whose kind the server no
/// longer supports are skipped with a warning, not counted as a failure.
pub async fn delete(client: &DynamicClient, registry: &Registry, set: &ResourceSet, opts: &DeleteOptions) -> OperationSummary {
    let summary = OperationSummary::new();
    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut join_set: JoinSet<Result<(), (grafanactl_resource::ResourceRef, String)>> = JoinSet::new();

    for resource in set.as_list() {
        let reference = resource.reference();
        let descriptor = match registry.resolve_gvk(&resource.gvk()).await {
            Ok(d) => d,
            Err(e) => {
                warn!(resource = %reference, error = %e, "skipping delete: resource kind not supported by the API");
                continue;
            }
        };
        let Some(name) = resource.name().map(str::to_string) else {
            summary.record_failure(Some(reference), "resource has no name");
            continue;
        };

        let sem = semaphore.clone();
        let client = client.clone();
        let client_opts = ClientDeleteOptions { dry_run: opts.dry_run };

        join_set.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore closed");
            client.delete(&descriptor, &name, &client_opts).await.map_err(|e| (reference, e.to_string()))
        });
    }

    let mut stop_requested = false;
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(())) => summary.record_success(),
            Ok(Err((reference, error))) => {
                warn!(resource = %reference, error = %error, "delete failed");
                summary.record_failure(Some(reference), error);
                if opts.stop_on_error {
                    stop_requested = true;
                }
            }
            Err(e) => warn!(error = %e, "delete task panicked"),
        }
        if stop_requested {
            join_set.abort_all();
            break;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_spec_defaults() {
        let opts = DeleteOptions::default();
        assert_eq!(opts.max_concurrent, 10);
        assert!(!opts.dry_run);
    }
}
