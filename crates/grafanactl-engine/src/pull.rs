//! Bounded-concurrency pull: resolve filters, fetch, post-process.

use std::sync::Arc;

use grafanactl_client::{ClientError, DynamicClient, GetOptions, ListOptions};
use grafanactl_discovery::Registry;
use grafanactl_resource::Resource;
use grafanactl_selector::{Filter, Filters, SelectorKind};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::processor::ProcessorChain;
use crate::summary::OperationSummary;

pub struct PullOptions {
    pub max_concurrent: usize,
    pub stop_on_error: bool,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self { max_concurrent: 10, stop_on_error: false }
    }
}

/// Fetch every resource named by `filters` (or, if empty, every preferred
/// resource the registry knows about), run `processors` over the results,
/// and return them alongside an operation summary.
pub async fn pull(
    client: &DynamicClient,
    registry: &Registry,
    filters: &Filters,
    processors: &ProcessorChain,
    opts: &PullOptions,
) -> (Vec<Resource>, OperationSummary) {
    let summary = OperationSummary::new();

    let work: Vec<Filter> = if filters.is_empty() {
        registry
            .preferred_resources()
            .await
            .into_iter()
            .map(|descriptor| Filter { kind: SelectorKind::All, descriptor, uids: Vec::new() })
            .collect()
    } else {
        filters.iter().cloned().collect()
    };

    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let cancel = CancellationToken::new();
    let mut join_set: JoinSet<(Filter, Result<Vec<Resource>, ClientError>)> = JoinSet::new();

    for filter in work {
        let sem = semaphore.clone();
        let client = client.clone();
        let cancel_check = cancel.clone();

        join_set.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore closed");
            if cancel_check.is_cancelled() {
                return (filter, Ok(Vec::new()));
            }
            let result = fetch_filter(&client, &filter).await;
            (filter, result)
        });
    }

    let mut fetched = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let (filter, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "pull task panicked");
                continue;
            }
        };
        match result {
            Ok(items) => {
                summary.record_success();
                fetched.extend(items);
            }
            Err(e) => {
                warn!(descriptor = %filter.descriptor, error = %e, "pull filter failed");
                summary.record_failure(None, format!("{}: {e}", filter.descriptor));
                if opts.stop_on_error {
                    cancel.cancel();
                }
            }
        }
    }

    let processed = processors.apply(fetched);
    (processed, summary)
}

async fn fetch_filter(client: &DynamicClient, filter: &Filter) -> Result<Vec<Resource>, ClientError> {
    match filter.kind {
        SelectorKind::All => client.list(&filter.descriptor, &ListOptions::default()).await,
        SelectorKind::Multiple => client.get_multiple(&filter.descriptor, &filter.uids, &GetOptions::default()).await,
        SelectorKind::Single => {
            let name = filter.uids.first().cloned().unwrap_or_default();
            client.get(&filter.descriptor, &name, &GetOptions::default()).await.map(|r| vec![r])
        }
    }
}
