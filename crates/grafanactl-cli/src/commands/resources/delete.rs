//! `grafanactl resources delete` — delete resources matching selectors.

use grafanactl_engine::{delete, DeleteOptions, ExcludeManaged, ProcessorChain, PullOptions};
use grafanactl_resource::ResourceSet;

use super::resolve_filters;
use crate::error::CliError;
use crate::output::OnError;
use crate::session::Session;

pub async fn run(
    session: &Session,
    selectors: &[String],
    all: bool,
    dry_run: bool,
    on_error: OnError,
) -> Result<i32, CliError> {
    if selectors.is_empty() && !all {
        return Err(CliError::usage("no selector given; pass one or more SELECTOR arguments or --all"));
    }
    let filters = resolve_filters(session, selectors).await?;

    let pull_opts = PullOptions { max_concurrent: 10, stop_on_error: on_error.stop_on_error() };
    let processors = ProcessorChain::new().push(ExcludeManaged { include_managed: false });
    let (resources, fetch_summary) =
        grafanactl_engine::pull(&session.client, &session.registry, &filters, &processors, &pull_opts).await;

    if fetch_summary.failed_count() > 0 && on_error.stop_on_error() {
        return Err(CliError::Operation {
            failed: fetch_summary.failed_count(),
            total: fetch_summary.failed_count() + fetch_summary.success_count(),
        });
    }

    let set = ResourceSet::new();
    for resource in resources {
        set.add(resource);
    }

    let delete_opts = DeleteOptions { max_concurrent: 10, stop_on_error: on_error.stop_on_error(), dry_run };
    let summary = delete(&session.client, &session.registry, &set, &delete_opts).await;

    println!("deleted {} resource(s), {} failed", summary.success_count(), summary.failed_count());

    Ok(on_error.exit_code(summary.failed_count()))
}
