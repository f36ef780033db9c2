//! `grafanactl resources get` — fetch and print resources without touching disk.

use grafanactl_engine::{pull, ExcludeManaged, ProcessorChain, PullOptions};

use super::resolve_filters;
use crate::error::CliError;
use crate::exit_codes;
use crate::output::{render, OutputFormat};
use crate::session::Session;

pub async fn run(
    session: &Session,
    selectors: &[String],
    include_managed: bool,
    output: OutputFormat,
) -> Result<i32, CliError> {
    let filters = resolve_filters(session, selectors).await?;
    let processors = ProcessorChain::new().push(ExcludeManaged { include_managed });
    let opts = PullOptions::default();

    let (resources, summary) = pull(&session.client, &session.registry, &filters, &processors, &opts).await;

    if summary.failed_count() > 0 {
        for failure in summary.failures() {
            tracing::warn!(error = %failure.error, "resource fetch failed");
        }
    }

    print!("{}", render(&resources, output));

    if summary.is_success() {
        Ok(exit_codes::SUCCESS)
    } else {
        Err(CliError::Operation { failed: summary.failed_count(), total: summary.failed_count() + summary.success_count() })
    }
}
