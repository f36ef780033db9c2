//! `grafanactl resources push` — read a directory tree and push it to the server.

use std::path::PathBuf;

use grafanactl_codec::CodecRegistry;
use grafanactl_engine::{push, PushOptions};
use grafanactl_fs::{read_tree, ReadOptions};
use grafanactl_resource::ResourceSet;

use super::resolve_filters;
use crate::error::CliError;
use crate::output::OnError;
use crate::session::Session;

pub async fn run(
    session: &Session,
    selectors: &[String],
    source: &PathBuf,
    overwrite: bool,
    dry_run: bool,
    max_concurrent: usize,
    on_error: OnError,
) -> Result<i32, CliError> {
    let filters = resolve_filters(session, selectors).await?;

    let codecs = CodecRegistry::with_defaults();
    let set = ResourceSet::new();
    let read_opts = ReadOptions { max_concurrent, stop_on_error: on_error.stop_on_error() };
    read_tree(std::slice::from_ref(source), &codecs, &filters, &set, &read_opts)
        .await
        .map_err(CliError::from)?;

    let push_opts = PushOptions {
        max_concurrent,
        stop_on_error: on_error.stop_on_error(),
        overwrite,
        dry_run,
        suppress_failure_log: false,
    };
    let summary = push(&session.client, &session.registry, &set, &push_opts).await;

    println!(
        "pushed {} resource(s), {} failed",
        summary.success_count(),
        summary.failed_count()
    );

    Ok(on_error.exit_code(summary.failed_count()))
}
