//! `grafanactl resources pull` — fetch resources and write them to disk.
//!
//! The default processor chain only excludes resources managed by another
//! tool; it does not strip server-assigned fields such as
//! `resourceVersion`. Keeping that field on disk is what lets a later
//! `push` of the same tree update in place instead of racing the server's
//! current revision.

use std::path::PathBuf;

use grafanactl_codec::CodecRegistry;
use grafanactl_engine::{pull, ExcludeManaged, ProcessorChain, PullOptions};
use grafanactl_fs::{write_tree, GroupByKind, WriteOptions};

use super::resolve_filters;
use crate::error::CliError;
use crate::output::OnError;
use crate::session::Session;

pub async fn run(
    session: &Session,
    selectors: &[String],
    destination: &PathBuf,
    include_managed: bool,
    format: &str,
    on_error: OnError,
) -> Result<i32, CliError> {
    let filters = resolve_filters(session, selectors).await?;
    let processors = ProcessorChain::new().push(ExcludeManaged { include_managed });
    let pull_opts = PullOptions { max_concurrent: 10, stop_on_error: on_error.stop_on_error() };

    let (resources, summary) = pull(&session.client, &session.registry, &filters, &processors, &pull_opts).await;

    let codecs = CodecRegistry::with_defaults();
    let codec = codecs.by_name(format).map_err(CliError::from)?;
    let namer = GroupByKind { extension: format_extension(format) };
    write_tree(destination, &resources, &namer, codec.as_ref(), &WriteOptions { stop_on_error: on_error.stop_on_error() })
        .map_err(CliError::from)?;

    println!("pulled {} resource(s) into {}", resources.len(), destination.display());

    Ok(on_error.exit_code(summary.failed_count()))
}

fn format_extension(format: &str) -> &'static str {
    match format {
        "json" => "json",
        _ => "yaml",
    }
}
