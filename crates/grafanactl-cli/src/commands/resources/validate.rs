//! `grafanactl resources validate` — dry-run push a directory tree and
//! report the server's validation errors without mutating anything.

use std::collections::HashMap;
use std::path::PathBuf;

use grafanactl_codec::CodecRegistry;
use grafanactl_engine::{push, PushOptions};
use grafanactl_resource::{ResourceRef, ResourceSet};
use grafanactl_selector::Filters;
use grafanactl_fs::{read_tree, ReadOptions};

use crate::error::CliError;
use crate::output::OnError;
use crate::session::Session;

pub async fn run(session: &Session, source: &PathBuf, on_error: OnError) -> Result<i32, CliError> {
    let codecs = CodecRegistry::with_defaults();
    let set = ResourceSet::new();
    read_tree(std::slice::from_ref(source), &codecs, &Filters::default(), &set, &ReadOptions::default())
        .await
        .map_err(CliError::from)?;

    let paths: HashMap<ResourceRef, String> = set
        .as_list()
        .into_iter()
        .filter_map(|r| r.source().map(|(_, path)| (r.reference(), path.to_string())))
        .collect();

    let push_opts = PushOptions {
        max_concurrent: 10,
        stop_on_error: on_error.stop_on_error(),
        overwrite: false,
        dry_run: true,
        suppress_failure_log: true,
    };
    let summary = push(&session.client, &session.registry, &set, &push_opts).await;

    for failure in summary.failures() {
        let path = failure
            .resource
            .as_ref()
            .and_then(|r| paths.get(r))
            .map(String::as_str)
            .unwrap_or("<unknown>");
        println!("{path}: {}", failure.error);
    }

    println!("validated {} resource(s), {} invalid", summary.success_count(), summary.failed_count());

    Ok(on_error.exit_code(summary.failed_count()))
}
