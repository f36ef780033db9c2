//! Parallel tree walk: a blocking walker, a pool of parser workers
//! dispatching by file extension, and a collector that deduplicates and
//! inserts into the destination set.
//!
//! The three stages are coupled by bounded `tokio::sync::mpsc` channels,
//! the same shape the engine crate uses for its task fan-out, sized to
//! `max_concurrent` so the walker and the collector both apply
//! back-pressure to a slow stage.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use grafanactl_codec::CodecRegistry;
use grafanactl_resource::{GroupVersionKind, Resource, ResourceSet};
use grafanactl_selector::{Filters, SelectorKind};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{FsError, Result};

pub struct ReadOptions {
    pub max_concurrent: usize,
    pub stop_on_error: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { max_concurrent: 10, stop_on_error: false }
    }
}

/// Walk every root, decode each file through `codecs`, keep only resources
/// matching `filters` (or everything, if empty), and insert the survivors
/// into `destination`. Duplicate `(GVK, name)` pairs are logged and
/// dropped, keeping the first one seen.
pub async fn read_tree(
    roots: &[PathBuf],
    codecs: &CodecRegistry,
    filters: &Filters,
    destination: &ResourceSet,
    opts: &ReadOptions,
) -> Result<()> {
    let buffer = opts.max_concurrent.max(1);
    let (path_tx, path_rx) = mpsc::channel::<PathBuf>(buffer);
    let (result_tx, mut result_rx) = mpsc::channel::<Result<Vec<Resource>>>(buffer);

    let stop_on_error = opts.stop_on_error;
    let roots_owned = roots.to_vec();
    let walker = tokio::task::spawn_blocking(move || {
        'roots: for root in roots_owned {
            for entry in WalkDir::new(&root).into_iter() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        if path_tx.blocking_send(entry.into_path()).is_err() {
                            break 'roots;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        if stop_on_error {
                            break 'roots;
                        }
                    }
                }
            }
        }
    });

    let path_rx = Arc::new(Mutex::new(path_rx));
    let mut workers: JoinSet<()> = JoinSet::new();
    for _ in 0..buffer {
        let path_rx = Arc::clone(&path_rx);
        let result_tx = result_tx.clone();
        let codecs = codecs.clone();
        workers.spawn(async move {
            loop {
                let path = {
                    let mut rx = path_rx.lock().await;
                    rx.recv().await
                };
                let Some(path) = path else { break };
                let outcome = parse_file(&path, &codecs);
                if result_tx.send(outcome).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    let mut seen: HashSet<(GroupVersionKind, String)> = HashSet::new();
    let mut last_error: Option<FsError> = None;

    while let Some(outcome) = result_rx.recv().await {
        match outcome {
            Ok(resources) => {
                for resource in resources {
                    if !matches_filters(&resource, filters) {
                        continue;
                    }
                    let key = (resource.gvk(), resource.name().unwrap_or_default().to_string());
                    if !seen.insert(key.clone()) {
                        info!(kind = %key.0.kind, name = %key.1, "duplicate resource dropped");
                        continue;
                    }
                    destination.add(resource);
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to decode resource file");
                if opts.stop_on_error {
                    last_error = Some(e);
                    break;
                }
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "parser worker panicked");
        }
    }
    if let Err(e) = walker.await {
        return Err(FsError::TaskPanicked(e));
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn parse_file(path: &Path, codecs: &CodecRegistry) -> Result<Vec<Resource>> {
    let bytes = std::fs::read(path).map_err(|source| FsError::Read { path: path.display().to_string(), source })?;
    let codec = codecs.for_path(path).map_err(|source| FsError::Parse { path: path.display().to_string(), source })?;
    let mut resources = codec.decode_all(&bytes).map_err(|source| FsError::Parse { path: path.display().to_string(), source })?;
    for resource in &mut resources {
        resource.set_source(codec.name(), &path.display().to_string());
    }
    Ok(resources)
}

fn matches_filters(resource: &Resource, filters: &Filters) -> bool {
    if filters.is_empty() {
        return true;
    }
    let gvk = resource.gvk();
    filters.iter().any(|filter| {
        if !filter.descriptor.matches(&gvk) {
            return false;
        }
        match filter.kind {
            SelectorKind::All => true,
            SelectorKind::Single | SelectorKind::Multiple => {
                resource.name().map(|n| filter.uids.iter().any(|u| u == n)).unwrap_or(false)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_dashboard(dir: &Path, name: &str) {
        let path = dir.join(format!("{name}.yaml"));
        std::fs::write(
            path,
            format!("apiVersion: dashboard.grafana.app/v1alpha1\nkind: Dashboard\nmetadata:\n  name: {name}\n"),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn reads_every_file_under_root() {
        let dir = tempdir().unwrap();
        write_dashboard(dir.path(), "foo");
        write_dashboard(dir.path(), "bar");

        let destination = ResourceSet::new();
        read_tree(
            &[dir.path().to_path_buf()],
            &CodecRegistry::with_defaults(),
            &Filters::default(),
            &destination,
            &ReadOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(destination.len(), 2);
    }

    #[tokio::test]
    async fn deduplicates_same_gvk_and_name() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        write_dashboard(dir.path(), "foo");
        write_dashboard(&dir.path().join("nested"), "foo");

        let destination = ResourceSet::new();
        read_tree(
            &[dir.path().to_path_buf()],
            &CodecRegistry::with_defaults(),
            &Filters::default(),
            &destination,
            &ReadOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(destination.len(), 1);
    }

    #[tokio::test]
    async fn unrecognised_extension_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        write_dashboard(dir.path(), "foo");
        std::fs::write(dir.path().join("README.md"), "not a resource").unwrap();

        let destination = ResourceSet::new();
        let result = read_tree(
            &[dir.path().to_path_buf()],
            &CodecRegistry::with_defaults(),
            &Filters::default(),
            &destination,
            &ReadOptions::default(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(destination.len(), 1);
    }
}
