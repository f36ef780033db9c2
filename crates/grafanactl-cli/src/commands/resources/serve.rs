//! `grafanactl resources serve` — a local HTTP preview of an on-disk
//! resource tree, reloading over SSE when a watched path changes.
//!
//! This does not talk to a Grafana server at all: it is a filesystem-only
//! preview, useful while editing resources before `push`ing them.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::Stream;
use grafanactl_codec::CodecRegistry;
use grafanactl_resource::{Resource, ResourceSet};
use grafanactl_selector::Filters;
use grafanactl_fs::{read_tree, ReadOptions};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tracing::{info, warn};

use crate::error::CliError;
use crate::exit_codes;

struct AppState {
    root: PathBuf,
    resources: ResourceSet,
    reload: broadcast::Sender<()>,
}

pub async fn run(
    path: &PathBuf,
    address: &str,
    port: u16,
    watch: &[PathBuf],
    script: Option<&str>,
) -> Result<i32, CliError> {
    let (reload_tx, _) = broadcast::channel(16);
    let state = Arc::new(AppState { root: path.clone(), resources: ResourceSet::new(), reload: reload_tx.clone() });

    reload(&state).await?;

    let watched: Vec<PathBuf> = if watch.is_empty() { vec![path.clone()] } else { watch.to_vec() };
    spawn_watcher(watched, Arc::clone(&state), script.map(str::to_string))?;

    let app = Router::new()
        .route("/", get(index))
        .route("/api/resources", get(api_resources))
        .route("/events", get(events))
        .with_state(Arc::clone(&state));

    let addr: SocketAddr = format!("{address}:{port}").parse().map_err(|e| CliError::usage(format!("invalid address: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| CliError::Other(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "serving resource preview");

    axum::serve(listener, app).await.map_err(|e| CliError::Other(format!("server error: {e}")))?;

    Ok(exit_codes::SUCCESS)
}

async fn reload(state: &AppState) -> Result<(), CliError> {
    let codecs = CodecRegistry::with_defaults();
    let fresh = ResourceSet::new();
    read_tree(std::slice::from_ref(&state.root), &codecs, &Filters::default(), &fresh, &ReadOptions::default())
        .await
        .map_err(CliError::from)?;

    // Resources are merged rather than replaced: edits and additions are
    // picked up immediately, a deleted file's resource lingers until the
    // process restarts.
    state.resources.merge(&fresh);
    Ok(())
}

fn spawn_watcher(paths: Vec<PathBuf>, state: Arc<AppState>, script: Option<String>) -> Result<(), CliError> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(16);

    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if event.is_ok() {
            let _ = tx.blocking_send(());
        }
    })
    .map_err(|e| CliError::Other(format!("failed to start file watcher: {e}")))?;

    for path in &paths {
        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| CliError::Other(format!("failed to watch {}: {e}", path.display())))?;
    }

    tokio::spawn(async move {
        // Keeps the watcher alive for the lifetime of the task.
        let _watcher = watcher;
        while rx.recv().await.is_some() {
            if let Err(e) = reload(&state).await {
                warn!(error = ?e.detail().summary, "reload after file change failed");
                continue;
            }
            if let Some(script) = &script {
                run_script(script);
            }
            let _ = state.reload.send(());
        }
    });

    Ok(())
}

fn run_script(script: &str) {
    match Command::new("sh").arg("-c").arg(script).status() {
        Ok(status) if !status.success() => warn!(%script, ?status, "post-reload script exited non-zero"),
        Err(e) => warn!(%script, error = %e, "failed to run post-reload script"),
        _ => {}
    }
}

async fn index() -> impl IntoResponse {
    Html(include_str!("serve_index.html"))
}

async fn api_resources(State(state): State<Arc<AppState>>) -> Json<Vec<Resource>> {
    Json(state.resources.as_list())
}

async fn events(State(state): State<Arc<AppState>>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.reload.subscribe()).filter_map(|result| {
        result.ok().map(|_| Ok(Event::default().event("reload").data("reload")))
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
