//! Watch mode, rebuilds the site whenever a watched path changes

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::Duration,
};

use miette::{miette, IntoDiagnostic, Result};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use tokio::sync::mpsc;

use crate::{config::DECLARATION_FILE, Site};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Clone, Debug)]
pub struct WatchOptions {
    /// time to wait for more changes before rebuilding
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Builds the site and rebuilds it after every batch of changes.
/// Failed builds are logged and watching continues. Runs until the watcher goes away.
pub async fn watch_and_rebuild(mut site: Site, options: WatchOptions) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<DebounceEventResult>(16);
    let mut debouncer = new_debouncer(options.debounce, move |res: DebounceEventResult| {
        if tx.blocking_send(res).is_err() {
            tracing::trace!("watch channel closed");
        }
    })
    .into_diagnostic()?;
    let mut watched = BTreeSet::new();

    debouncer
        .watcher()
        .watch(site.root(), RecursiveMode::NonRecursive)
        .into_diagnostic()?;
    for path in watch_paths(&site) {
        watch_path(debouncer.watcher(), &path, &mut watched)?;
    }
    rebuild(&site).await;

    while let Some(res) = rx.recv().await {
        let events = match res {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("watch error: {e:?}");
                continue;
            }
        };
        let output_dir = site.root().join(&site.config().dirs.output);
        let changed: Vec<PathBuf> = events
            .into_iter()
            .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
            .map(|e| e.path)
            .filter(|p| is_relevant(p, site.root(), &output_dir, &watched))
            .collect();

        if changed.is_empty() {
            continue;
        }
        for path in &changed {
            tracing::info!("changed: {path:?}");
        }

        if changed.iter().any(|p| is_declaration_file(p, site.root())) {
            match site.reload().await {
                Ok(()) => {
                    for path in watch_paths(&site) {
                        if !watched.contains(&path) {
                            watch_path(debouncer.watcher(), &path, &mut watched)?;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("reloading {DECLARATION_FILE} failed: {e:?}");
                    continue;
                }
            }
        }
        rebuild(&site).await;
    }

    Err(miette!("file watcher stopped unexpectedly"))
}

/// The input directory and the declared watch targets, watched recursively.
/// Paths that don't exist can't be watched and are left out.
/// The declaration file is seen through a non-recursive watch of the project root.
pub fn watch_paths(site: &Site) -> Vec<PathBuf> {
    let config = site.config();

    std::iter::once(config.dirs.input.clone())
        .chain(config.watch_targets.iter().cloned())
        .map(|p| site.root().join(p))
        .filter(|p| p.exists())
        .collect()
}

fn watch_path(
    watcher: &mut dyn Watcher,
    path: &Path,
    watched: &mut BTreeSet<PathBuf>,
) -> Result<()> {
    watcher
        .watch(path, RecursiveMode::Recursive)
        .into_diagnostic()?;
    tracing::info!("watching {path:?}");
    watched.insert(path.to_owned());

    Ok(())
}

async fn rebuild(site: &Site) {
    match site.build().await {
        Ok(report) => tracing::info!(
            "build complete: {} pages, {} files in {:?}",
            report.pages_written,
            report.files_copied,
            report.duration
        ),
        Err(e) => tracing::error!("build failed: {e:?}"),
    }
}

/// Changes in the output dir come from our own builds.
/// Of the project root only the declaration file matters.
fn is_relevant(path: &Path, root: &Path, output_dir: &Path, watched: &BTreeSet<PathBuf>) -> bool {
    if path.starts_with(output_dir) {
        return false;
    }
    is_declaration_file(path, root) || watched.iter().any(|w| path.starts_with(w))
}

fn is_declaration_file(path: &Path, root: &Path) -> bool {
    path == root.join(DECLARATION_FILE)
}
