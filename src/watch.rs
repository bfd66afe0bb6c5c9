//! Watch mode re-runs pipelines when their sources change.
//!
//! Each source directory is watched recursively through a debouncer, so a
//! burst of saves arrives as one batch. For a batch, every affected pipeline
//! runs once and then a single reload signal is sent. Image changes only
//! trigger the reload: the img pipeline is deliberately not re-run while
//! watching, so images are only copied or optimized by full builds.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::RecursiveMode;
use notify_debouncer_full::new_debouncer;

use crate::config::Config;
use crate::error::WatchError;
use crate::runner::Runner;
use crate::task::Task;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Source directories and the pipeline each one re-runs.
const ROUTES: [(&str, Option<Task>); 5] = [
    ("html", Some(Task::Html)),
    ("js", Some(Task::Js)),
    ("scss", Some(Task::Sass)),
    ("img", None),
    ("fonts", Some(Task::Fonts)),
];

/// What a change to a single path asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Re-run the pipeline, then reload.
    Rebuild(Task),
    /// Reload only.
    Reload,
}

/// Maps a changed path to its reaction, or `None` when the path lies outside
/// every watched directory.
pub fn route(config: &Config, path: &Utf8Path) -> Option<Reaction> {
    ROUTES.iter().find_map(|(kind, task)| {
        if !path.starts_with(config.src(kind)) {
            return None;
        }

        Some(match task {
            Some(task) => Reaction::Rebuild(*task),
            None => Reaction::Reload,
        })
    })
}

/// Handles one batch of changed paths: re-runs each affected pipeline once,
/// then signals a single reload if anything relevant changed. Returns the
/// pipelines that were run.
///
/// Pipeline failures are logged and do not stop the watcher.
pub fn handle<P: AsRef<Path>>(runner: &Runner, paths: impl IntoIterator<Item = P>) -> Vec<Task> {
    let mut tasks = BTreeSet::new();
    let mut reload = false;

    for path in paths {
        let Some(path) = Utf8Path::from_path(path.as_ref()) else {
            continue;
        };

        match route(runner.config(), path) {
            Some(Reaction::Rebuild(task)) => {
                tasks.insert(task);
                reload = true;
            }
            Some(Reaction::Reload) => reload = true,
            None => {}
        }
    }

    for &task in &tasks {
        tracing::info!("change detected, re-running {task}...");

        match runner.build(task) {
            Ok(summary) => tracing::info!("{summary}"),
            Err(e) => tracing::error!("{task}: {e}"),
        }
    }

    if reload {
        runner.reloader().reload();
    }

    tasks.into_iter().collect()
}

/// Watches the source directories until the process ends.
pub fn watch(runner: &Runner) -> Result<(), WatchError> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(DEBOUNCE, None, tx)?;

    for (kind, _) in ROUTES {
        let dir: Utf8PathBuf = runner.config().src(kind);

        if !dir.is_dir() {
            tracing::warn!("{dir} does not exist, not watching it");
            continue;
        }

        tracing::info!("watching {dir}");
        debouncer.watch(&dir, RecursiveMode::Recursive)?;
    }

    loop {
        match rx.recv()? {
            Ok(events) => {
                let paths: Vec<_> = events
                    .iter()
                    .filter(|de| !de.event.kind.is_access())
                    .flat_map(|de| de.event.paths.iter())
                    .collect();

                if paths.is_empty() {
                    continue;
                }

                tracing::debug!(?paths, "events received");
                handle(runner, paths);
            }
            Err(errors) => {
                for e in errors {
                    tracing::error!("watch error: {e}");
                }
            }
        }
    }
}
