//! Rebuilding on change.
//!
//! File events are debounced, filtered down to the watched inputs, and fed to
//! a single rebuild at a time. Changes that land while a rebuild is running
//! are collapsed into exactly one follow-up rebuild.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use derive_more::Debug;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};

use crate::config::Config;
use crate::error::{Result, Chainable};
use crate::fileset::Selector;
use crate::pipeline::Pipeline;
use crate::steps::Compressor;
use crate::task::Ctx;

/// A batch of changed paths, as delivered by the debouncer.
pub type Batch = Vec<PathBuf>;

#[derive(Debug)]
pub struct Watcher {
    root: PathBuf,
    selector: Selector,
    #[debug(ignore)]
    changes: Receiver<Batch>,
    #[debug(ignore)]
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl Watcher {
    /// Starts watching every input directory of `config` under `root`.
    pub fn new(root: &Path, config: &Config) -> Result<Self> {
        let root = fs::canonicalize(root).chain_with(|| error! {
            "failed to resolve project root",
            "root" => root.display(),
        })?;

        let (tx, changes) = mpsc::channel();
        let timeout = Duration::from_millis(config.watch.debounce_ms);
        let mut debouncer = new_debouncer(timeout, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let _ = tx.send(events.into_iter().map(|e| e.path).collect());
                }
                Err(e) => tracing::warn!("watch error: {e}"),
            }
        })?;

        let selector = config.paths.watched()?;
        for base in selector.bases() {
            let dir = root.join(base);
            if !dir.is_dir() {
                tracing::debug!("not watching missing directory {}", dir.display());
                continue;
            }

            debouncer.watcher().watch(&dir, RecursiveMode::Recursive).chain_with(|| error! {
                "failed to watch directory",
                "directory" => dir.display(),
            })?;

            tracing::debug!("watching {}", dir.display());
        }

        Ok(Watcher { root, selector, changes, _debouncer: debouncer })
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root).map_or(false, |p| self.selector.matches(p))
    }

    /// Calls `rebuild` for every relevant batch of changes until the watcher
    /// stops delivering events.
    pub fn run<F: FnMut()>(&self, rebuild: F) {
        coalesce(&self.changes, |path| self.is_relevant(path), rebuild)
    }
}

/// The watch state machine. Waits for a batch containing a relevant path,
/// rebuilds, then drains whatever arrived meanwhile. If anything relevant
/// did, it rebuilds exactly once more and drains again. Returns when the
/// channel closes.
pub fn coalesce<R, F>(changes: &Receiver<Batch>, is_relevant: R, mut rebuild: F)
    where R: Fn(&Path) -> bool, F: FnMut()
{
    let relevant = |batch: &Batch| batch.iter().any(|path| is_relevant(path.as_path()));
    while let Ok(batch) = changes.recv() {
        if !relevant(&batch) {
            continue;
        }

        for path in batch.iter().filter(|p| is_relevant(p.as_path())) {
            tracing::info!("changed: {}", path.display());
        }

        loop {
            rebuild();
            let pending = changes.try_iter().fold(false, |any, batch| relevant(&batch) || any);
            if !pending {
                break;
            }

            tracing::debug!("changes arrived during rebuild; rebuilding once more");
        }
    }
}

/// Rebuilds with `pipeline` on every change and calls `reload` after each
/// successful rebuild. Failures are logged; watching continues.
pub fn watch<C, F>(pipeline: &Pipeline<C>, ctx: &Ctx<'_>, mut reload: F) -> Result<()>
    where C: Compressor, F: FnMut()
{
    let watcher = Watcher::new(ctx.root, ctx.config)?;
    tracing::info!("watching for changes");
    watcher.run(|| match pipeline.rebuild(ctx) {
        Ok(()) => reload(),
        Err(e) => tracing::error!("rebuild failed:\n{e}"),
    });

    Ok(())
}
