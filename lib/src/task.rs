use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::mode::BuildMode;

/// Everything a step may read during one invocation. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Ctx<'a> {
    pub root: &'a Path,
    pub config: &'a Config,
    pub mode: BuildMode,
}

impl<'a> Ctx<'a> {
    pub fn new(root: &'a Path, config: &'a Config, mode: BuildMode) -> Self {
        Ctx { root, config, mode }
    }

    /// Resolves a project-relative path against the project root.
    pub fn path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }
}

pub trait Task: Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &Ctx<'_>) -> Result<()>;
}

/// Runs `task`, logging when it starts and how long it took.
pub fn run(task: &dyn Task, ctx: &Ctx<'_>) -> Result<()> {
    let start = Instant::now();
    tracing::info!("starting '{}'", task.name());
    let result = task.run(ctx);
    let elapsed = start.elapsed().as_millis();
    match &result {
        Ok(()) => tracing::info!("finished '{}' after {elapsed}ms", task.name()),
        Err(_) => tracing::error!("'{}' errored after {elapsed}ms", task.name()),
    }

    result
}

/// Runs `tasks` one after another. A task starts only once the previous one
/// has finished; the first failure stops the sequence.
pub fn series(tasks: &[&dyn Task], ctx: &Ctx<'_>) -> Result<()> {
    tasks.iter().try_for_each(|task| run(*task, ctx))
}

/// Runs `tasks` concurrently. Completion order is unspecified. Every task runs
/// to completion even if a sibling fails; all failures are reported together.
pub fn parallel(tasks: &[&dyn Task], ctx: &Ctx<'_>) -> Result<()> {
    tasks.par_iter()
        .map(|task| run(*task, ctx))
        .collect::<Vec<_>>()
        .into_iter()
        .fold(Ok(()), join)
}

/// Combines the outcomes of two independent branches.
pub fn join(a: Result<()>, b: Result<()>) -> Result<()> {
    match (a, b) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e1), Err(e2)) => Err(e1.chain(e2)),
    }
}

/// A task assembled from a name and a closure.
pub struct FnTask<F> {
    name: &'static str,
    f: F,
}

impl<F: Fn(&Ctx<'_>) -> Result<()> + Sync> FnTask<F> {
    pub fn new(name: &'static str, f: F) -> Self {
        FnTask { name, f }
    }
}

impl<F: Fn(&Ctx<'_>) -> Result<()> + Sync> Task for FnTask<F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        (self.f)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use parking_lot::Mutex;

    use super::*;

    fn ctx_parts() -> (PathBuf, Config) {
        (PathBuf::from("."), Config::default())
    }

    #[test]
    fn series_is_ordered_and_short_circuits() {
        let (root, config) = ctx_parts();
        let ctx = Ctx::new(&root, &config, BuildMode::Development);
        let log = Mutex::new(vec![]);

        let a = FnTask::new("a", |_| { log.lock().push("a"); Ok(()) });
        let b = FnTask::new("b", |_| { log.lock().push("b"); err!("b failed") });
        let c = FnTask::new("c", |_| { log.lock().push("c"); Ok(()) });

        assert!(series(&[&a, &b, &c], &ctx).is_err());
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn parallel_runs_everything_and_reports_all_failures() {
        let (root, config) = ctx_parts();
        let ctx = Ctx::new(&root, &config, BuildMode::Production);
        let count = AtomicUsize::new(0);

        let ok = FnTask::new("ok", |_| { count.fetch_add(1, Ordering::SeqCst); Ok(()) });
        let bad1 = FnTask::new("bad1", |_| { count.fetch_add(1, Ordering::SeqCst); err!("first") });
        let bad2 = FnTask::new("bad2", |_| { count.fetch_add(1, Ordering::SeqCst); err!("second") });

        let error = parallel(&[&bad1, &ok, &bad2], &ctx).unwrap_err().to_string();
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(error.contains("first"));
        assert!(error.contains("second"));
    }

    #[test]
    fn ctx_threads_mode() {
        let (root, config) = ctx_parts();
        let ctx = Ctx::new(&root, &config, BuildMode::Production);
        let seen = FnTask::new("mode", |ctx| match ctx.mode.is_production() {
            true => Ok(()),
            false => err!("expected production"),
        });

        assert!(run(&seen, &ctx).is_ok());
    }
}
