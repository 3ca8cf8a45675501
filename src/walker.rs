//! Concurrent directory tree walking.
//!
//! The walk is a set of independent units: listing one directory, or
//! relocating one file. Listing a directory yields new units for its
//! children, so the amount of outstanding work grows while the walk runs.
//! All in-flight units live in one `FuturesUnordered` that acts as the wait
//! group: the walk is over once it drains. A semaphore bounds how many units
//! touch the filesystem at the same time; the blocking work itself runs on
//! tokio's blocking thread pool.
//!
//! Bucket directories directly under the root receive files while the walk
//! runs, so they are never walked as units. Their contents are snapshotted
//! while the root is listed, before any relocation has started.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;
use walkdir::WalkDir;

use crate::categories::Category;
use crate::context::SortContext;
use crate::error::{Result, SortError};
use crate::relocate::{RelocationOutcome, relocate};

/// One schedulable piece of work.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    Walk(PathBuf),
    Relocate(PathBuf),
}

/// What listing one directory produced.
#[derive(Debug, Default)]
struct Discovered {
    units: Vec<Unit>,
    errors: Vec<SortError>,
}

impl Discovered {
    fn failed(error: SortError) -> Self {
        Self {
            units: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Counts the files a walk of `path` will hand to the relocator.
///
/// Used for progress bar totals; the action log file is not counted.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use dirsort::walker::count_files;
///
/// # async fn example() {
/// let count = count_files(Path::new("/home/me/Downloads"), "logs.txt").await;
/// println!("Found {} files", count);
/// # }
/// ```
pub async fn count_files(path: &Path, log_file_name: &str) -> u64 {
    let path = path.to_path_buf();
    let log_path = path.join(log_file_name);

    let result = task::spawn_blocking(move || -> u64 {
        WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir() && e.path() != log_path)
            .count() as u64
    })
    .await;

    result.unwrap_or(0)
}

/// Walks `root` and relocates every file below it into its bucket.
///
/// `max_workers` bounds how many units run at once. `on_file` is called once
/// per relocated file with the file's original path.
///
/// Failures are isolated: a file that cannot be moved is logged and skipped,
/// a directory that cannot be read is logged and its subtree skipped. After
/// every unit has finished, the first unit failure seen is returned.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::path::Path;
/// use dirsort::{config::Config, context::SortContext, walker::walk};
///
/// # async fn example() -> dirsort::error::Result<()> {
/// let root = Path::new("/home/me/Downloads");
/// let ctx = Arc::new(SortContext::new(root, &Config::default())?);
/// walk(Arc::clone(&ctx), 8, |path| println!("{}", path.display())).await?;
/// # Ok(())
/// # }
/// ```
pub async fn walk<F>(ctx: Arc<SortContext>, max_workers: usize, on_file: F) -> Result<()>
where
    F: Fn(&Path) + Send + Sync + 'static,
{
    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let on_file = Arc::new(on_file);

    let mut in_flight: FuturesUnordered<BoxFuture<'static, Result<Discovered>>> =
        FuturesUnordered::new();
    let root = ctx.root().to_path_buf();
    in_flight.push(schedule(
        Unit::Walk(root),
        Arc::clone(&ctx),
        Arc::clone(&permits),
        Arc::clone(&on_file),
    ));

    let mut first_error = None;
    while let Some(result) = in_flight.next().await {
        let discovered = result.unwrap_or_else(Discovered::failed);
        for unit in discovered.units {
            in_flight.push(schedule(
                unit,
                Arc::clone(&ctx),
                Arc::clone(&permits),
                Arc::clone(&on_file),
            ));
        }
        if first_error.is_none() {
            first_error = discovered.errors.into_iter().next();
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn schedule<F>(
    unit: Unit,
    ctx: Arc<SortContext>,
    permits: Arc<Semaphore>,
    on_file: Arc<F>,
) -> BoxFuture<'static, Result<Discovered>>
where
    F: Fn(&Path) + Send + Sync + 'static,
{
    run_unit(unit, ctx, permits, on_file).boxed()
}

async fn run_unit<F>(
    unit: Unit,
    ctx: Arc<SortContext>,
    permits: Arc<Semaphore>,
    on_file: Arc<F>,
) -> Result<Discovered>
where
    F: Fn(&Path) + Send + Sync + 'static,
{
    // The semaphore is never closed, so acquiring cannot fail.
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| SortError::Io(io::Error::other(e)))?;

    let discovered = task::spawn_blocking(move || match unit {
        Unit::Walk(dir) => list_children(&ctx, &dir),
        Unit::Relocate(path) => {
            if relocate(&ctx, &path) != RelocationOutcome::Skipped {
                on_file(&path);
            }
            Discovered::default()
        }
    })
    .await?;

    Ok(discovered)
}

/// Lists the immediate children of `dir` as new units.
///
/// The directory is read completely before any child is scheduled. When `dir`
/// is the root, bucket directories are not scheduled for walking; every file
/// already below them is returned as a relocation unit instead.
fn list_children(ctx: &SortContext, dir: &Path) -> Discovered {
    let entries = match fs::read_dir(dir).and_then(|rd| rd.collect::<io::Result<Vec<_>>>()) {
        Ok(entries) => entries,
        Err(source) => return Discovered::failed(read_error(ctx, dir, source)),
    };

    let buckets: Vec<PathBuf> = if dir == ctx.root() {
        Category::ALL
            .iter()
            .map(|category| dir.join(category.as_str()))
            .collect()
    } else {
        Vec::new()
    };

    let log_path = ctx.log.path();
    let mut discovered = Discovered::default();
    for entry in entries {
        let path = entry.path();
        if path == log_path {
            continue;
        }

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() && buckets.contains(&path) => {
                snapshot_bucket(ctx, &path, &mut discovered);
            }
            Ok(file_type) if file_type.is_dir() => discovered.units.push(Unit::Walk(path)),
            _ => discovered.units.push(Unit::Relocate(path)),
        }
    }

    discovered
}

/// Collects every non-directory entry below `bucket` as a relocation unit.
fn snapshot_bucket(ctx: &SortContext, bucket: &Path, discovered: &mut Discovered) {
    for entry in WalkDir::new(bucket).min_depth(1) {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => {}
            Ok(entry) => discovered.units.push(Unit::Relocate(entry.into_path())),
            Err(e) => {
                let path = e.path().unwrap_or(bucket).to_path_buf();
                let message = e.to_string();
                let source = e.into_io_error().unwrap_or_else(|| io::Error::other(message));
                discovered.errors.push(read_error(ctx, &path, source));
            }
        }
    }
}

fn read_error(ctx: &SortContext, dir: &Path, source: io::Error) -> SortError {
    let err = SortError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    ctx.log_error(err.to_string());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_tree(root: &Path) {
        fs::write(root.join("top.txt"), b"t").unwrap();
        fs::create_dir_all(root.join("a").join("b")).unwrap();
        fs::write(root.join("a").join("song.mp3"), b"s").unwrap();
        fs::write(root.join("a").join("b").join("pic.PNG"), b"p").unwrap();
        fs::write(root.join("a").join("b").join("code.py"), b"c").unwrap();
    }

    #[test]
    fn test_list_children_skips_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        make_tree(dir.path());

        let mut units = list_children(&ctx, dir.path()).units;
        units.sort_by_key(|u| match u {
            Unit::Walk(p) | Unit::Relocate(p) => p.clone(),
        });

        assert_eq!(
            units,
            vec![
                Unit::Walk(dir.path().join("a")),
                Unit::Relocate(dir.path().join("top.txt")),
            ]
        );
    }

    #[test]
    fn test_list_children_missing_dir_logs_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();

        let discovered = list_children(&ctx, &dir.path().join("missing"));
        assert!(discovered.units.is_empty());
        assert_eq!(discovered.errors.len(), 1);
        assert!(matches!(discovered.errors[0], SortError::ReadDir { .. }));

        let log = fs::read_to_string(ctx.log.path()).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("| Error: Failed to read directory"));
    }

    #[test]
    fn test_root_listing_snapshots_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let ctx = SortContext::new(root, &Config::default()).unwrap();
        fs::create_dir_all(root.join("documents").join("inner")).unwrap();
        fs::write(root.join("documents").join("old.txt"), b"o").unwrap();
        fs::write(root.join("documents").join("inner").join("deep.txt"), b"d").unwrap();
        fs::create_dir(root.join("inbox")).unwrap();

        let discovered = list_children(&ctx, root);
        let mut units = discovered.units;
        units.sort_by_key(|u| match u {
            Unit::Walk(p) | Unit::Relocate(p) => p.clone(),
        });

        assert!(discovered.errors.is_empty());
        assert_eq!(
            units,
            vec![
                Unit::Relocate(root.join("documents").join("inner").join("deep.txt")),
                Unit::Relocate(root.join("documents").join("old.txt")),
                Unit::Walk(root.join("inbox")),
            ]
        );
    }

    #[test]
    fn test_nested_bucket_names_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let inbox = dir.path().join("inbox");
        fs::create_dir_all(inbox.join("documents")).unwrap();

        let units = list_children(&ctx, &inbox).units;
        assert_eq!(units, vec![Unit::Walk(inbox.join("documents"))]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_walk_with_existing_bucket_relocates_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("documents")).unwrap();
        fs::write(root.join("documents").join("old.txt"), b"old").unwrap();
        for i in 0..200 {
            fs::write(root.join(format!("my file {}.txt", i)), b"x").unwrap();
        }
        let ctx = Arc::new(SortContext::new(root, &Config::default()).unwrap());

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        walk(Arc::clone(&ctx), 8, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        let log = fs::read_to_string(ctx.log.path()).unwrap();
        assert_eq!(log.matches("| Move: ").count(), 200);
        assert_eq!(log.matches("| Rename: ").count(), 200);
        assert!(!log.contains("| Error: "));
        assert!(!log.contains("old.txt"));

        assert_eq!(seen.load(Ordering::SeqCst), 201);
        let stats = ctx.snapshot();
        assert_eq!(stats.moved, 200);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(fs::read_dir(root.join("documents")).unwrap().count(), 201);
    }

    #[tokio::test]
    async fn test_count_files() {
        let dir = tempfile::tempdir().unwrap();
        make_tree(dir.path());
        fs::write(dir.path().join("logs.txt"), b"").unwrap();

        assert_eq!(count_files(dir.path(), "logs.txt").await, 4);
    }

    #[tokio::test]
    async fn test_walk_relocates_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        make_tree(dir.path());
        let ctx = Arc::new(SortContext::new(dir.path(), &Config::default()).unwrap());

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        walk(Arc::clone(&ctx), 2, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 4);
        assert!(dir.path().join("documents").join("top.txt").is_file());
        assert!(dir.path().join("audio").join("song.mp3").is_file());
        assert!(dir.path().join("images").join("pic.png").is_file());
        assert!(dir.path().join("python").join("code.py").is_file());
        assert!(dir.path().join("a").join("b").is_dir());
        assert_eq!(fs::read_dir(dir.path().join("a").join("b")).unwrap().count(), 0);

        let stats = ctx.snapshot();
        assert_eq!(stats.moved, 4);
        assert_eq!(stats.renamed, 4);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_walk_single_worker_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mut nested = dir.path().to_path_buf();
        for depth in 0..6 {
            nested = nested.join(format!("level{}", depth));
            fs::create_dir_all(&nested).unwrap();
            fs::write(nested.join(format!("file{}.txt", depth)), b"x").unwrap();
        }
        let ctx = Arc::new(SortContext::new(dir.path(), &Config::default()).unwrap());

        walk(Arc::clone(&ctx), 1, |_| {}).await.unwrap();

        let docs: Vec<_> = fs::read_dir(dir.path().join("documents")).unwrap().collect();
        assert_eq!(docs.len(), 6);
    }
}
