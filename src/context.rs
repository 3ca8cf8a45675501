//! Shared state of one sorting run.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::categories::CategoryTable;
use crate::config::Config;
use crate::error::{Result, SortError};
use crate::fsops::{DestinationClaims, DirectoryGuard};
use crate::log::{ActionKind, ActionLog};

/// Statistics about a sorting run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortStats {
    pub moved: usize,
    pub renamed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unchanged: usize,
    pub unpacked: usize,
    pub unpack_failed: usize,
    pub removed_dirs: usize,
}

impl SortStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a worker needs: the root, the category table, the action log
/// and the guards around shared filesystem mutations.
///
/// Passed to every unit of work behind an `Arc`.
#[derive(Debug)]
pub struct SortContext {
    root: PathBuf,
    pub table: CategoryTable,
    pub log: ActionLog,
    pub dirs: DirectoryGuard,
    pub claims: DestinationClaims,
    stats: Mutex<SortStats>,
}

impl SortContext {
    /// Prepares a run over `root`, opening the log file inside it.
    pub fn new(root: &Path, config: &Config) -> Result<Self> {
        if !root.is_dir() {
            return Err(SortError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }

        let log = ActionLog::open(&root.join(&config.log.file_name))?;

        Ok(Self {
            root: root.to_path_buf(),
            table: CategoryTable::from_config(&config.categories),
            log,
            dirs: DirectoryGuard::new(),
            claims: DestinationClaims::new(),
            stats: Mutex::new(SortStats::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an `Error` record.
    pub fn log_error(&self, message: impl Into<String>) {
        self.log.log(ActionKind::Error, message);
    }

    pub fn stats(&self) -> MutexGuard<'_, SortStats> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current statistics.
    pub fn snapshot(&self) -> SortStats {
        self.stats().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();

        assert!(dir.path().join("logs.txt").is_file());
        assert_eq!(ctx.log.path(), dir.path().join("logs.txt"));
        assert_eq!(ctx.snapshot(), SortStats::default());
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = SortContext::new(&dir.path().join("missing"), &Config::default()).unwrap_err();
        assert!(matches!(err, SortError::InvalidRoot { .. }));
    }
}
