//! Shared filesystem primitives used by concurrent workers.
//!
//! [`DirectoryGuard`] creates bucket directories exactly once no matter how
//! many workers ask for them, [`DestinationClaims`] hands out collision-free
//! target paths, and [`move_path`] moves a file with a copy fallback for
//! cross-device renames.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, SortError};

/// Serializes directory creation across workers.
#[derive(Debug, Default)]
pub struct DirectoryGuard {
    lock: Mutex<()>,
}

impl DirectoryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `path` and its missing ancestors unless it already exists.
    ///
    /// Safe to call from many workers at once for the same path.
    pub fn ensure_exists(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if path.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(path).map_err(|source| SortError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Destination paths already promised to a worker during this run.
#[derive(Debug, Default)]
pub struct DestinationClaims {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl DestinationClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a free path in `dir` for `file_name`.
    ///
    /// If `dir/file_name` exists on disk or was claimed by another worker,
    /// `_1`, `_2`, ... is appended to the stem until a free name is found.
    /// `current` is the path the file is already at; it is always considered
    /// free so a file is never renamed away from its own name.
    pub fn claim(&self, dir: &Path, file_name: &str, current: &Path) -> PathBuf {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let wanted = dir.join(file_name);
        if wanted == current || (!wanted.exists() && !claimed.contains(&wanted)) {
            claimed.insert(wanted.clone());
            return wanted;
        }

        let (stem, extension) = split_name(file_name);
        let mut counter = 1;
        loop {
            let candidate = dir.join(format!("{}_{}{}", stem, counter, extension));
            if candidate == current || (!candidate.exists() && !claimed.contains(&candidate)) {
                claimed.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Splits `name` into stem and extension (extension keeps its dot).
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Moves a file, falling back to copy + remove across filesystems.
pub fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
