//! Post-walk directory maintenance: removing empty folders and creating
//! empty category buckets on request.

use std::fs;
use std::path::{Path, PathBuf};

use crate::categories::Category;
use crate::context::SortContext;
use crate::error::Result;
use crate::log::ActionKind;

/// Removes every immediate child directory of `root` that has no entries.
///
/// Only one level is inspected; nested empty directories are left alone.
/// Returns the removed directories.
pub fn reap_empty(ctx: &SortContext, root: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let is_empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match fs::remove_dir(&dir) {
            Ok(()) => {
                ctx.log.log(
                    ActionKind::Delete,
                    format!("Empty folder {} removed", dir.display()),
                );
                ctx.stats().removed_dirs += 1;
                removed.push(dir);
            }
            Err(e) => {
                ctx.log_error(format!("Failed to remove empty folder {}: {}", dir.display(), e));
            }
        }
    }

    Ok(removed)
}

/// Creates one directory per category under `root`. Existing ones are kept.
pub fn precreate(ctx: &SortContext, root: &Path) -> Result<()> {
    for category in Category::ALL {
        ctx.dirs.ensure_exists(&root.join(category.as_str()))?;
    }
    Ok(())
}
