//! Per-file relocation.
//!
//! A file is classified, moved into its bucket under its original name, and
//! then renamed to its normalized name. Each step is logged; every failure
//! path writes exactly one `Error` record and stops processing that file.
//! A file that already sits in its bucket under its normalized name is left
//! alone and produces no record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::categories::{Category, get_extension, get_stem};
use crate::context::SortContext;
use crate::error::SortError;
use crate::fsops::move_path;
use crate::log::ActionKind;
use crate::normalize::normalize;

/// A file discovered by the walker, with its derived name parts.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Lowercased extension with a leading dot, empty when absent
    pub extension: String,
    pub stem: String,
}

impl FileEntry {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            extension: get_extension(path),
            stem: get_stem(path),
        }
    }

    /// The normalized file name: normalized stem plus lowercased extension.
    pub fn normalized_name(&self) -> String {
        format!("{}{}", normalize(&self.stem), self.extension)
    }
}

/// How relocating one file ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Not a regular file; nothing was done or logged.
    Skipped,
    /// Already in its bucket under its normalized name; nothing was logged.
    Unchanged { category: Category, dest: PathBuf },
    /// Moved into its bucket and renamed.
    Relocated { category: Category, dest: PathBuf },
    /// Already in its bucket; only the name was normalized.
    Renamed { category: Category, dest: PathBuf },
    /// Moved into its bucket, but the rename failed. The file stays at `dest`.
    Unrenamed { category: Category, dest: PathBuf },
    /// Nothing moved; an error was logged.
    Failed,
}

/// Relocates one file into its bucket under `ctx.root()`.
///
/// Never returns an error: failures are written to the action log and
/// reported as [`RelocationOutcome::Failed`] or [`RelocationOutcome::Unrenamed`].
pub fn relocate(ctx: &SortContext, path: &Path) -> RelocationOutcome {
    let outcome = relocate_inner(ctx, path);

    let mut stats = ctx.stats();
    match &outcome {
        RelocationOutcome::Skipped => stats.skipped += 1,
        RelocationOutcome::Unchanged { .. } => stats.unchanged += 1,
        RelocationOutcome::Renamed { .. } => stats.renamed += 1,
        RelocationOutcome::Relocated { .. } => {
            stats.moved += 1;
            stats.renamed += 1;
        }
        RelocationOutcome::Unrenamed { .. } => {
            stats.moved += 1;
            stats.failed += 1;
        }
        RelocationOutcome::Failed => stats.failed += 1,
    }

    outcome
}

fn relocate_inner(ctx: &SortContext, path: &Path) -> RelocationOutcome {
    let file = FileEntry::new(path);
    let category = ctx.table.classify(&file.extension);
    let dest_dir = ctx.root().join(category.as_str());
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match fs::metadata(path) {
        Ok(metadata) if !metadata.is_file() => return RelocationOutcome::Skipped,
        Ok(_) => {}
        Err(e) => {
            let err = SortError::from_move(path.to_path_buf(), dest_dir.join(&file_name), e);
            ctx.log_error(err.to_string());
            return RelocationOutcome::Failed;
        }
    }

    if let Err(e) = ctx.dirs.ensure_exists(&dest_dir) {
        ctx.log_error(e.to_string());
        return RelocationOutcome::Failed;
    }

    // Step 1: move into the bucket under the original name.
    let placed = ctx.claims.claim(&dest_dir, &file_name, path);
    let moved = placed.as_path() != path;
    if moved {
        if let Err(e) = move_path(path, &placed) {
            let err = SortError::from_move(path.to_path_buf(), placed, e);
            ctx.log_error(err.to_string());
            return RelocationOutcome::Failed;
        }
        ctx.log.log(
            ActionKind::Move,
            format!("{} -> {}", path.display(), placed.display()),
        );
    }

    // Step 2: rename to the normalized name. A failure leaves the file in its
    // bucket under the original name.
    let placed_entry = FileEntry::new(&placed);
    let target = ctx
        .claims
        .claim(&dest_dir, &placed_entry.normalized_name(), &placed);
    if !moved && target == placed {
        return RelocationOutcome::Unchanged {
            category,
            dest: placed,
        };
    }

    match rename_in_place(&placed, &target) {
        Ok(()) => {
            ctx.log.log(
                ActionKind::Rename,
                format!("{} -> {}", placed.display(), target.display()),
            );
            if moved {
                RelocationOutcome::Relocated {
                    category,
                    dest: target,
                }
            } else {
                RelocationOutcome::Renamed {
                    category,
                    dest: target,
                }
            }
        }
        Err(e) => {
            let err = SortError::Rename {
                from: placed.clone(),
                to: target,
                source: e,
            };
            ctx.log_error(err.to_string());
            if moved {
                RelocationOutcome::Unrenamed {
                    category,
                    dest: placed,
                }
            } else {
                RelocationOutcome::Failed
            }
        }
    }
}

fn rename_in_place(from: &Path, to: &Path) -> io::Result<()> {
    if from == to {
        return Ok(());
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn log_lines(ctx: &SortContext) -> Vec<String> {
        fs::read_to_string(ctx.log.path())
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_file_entry() {
        let entry = FileEntry::new(Path::new("/x/Мій Звіт.PDF"));
        assert_eq!(entry.extension, ".pdf");
        assert_eq!(entry.stem, "Мій Звіт");
        assert_eq!(entry.normalized_name(), "Mij_Zvit.pdf");
    }

    #[test]
    fn test_relocate_moves_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let src = dir.path().join("Доклад.DOCX");
        fs::write(&src, b"doc").unwrap();

        let outcome = relocate(&ctx, &src);

        let expected = dir.path().join("documents").join("Doklad.docx");
        assert_eq!(
            outcome,
            RelocationOutcome::Relocated {
                category: Category::Documents,
                dest: expected.clone(),
            }
        );
        assert!(!src.exists());
        assert_eq!(fs::read(&expected).unwrap(), b"doc");

        let lines = log_lines(&ctx);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("| Move: "));
        assert!(lines[1].contains("| Rename: "));
        assert!(lines[1].ends_with("Doklad.docx"));

        let stats = ctx.snapshot();
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn test_relocate_unknown_extension_goes_to_other() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let src = dir.path().join("noext");
        fs::write(&src, b"").unwrap();

        let outcome = relocate(&ctx, &src);
        assert!(matches!(
            outcome,
            RelocationOutcome::Relocated { category: Category::Other, .. }
        ));
        assert!(dir.path().join("other").join("noext").is_file());
    }

    #[test]
    fn test_relocate_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let sub = dir.path().join("sub.txt");
        fs::create_dir(&sub).unwrap();

        assert_eq!(relocate(&ctx, &sub), RelocationOutcome::Skipped);
        assert!(sub.is_dir());
        assert!(log_lines(&ctx).is_empty());
        assert_eq!(ctx.snapshot().skipped, 1);
    }

    #[test]
    fn test_relocate_vanished_source_logs_one_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let src = dir.path().join("ghost.txt");

        assert_eq!(relocate(&ctx, &src), RelocationOutcome::Failed);

        let lines = log_lines(&ctx);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("| Error: File not found during move operation"));
        assert!(lines[0].contains("ghost.txt"));
    }

    #[test]
    fn test_relocate_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("same.txt");
        let second = dir.path().join("b").join("same.txt");
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();

        relocate(&ctx, &first);
        relocate(&ctx, &second);

        let docs = dir.path().join("documents");
        assert_eq!(fs::read(docs.join("same.txt")).unwrap(), b"first");
        assert_eq!(fs::read(docs.join("same_1.txt")).unwrap(), b"second");
    }

    #[test]
    fn test_relocate_already_sorted_file_stays() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        let src = dir.path().join("images").join("cat.png");
        fs::write(&src, b"png").unwrap();

        let outcome = relocate(&ctx, &src);
        assert_eq!(
            outcome,
            RelocationOutcome::Unchanged {
                category: Category::Images,
                dest: src.clone(),
            }
        );
        assert!(src.is_file());
        assert_eq!(fs::read_dir(dir.path().join("images")).unwrap().count(), 1);
        assert!(log_lines(&ctx).is_empty());
        assert_eq!(ctx.snapshot().unchanged, 1);
        assert_eq!(ctx.snapshot().moved, 0);
    }

    #[test]
    fn test_relocate_in_bucket_only_renames() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let docs = dir.path().join("documents");
        fs::create_dir_all(&docs).unwrap();
        let src = docs.join("Звіт.TXT");
        fs::write(&src, b"r").unwrap();

        let outcome = relocate(&ctx, &src);

        assert_eq!(
            outcome,
            RelocationOutcome::Renamed {
                category: Category::Documents,
                dest: docs.join("Zvit.txt"),
            }
        );
        let lines = log_lines(&ctx);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("| Rename: "));
        let stats = ctx.snapshot();
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.renamed, 1);
    }

    #[test]
    fn test_relocate_normalized_name_collision() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SortContext::new(dir.path(), &Config::default()).unwrap();
        let docs = dir.path().join("documents");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("my_notes.txt"), b"old").unwrap();
        let src = dir.path().join("my notes.txt");
        fs::write(&src, b"new").unwrap();

        let outcome = relocate(&ctx, &src);

        assert_eq!(
            outcome,
            RelocationOutcome::Relocated {
                category: Category::Documents,
                dest: docs.join("my_notes_1.txt"),
            }
        );
        assert_eq!(fs::read(docs.join("my_notes.txt")).unwrap(), b"old");
        assert_eq!(fs::read(docs.join("my_notes_1.txt")).unwrap(), b"new");
    }
}
