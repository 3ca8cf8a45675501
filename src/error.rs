//! Error types.
//!
//! Relocation and unpack failures are caught where they happen and written to
//! the action log; the variants below carry enough context (source,
//! destination, underlying cause) to produce that log line.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("File not found during move operation: {} -> {}. Error: {source}", path.display(), dest.display())]
    SourceVanished {
        path: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("Error during file move: {} -> {}. Error: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Error during rename: {} -> {}. Error: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to unpack {}: {reason}", archive.display())]
    Unpack { archive: PathBuf, reason: String },

    #[error("Unsupported archive format: {}", archive.display())]
    UnsupportedArchive { archive: PathBuf },

    #[error("Invalid input after {attempts} attempts")]
    InvalidUserInput { attempts: usize },

    #[error("Not a directory: {}", path.display())]
    InvalidRoot { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SortError>;

impl SortError {
    /// Wraps a failed move, telling a vanished source apart from other I/O errors.
    pub fn from_move(from: PathBuf, to: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::SourceVanished {
                path: from,
                dest: to,
                source,
            }
        } else {
            Self::Move { from, to, source }
        }
    }
}
