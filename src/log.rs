//! Action log.
//!
//! Every move, rename, unpack, delete and error of a run is appended to a log
//! file in the sorted root, one line per event:
//!
//! ```text
//! 19.10.2026 14:03:11 | Move: /data/a.txt -> /data/documents/a.txt
//! ```
//!
//! The file handle is shared by all workers and guarded by a mutex so lines
//! never interleave. Appending is best effort: a failed write is counted but
//! never aborts the operation that produced it.

use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;

/// Kind of event recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Move,
    Rename,
    Unpacked,
    Delete,
    Error,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Move => "Move",
            ActionKind::Rename => "Rename",
            ActionKind::Unpacked => "Unpacked",
            ActionKind::Delete => "Delete",
            ActionKind::Error => "Error",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the action log.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub kind: ActionKind,
    pub message: String,
}

impl LogRecord {
    pub fn new(kind: ActionKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}: {}",
            self.timestamp.format("%d.%m.%Y %H:%M:%S"),
            self.kind,
            self.message
        )
    }
}

/// Append-only log shared across workers.
#[derive(Debug)]
pub struct ActionLog {
    path: PathBuf,
    file: Mutex<File>,
    failed_writes: AtomicUsize,
}

impl ActionLog {
    /// Opens (or creates) the log file at `path` in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            failed_writes: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record. Never fails; see [`ActionLog::failed_writes`].
    pub fn log(&self, kind: ActionKind, message: impl Into<String>) {
        let record = LogRecord::new(kind, message);
        let line = format!("{}\n", record);

        let written = match self.file.lock() {
            Ok(mut file) => file.write_all(line.as_bytes()).is_ok(),
            Err(_) => false,
        };

        if !written {
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of records that could not be written.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_format() {
        let record = LogRecord {
            timestamp: Local::now(),
            kind: ActionKind::Move,
            message: "a -> b".to_string(),
        };
        let line = record.to_string();

        // "DD.MM.YYYY HH:MM:SS" is 19 characters
        assert_eq!(&line[19..], " | Move: a -> b");
        assert_eq!(&line[2..3], ".");
        assert_eq!(&line[5..6], ".");
        assert_eq!(&line[10..11], " ");
    }

    #[test]
    fn test_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        std::fs::write(&path, "existing line\n").unwrap();

        let log = ActionLog::open(&path).unwrap();
        log.log(ActionKind::Delete, "Empty folder x removed");
        log.log(ActionKind::Error, "boom");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");
        assert!(lines[1].ends_with("| Delete: Empty folder x removed"));
        assert!(lines[2].ends_with("| Error: boom"));
        assert_eq!(log.failed_writes(), 0);
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        let log = Arc::new(ActionLog::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.log(ActionKind::Move, format!("thread {} entry {}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.contains(" | Move: thread ")));
    }
}
