//! # dirsort - Directory Sorting Tool
//!
//! dirsort cleans up a directory tree in place. Every file below the chosen
//! root is moved into a category folder directly under the root, renamed to
//! a normalized ASCII name, archives are unpacked and folders left empty are
//! removed.
//!
//! ## Features
//!
//! - **Categorization**: images, documents, audio, video, archives, python
//!   sources and everything else, driven by a configurable extension table
//! - **Name normalization**: Cyrillic names are transliterated to Latin and
//!   symbols replaced by underscores
//! - **Parallel processing**: files and subdirectories are handled on a
//!   bounded worker pool
//! - **Archive unpacking**: zip, tar and gzip archives are extracted in place
//! - **Action log**: every move, rename, unpack, delete and error is appended
//!   to `logs.txt` in the sorted root
//!
//! ## Command Line Usage
//!
//! ```bash
//! # Sort a directory, answering the final question interactively
//! dirsort --source ~/Downloads
//!
//! # Sort and create every category folder even if it stays empty
//! dirsort -s ~/Downloads --create-empty y
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use dirsort::config::Config;
//! use dirsort::context::SortContext;
//! use dirsort::organize::sort_tree;
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let config = Config::load()?;
//!     let ctx = Arc::new(SortContext::new(Path::new("/home/me/Downloads"), &config)?);
//!
//!     let (stats, _) = sort_tree(ctx, config.workers.effective_workers(), |path| {
//!         println!("Sorted: {}", path.display());
//!     })
//!     .await?;
//!
//!     println!("Moved {} files", stats.moved);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! dirsort reads `~/.config/dirsort/config.toml`, created with defaults on
//! first run. It holds the extension list of every category, the worker
//! count, the log file name and the color theme.
//!
//! ## Module Organization
//!
//! - [`archive`]: Archive unpacking
//! - [`categories`]: Categories and extension lookup
//! - [`cleanup`]: Empty folder removal and bucket creation
//! - [`cli`]: Command-line argument parsing
//! - [`config`]: Configuration management
//! - [`context`]: Shared state of a run
//! - [`error`]: Error types
//! - [`fsops`]: Concurrency-safe filesystem primitives
//! - [`log`]: Action log
//! - [`normalize`]: File name normalization
//! - [`organize`]: The run pipeline
//! - [`relocate`]: Moving and renaming single files
//! - [`tui`]: Terminal user interface components
//! - [`walker`]: Concurrent tree walking

pub mod archive;
pub mod categories;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fsops;
pub mod log;
pub mod normalize;
pub mod organize;
pub mod relocate;
pub mod tui;
pub mod walker;

// Re-export commonly used types
pub use config::Config;
pub use context::{SortContext, SortStats};
pub use error::SortError;
