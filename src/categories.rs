//! File categorization and extension mapping.
//!
//! Every file lands in exactly one [`Category`]. The extension table is built
//! once from the [`CategoryConfig`](crate::config::CategoryConfig) section of
//! the configuration; [`Category::Other`] owns no extensions and catches
//! everything the table does not.

use std::fmt;
use std::path::Path;

use crate::config::CategoryConfig;

/// A category bucket. Each bucket is a directory directly under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Images,
    Documents,
    Audio,
    Video,
    Archives,
    SourceCode,
    Other,
}

impl Category {
    /// All categories, in classification order.
    pub const ALL: [Category; 7] = [
        Category::Images,
        Category::Documents,
        Category::Audio,
        Category::Video,
        Category::Archives,
        Category::SourceCode,
        Category::Other,
    ];

    /// Name of the bucket directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Documents => "documents",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archives => "archives",
            Category::SourceCode => "python",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table from extension to category.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<(Category, Vec<String>)>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::from_config(&CategoryConfig::default())
    }
}

impl CategoryTable {
    /// Builds the table, lowercasing extensions and adding a missing leading dot.
    pub fn from_config(config: &CategoryConfig) -> Self {
        let normalize = |exts: &[String]| -> Vec<String> {
            exts.iter()
                .map(|e| dotted(&e.to_lowercase()))
                .filter(|e| e.len() > 1)
                .collect()
        };

        let entries = vec![
            (Category::Images, normalize(&config.images)),
            (Category::Documents, normalize(&config.documents)),
            (Category::Audio, normalize(&config.audio)),
            (Category::Video, normalize(&config.video)),
            (Category::Archives, normalize(&config.archives)),
            (Category::SourceCode, normalize(&config.source_code)),
        ];

        Self { entries }
    }

    /// Determines the category for an extension.
    ///
    /// Matching is case-insensitive and accepts the extension with or without
    /// the leading dot. The first category listing the extension wins; unknown
    /// and empty extensions map to [`Category::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::categories::{Category, CategoryTable};
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.classify(".PDF"), Category::Documents);
    /// assert_eq!(table.classify("py"), Category::SourceCode);
    /// assert_eq!(table.classify(""), Category::Other);
    /// ```
    pub fn classify(&self, extension: &str) -> Category {
        let ext = dotted(&extension.to_lowercase());

        self.entries
            .iter()
            .find(|(_, exts)| exts.iter().any(|e| *e == ext))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }
}

fn dotted(ext: &str) -> String {
    if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Extracts the file extension from a path.
///
/// Returns the extension in lowercase with a leading dot, or an empty string
/// if the path has none.
///
/// ```
/// use std::path::Path;
/// use dirsort::categories::get_extension;
///
/// assert_eq!(get_extension(Path::new("/home/user/a.ZIP")), ".zip");
/// assert_eq!(get_extension(Path::new("/home/user/README")), "");
/// ```
pub fn get_extension(path: &Path) -> String {
    path.extension()
        .map(|s| format!(".{}", s.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Extracts the file stem (the name without its last extension).
pub fn get_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
