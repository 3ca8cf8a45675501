//! Configuration management for dirsort.
//!
//! This module handles loading and saving configuration from/to TOML files.
//! Configuration includes the extension table for every category, worker pool
//! sizing, the log file name and UI preferences. On first run, a default
//! configuration is automatically created.

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for dirsort.
///
/// Every section falls back to its defaults, so a config file only needs to
/// mention the values it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub categories: CategoryConfig,
    pub workers: WorkerConfig,
    pub log: LogConfig,
    pub ui: UIConfig,
}

/// Extensions for each category, checked in field order.
///
/// The `other` bucket has no entry here; it receives whatever matches none of
/// these lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub images: Vec<String>,
    pub documents: Vec<String>,
    pub audio: Vec<String>,
    pub video: Vec<String>,
    pub archives: Vec<String>,
    pub source_code: Vec<String>,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum number of files or directories processed at once. `0` picks a
    /// value from the number of available CPUs.
    pub max_workers: usize,
}

/// Action log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Name of the log file created in the sorted root.
    pub file_name: String,
}

/// User interface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Show a progress bar while files are relocated
    pub progress: bool,
    pub color: ColorConfig,
}

/// Color theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Theme name: "default", "cyan", "magenta", "yellow", "green", "red", "blue", "white"
    pub theme: String,
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            images: strings(&[".jpeg", ".png", ".jpg", ".svg"]),
            documents: strings(&[".doc", ".docx", ".txt", ".pdf", ".xlsx", ".pptx"]),
            audio: strings(&[".mp3", ".ogg", ".wav", ".amr"]),
            video: strings(&[".avi", ".mp4", ".mov", ".mkv"]),
            archives: strings(&[".zip", ".gz", ".tar", ".tgz"]),
            source_code: strings(&[".py"]),
        }
    }
}

impl WorkerConfig {
    /// Number of workers actually used for a run.
    ///
    /// Falls back to `min(32, cpus + 4)` when `max_workers` is `0`.
    pub fn effective_workers(&self) -> usize {
        if self.max_workers > 0 {
            return self.max_workers;
        }

        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cpus + 4).min(32)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_name: "logs.txt".to_string(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            progress: true,
            color: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
        }
    }
}

impl Config {
    /// Returns the configuration directory path.
    ///
    /// Typically `~/.config/dirsort` on Unix systems or `%USERPROFILE%/.config/dirsort` on Windows.
    fn get_config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| color_eyre::eyre::eyre!("Could not determine home directory"))?;

        Ok(PathBuf::from(home).join(".config").join("dirsort"))
    }

    /// Returns the default configuration file path, `~/.config/dirsort/config.toml`.
    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location, creating it if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if file I/O fails or if the TOML is malformed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::config::Config;
    ///
    /// # fn main() -> color_eyre::Result<()> {
    /// let config = Config::load()?;
    /// println!("Using {} workers", config.workers.effective_workers());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `path`, writing the defaults there first if
    /// the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            println!("INFO: Config file not found, creating default config...");
            let config = Self::default();
            config.save_to(path)?;
            println!("INFO: Default config created at: {}", path.display());
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Saves the configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}
