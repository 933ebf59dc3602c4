//! Configuration loading from tagprune.toml.
//!
//! Every field is optional; anything left out falls back to the layout of
//! the project the tool was first written for (`database.sql` in the project
//! root, reports under `reports/`).

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, TagpruneError, TagpruneResult};

/// File name looked up in the project root when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "tagprune.toml";

const DEFAULT_DUMP: &str = "database.sql";
const DEFAULT_REPORT_DIR: &str = "reports";

const DEFAULT_INCLUDE_ROOTS: &[&str] = &["app", "engine", "site", "setup", "resizer"];

const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "var",
    "__pycache__",
    ".idea",
];

const DEFAULT_EXCLUDE_FILES: &[&str] = &["package-lock.json", "composer.lock"];

const DEFAULT_BINARY_SUFFIXES: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tif", ".tiff", ".ico", ".mp3", ".mp4", ".avi",
    ".mov", ".zip", ".gz", ".tar", ".rar", ".7z", ".bz2", ".pdf", ".doc", ".docx", ".xls",
    ".xlsx", ".ppt", ".pptx", ".woff", ".woff2", ".ttf", ".eot", ".otf", ".svg", ".psd", ".ai",
    ".bin", ".dat", ".db", ".sqlite", ".so", ".dll", ".exe", ".class", ".jar",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Main configuration structure for tagprune.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagpruneConfig {
    /// Dump file, relative to the project root unless absolute.
    pub dump: PathBuf,
    /// Directory receiving the audit reports.
    pub report_dir: PathBuf,
    /// Source tree scanning rules.
    pub scan: ScanConfig,
}

impl Default for TagpruneConfig {
    fn default() -> Self {
        Self {
            dump: PathBuf::from(DEFAULT_DUMP),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            scan: ScanConfig::default(),
        }
    }
}

impl TagpruneConfig {
    /// Absolute location of the dump for a given project root.
    pub fn dump_path(&self, root: &Path) -> PathBuf {
        root.join(&self.dump)
    }

    /// Absolute location of the report directory for a given project root.
    pub fn report_path(&self, root: &Path) -> PathBuf {
        root.join(&self.report_dir)
    }
}

/// Which files of the source tree contribute tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Top-level directories that are scanned. Files directly in the root are always scanned.
    pub include_roots: Vec<String>,
    /// Directory names pruned wherever they appear.
    pub exclude_dirs: Vec<String>,
    /// File names skipped wherever they appear.
    pub exclude_files: Vec<String>,
    /// Extensions (with leading dot, lowercase) treated as binary.
    pub binary_suffixes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_roots: owned(DEFAULT_INCLUDE_ROOTS),
            exclude_dirs: owned(DEFAULT_EXCLUDE_DIRS),
            exclude_files: owned(DEFAULT_EXCLUDE_FILES),
            binary_suffixes: owned(DEFAULT_BINARY_SUFFIXES),
        }
    }
}

/// Parses a config file at an explicit path.
pub fn load_config_file(path: &Path) -> TagpruneResult<TagpruneConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    toml::from_str(&content)
        .map_err(|e| TagpruneError::config(path, format!("invalid {}: {}", CONFIG_FILE_NAME, e)))
}

/// Loads configuration from tagprune.toml if it exists.
pub fn load_config(root: &Path) -> TagpruneResult<Option<TagpruneConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}
