//! Input file discovery for directory mode.
//!
//! Walks a directory for review files, respecting the configured
//! extensions, excludes, and size limits. Hidden entries are skipped and
//! symlinks are not followed.

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (e.g., ["csv", "tsv", "txt"])
    pub extensions: Vec<String>,
    /// Names to exclude (e.g., ["target", "reports"])
    pub excludes: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: usize,
    /// Maximum number of files to return
    pub max_files: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = crate::config::ScannerConfig::default();
        Self {
            extensions: defaults.extensions,
            excludes: defaults.excludes,
            max_file_size: defaults.max_file_size,
            max_files: None,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
            max_files: Some(config.max_files),
        }
    }
}

/// A review file found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative: String,
    /// File size in bytes
    pub size: u64,
    /// Report file name without extension, unique within one scan
    pub report_stem: String,
}

/// File scanner for discovering review files.
pub struct FileScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    /// Scan for all matching files, sorted by relative path.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root.display());
        }

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(&entry) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            files.push(ScannedFile {
                path: entry.into_path(),
                relative,
                size,
                report_stem: String::new(),
            });
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        if let Some(max) = self.config.max_files {
            if files.len() > max {
                warn!("Found {} input files, processing the first {}", files.len(), max);
                files.truncate(max);
            }
        }
        assign_report_stems(&mut files);

        debug!("Scanner found {} input files", files.len());
        Ok(files)
    }

    /// Check if a regular file matches the extension and size criteria.
    fn matches(&self, entry: &DirEntry) -> bool {
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !self.config.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return false;
        }

        match entry.metadata() {
            Ok(metadata) => metadata.len() <= self.config.max_file_size as u64,
            Err(_) => false,
        }
    }

    /// Check if an entry is hidden or matches exclusion patterns.
    fn is_excluded_entry(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

/// Give every file a distinct report stem.
///
/// The stem is the relative path with separators and dots turned into `_`
/// (`store/march.csv` → `store_march_csv`). Stems that still collide get a
/// numeric suffix in scan order.
fn assign_report_stems(files: &mut [ScannedFile]) {
    let mut taken = HashSet::new();

    for file in files.iter_mut() {
        let base = file.relative.replace(['/', '\\', '.'], "_");
        let mut stem = base.clone();
        let mut n = 2;
        while !taken.insert(stem.clone()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        file.report_stem = stem;
    }
}

/// Path of the report for `file` inside `out_dir`.
pub fn report_path(out_dir: &Path, file: &ScannedFile, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", file.report_stem, extension))
}
