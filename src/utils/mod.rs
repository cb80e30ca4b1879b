pub mod table {
    fn width(cell: &str) -> usize {
        cell.chars().count()
    }

    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    fn line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (cell, &w) in cells.iter().zip(widths) {
            let cell = cell.as_ref();
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(w.saturating_sub(width(cell))));
            s.push_str(" |");
        }
        s
    }

    /// Render an ASCII table; missing cells render empty, extra cells are dropped.
    #[must_use]
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate() {
                *w = (*w).max(row.get(c).map_or(0, |s| width(s)));
            }
        }

        let rule = sep(&widths);
        let mut out = String::new();
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&line(headers, &widths));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in rows {
            let cells: Vec<&str> =
                (0..cols).map(|i| row.get(i).map_or("", String::as_str)).collect();
            out.push_str(&line(&cells, &widths));
            out.push('\n');
        }
        out.push_str(&rule);
        out
    }
}

pub mod config {
    use crate::errors::SmasherError;
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const CONFIG_FILE_NAME: &str = "include-smasher.toml";

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    pub struct ScanConfig {
        pub include_paths: Option<Vec<PathBuf>>,
        pub exclude: Option<String>,
        pub respect_ignore: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    pub struct ReportConfig {
        pub headers: Option<bool>,
        pub system: Option<bool>,
        pub header_width: Option<usize>,
        pub default_format: Option<String>, // "text" | "json"
        pub filename: Option<String>,
        pub save_path: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    pub struct Config {
        pub scan: Option<ScanConfig>,
        pub report: Option<ReportConfig>,
    }

    /// Parse a config file.
    ///
    /// # Errors
    /// Returns `SmasherError::Io` if the file cannot be read and `SmasherError::Config`
    /// if it is not valid TOML for this schema.
    pub fn try_load_config_at(path: &Path) -> Result<Config, SmasherError> {
        let data = fs::read_to_string(path)?;
        toml::from_str::<Config>(&data)
            .map_err(|e| SmasherError::Config { file: path.to_path_buf(), message: e.to_string() })
    }

    /// Parse a config file, logging and discarding any failure.
    #[must_use]
    pub fn load_config_at(path: &Path) -> Option<Config> {
        match try_load_config_at(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("ignoring config: {e}");
                None
            }
        }
    }

    /// Load `include-smasher.toml` from `root` when present.
    #[must_use]
    pub fn load_config_near(root: &Path) -> Option<Config> {
        let p = root.join(CONFIG_FILE_NAME);
        if p.is_file() {
            load_config_at(&p)
        } else {
            None
        }
    }
}

pub mod cache {
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    /// Fingerprint of a file's content; an entry is reused only when it matches exactly.
    #[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
    pub struct CacheEntryMeta {
        pub len: u64,
        pub hash: String,
    }

    impl CacheEntryMeta {
        #[must_use]
        pub fn from_content(bytes: &[u8]) -> Self {
            Self { len: bytes.len() as u64, hash: blake3::hash(bytes).to_hex().to_string() }
        }

        /// Fingerprint the file at `path`; `None` if it cannot be read.
        #[must_use]
        pub fn of(path: &Path) -> Option<Self> {
            std::fs::read(path).ok().map(|bytes| Self::from_content(&bytes))
        }
    }

    /// Raw include arguments of one file, as extracted.
    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct CacheEntry {
        pub meta: CacheEntryMeta,
        pub includes: Vec<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct Cache {
        pub entries: HashMap<PathBuf, CacheEntry>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CacheMode {
        Use,
        Ignore,
        Rebuild,
    }

    impl CacheMode {
        /// The cache is opt-in: without `cache` or `rebuild` nothing is read or written.
        #[must_use]
        pub fn from_flags(cache: bool, rebuild: bool) -> Self {
            if rebuild {
                Self::Rebuild
            } else if cache {
                Self::Use
            } else {
                Self::Ignore
            }
        }
    }

    #[must_use]
    pub fn cache_path(root: &Path) -> PathBuf {
        root.join(".include_smasher_cache.json")
    }

    #[must_use]
    pub fn load_cache(root: &Path) -> Option<Cache> {
        let data = std::fs::read_to_string(cache_path(root)).ok()?;
        serde_json::from_str::<Cache>(&data).ok()
    }

    pub fn save_cache(root: &Path, cache: &Cache) {
        let path = cache_path(root);
        match serde_json::to_string(cache) {
            Ok(data) => {
                if let Err(e) = std::fs::write(&path, data) {
                    tracing::debug!(path = %path.display(), error = %e, "cache not saved");
                }
            }
            Err(e) => tracing::debug!(error = %e, "cache not serialized"),
        }
    }

    pub fn clear_cache(root: &Path) {
        let path = cache_path(root);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "cache not cleared"),
        }
    }
}

pub mod file_walker {
    use std::ffi::OsStr;
    use std::path::{Path, PathBuf};

    pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];
    pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];
    pub const TRANSLATION_UNIT_EXTENSIONS: &[&str] = &["c", "cpp"];

    /// Case-sensitive extension check.
    #[must_use]
    pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension().and_then(OsStr::to_str).is_some_and(|ext| extensions.contains(&ext))
    }

    /// Discover files under `root` with one of `extensions`, sorted by name per directory.
    ///
    /// Symlinks to files are listed under the link's own path; symlinked directories are
    /// not descended into.
    ///
    /// With `respect_ignore`, `.gitignore`/`.ignore` rules apply (global git excludes stay off).
    #[must_use]
    pub fn source_files(root: &Path, extensions: &[&str], respect_ignore: bool) -> Vec<PathBuf> {
        if respect_ignore {
            walk_with_ignore(root, extensions)
        } else {
            walk_all(root, extensions)
        }
    }

    fn walk_all(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let walker = walkdir::WalkDir::new(root).follow_links(false).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "walk entry skipped");
                    continue;
                }
            };
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file && has_extension(entry.path(), extensions) {
                out.push(entry.into_path());
            }
        }
        out
    }

    fn walk_with_ignore(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut walker = ignore::WalkBuilder::new(root);
        walker
            .follow_links(false)
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(false)
            .ignore(true)
            .parents(true)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        for entry in walker.build().flatten() {
            let is_file = entry.file_type().is_some_and(|t| t.is_file())
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file && has_extension(entry.path(), extensions) {
                out.push(entry.into_path());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::cache::CacheMode;
    use super::file_walker::{has_extension, HEADER_EXTENSIONS, SOURCE_EXTENSIONS};
    use std::path::Path;

    #[test]
    fn extension_match_is_exact_and_case_sensitive() {
        assert!(has_extension(Path::new("a/b.hpp"), HEADER_EXTENSIONS));
        assert!(!has_extension(Path::new("a/b.H"), HEADER_EXTENSIONS));
        assert!(!has_extension(Path::new("a/b.hh"), SOURCE_EXTENSIONS));
        assert!(!has_extension(Path::new("Makefile"), SOURCE_EXTENSIONS));
    }

    #[test]
    fn cache_mode_flags() {
        assert_eq!(CacheMode::from_flags(false, false), CacheMode::Ignore);
        assert_eq!(CacheMode::from_flags(true, false), CacheMode::Use);
        assert_eq!(CacheMode::from_flags(true, true), CacheMode::Rebuild);
        assert_eq!(CacheMode::from_flags(false, true), CacheMode::Rebuild);
    }

    #[test]
    fn clear_cache_tolerates_missing_and_unremovable_files() {
        let dir = tempfile::tempdir().unwrap();
        super::cache::clear_cache(dir.path());

        // a directory in the cache file's place cannot be removed as a file
        let path = super::cache::cache_path(dir.path());
        std::fs::create_dir(&path).unwrap();
        super::cache::clear_cache(dir.path());
        assert!(path.is_dir());

        std::fs::remove_dir(&path).unwrap();
        std::fs::write(&path, "{}").unwrap();
        super::cache::clear_cache(dir.path());
        assert!(!path.exists());
    }

    #[test]
    fn table_pads_short_rows() {
        let out = super::table::render(&["#", "Header"], &[vec!["1".into()]]);
        assert!(out.contains("| 1 |        |"));
    }
}
