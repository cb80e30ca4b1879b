//! Include graph model and builder.
//!
//! `IncludeGraph` holds the header-to-header `InclusionRelation` plus the
//! translation units (`.c`/`.cpp`) found under the primary root together with
//! their direct includes. Nodes are identified by header base name.
//!
//! Build one with `IncludeGraph::build`, then expand headers with
//! `resolver::DescendantResolver` or score it with `crate::query::ScoreQuery`.
use crate::errors::SmasherError;
use crate::parser::{base_name, IncludeExtractor};
use crate::utils::cache::{self, CacheEntry, CacheEntryMeta, CacheMode};
use crate::utils::file_walker::{
    self, HEADER_EXTENSIONS, SOURCE_EXTENSIONS, TRANSLATION_UNIT_EXTENSIONS,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod resolver;

/// Header identity: the base file name of an include.
pub type HeaderName = Arc<str>;

type Extracted = (PathBuf, Vec<String>);

/// Shares one allocation per distinct header name.
#[derive(Debug, Default)]
pub struct Interner {
    pool: HashMap<Box<str>, HeaderName>,
}

impl Interner {
    pub fn intern(&mut self, s: &str) -> HeaderName {
        if let Some(a) = self.pool.get(s) {
            return a.clone();
        }
        let a: HeaderName = Arc::from(s);
        self.pool.insert(Box::from(s), a.clone());
        a
    }
}

/// Header → ordered included headers. Repeated scans of a header append.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InclusionRelation {
    edges: HashMap<HeaderName, Vec<HeaderName>>,
}

impl InclusionRelation {
    /// Append edges for `header`, never replacing earlier ones.
    pub fn append<I>(&mut self, header: HeaderName, includes: I)
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.edges.entry(header).or_default().extend(includes);
    }

    /// Direct children of `header`; unknown headers are leaves.
    #[must_use]
    pub fn children(&self, header: &str) -> &[HeaderName] {
        self.edges.get(header).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, header: &str) -> bool {
        self.edges.contains_key(header)
    }

    /// Number of headers with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn headers(&self) -> impl Iterator<Item = &HeaderName> {
        self.edges.keys()
    }
}

impl<K, V> FromIterator<(K, V)> for InclusionRelation
where
    K: AsRef<str>,
    V: IntoIterator,
    V::Item: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut interner = Interner::default();
        let mut relation = Self::default();
        for (header, includes) in iter {
            let header = interner.intern(header.as_ref());
            let includes: Vec<HeaderName> =
                includes.into_iter().map(|i| interner.intern(i.as_ref())).collect();
            relation.append(header, includes);
        }
        relation
    }
}

/// A `.c`/`.cpp` file and its direct includes, reduced to header identities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationUnit {
    pub path: PathBuf,
    pub includes: Vec<HeaderName>,
}

impl TranslationUnit {
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|s| s.to_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphMetadata {
    pub root: PathBuf,
    pub include_paths: Vec<PathBuf>,
    pub scanned_files: usize,
    pub generated_at: String,
}

/// Where and how to scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub include_paths: Vec<PathBuf>,
    pub respect_ignore: bool,
    pub cache_mode: CacheMode,
}

impl ScanOptions {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_paths: Vec::new(),
            respect_ignore: false,
            cache_mode: CacheMode::Ignore,
        }
    }

    #[must_use]
    pub fn with_include_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.include_paths = paths;
        self
    }

    #[must_use]
    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    #[must_use]
    pub fn with_respect_ignore(mut self, respect_ignore: bool) -> Self {
        self.respect_ignore = respect_ignore;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeGraph {
    pub relation: InclusionRelation,
    pub translation_units: Vec<TranslationUnit>,
    pub metadata: GraphMetadata,
}

impl IncludeGraph {
    /// Scan the primary root and every auxiliary include root.
    ///
    /// Headers under the primary root contribute edges first, then headers under each
    /// include root in the order given. A header scanned more than once keeps the
    /// concatenation of all its edge lists. Translation units are only collected from
    /// the primary root.
    ///
    /// # Errors
    /// Returns `SmasherError::InvalidRoot` when the primary root is not a directory.
    /// Unreadable files and missing include roots are not errors.
    pub fn build(opts: &ScanOptions) -> Result<Self, SmasherError> {
        let root = opts.root.as_path();
        if !root.is_dir() {
            return Err(SmasherError::InvalidRoot(opts.root.clone()));
        }

        if matches!(opts.cache_mode, CacheMode::Rebuild) {
            cache::clear_cache(root);
        }
        let mut cache_state = match opts.cache_mode {
            CacheMode::Use => cache::load_cache(root).unwrap_or_default(),
            CacheMode::Ignore | CacheMode::Rebuild => cache::Cache::default(),
        };

        let mut graph = IncludeGraph::default();
        let mut interner = Interner::default();
        let mut walked: Vec<PathBuf> = Vec::new();

        let files = file_walker::source_files(root, SOURCE_EXTENSIONS, opts.respect_ignore);
        tracing::info!(root = %root.display(), files = files.len(), "scanning primary root");
        walked.extend(files.iter().cloned());
        for (path, includes) in extract_all(files, &mut cache_state, opts.cache_mode) {
            let names: Vec<HeaderName> =
                includes.iter().map(|i| interner.intern(base_name(i))).collect();
            if file_walker::has_extension(&path, HEADER_EXTENSIONS) {
                graph.relation.append(interner.intern(&file_name_of(&path)), names);
            } else if file_walker::has_extension(&path, TRANSLATION_UNIT_EXTENSIONS) {
                graph.translation_units.push(TranslationUnit { path, includes: names });
            }
        }

        for include_root in &opts.include_paths {
            if !include_root.is_dir() {
                tracing::warn!(path = %include_root.display(), "include path is not a directory, skipping");
                continue;
            }
            let files =
                file_walker::source_files(include_root, HEADER_EXTENSIONS, opts.respect_ignore);
            tracing::info!(root = %include_root.display(), files = files.len(), "scanning include root");
            walked.extend(files.iter().cloned());
            for (path, includes) in extract_all(files, &mut cache_state, opts.cache_mode) {
                let names: Vec<HeaderName> =
                    includes.iter().map(|i| interner.intern(base_name(i))).collect();
                graph.relation.append(interner.intern(&file_name_of(&path)), names);
            }
        }

        if matches!(opts.cache_mode, CacheMode::Use) {
            use std::collections::HashSet;
            let present: HashSet<&PathBuf> = walked.iter().collect();
            cache_state.entries.retain(|k, _| present.contains(k));
        }
        if !matches!(opts.cache_mode, CacheMode::Ignore) {
            cache::save_cache(root, &cache_state);
        }

        graph.metadata = GraphMetadata {
            root: opts.root.clone(),
            include_paths: opts.include_paths.clone(),
            scanned_files: walked.len(),
            generated_at: match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)
            {
                Ok(d) => format!("{}", d.as_secs()),
                Err(_) => "0".to_string(),
            },
        };
        tracing::debug!(
            headers = graph.relation.len(),
            edges = graph.relation.edge_count(),
            translation_units = graph.translation_units.len(),
            "include graph built"
        );
        Ok(graph)
    }

    /// Convenience builder: primary root only, no cache.
    ///
    /// # Errors
    /// Returns `SmasherError::InvalidRoot` when `root` is not a directory.
    pub fn build_from_directory(root: &Path) -> Result<Self, SmasherError> {
        Self::build(&ScanOptions::new(root))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

enum Extraction {
    Reused(Vec<String>),
    Parsed(CacheEntry),
    Unreadable,
}

// Reads every file in parallel, reusing a cache entry only when the content fingerprint
// still matches. Output order follows `files`.
fn extract_all(
    files: Vec<PathBuf>,
    cache_state: &mut cache::Cache,
    mode: CacheMode,
) -> Vec<Extracted> {
    let extractor = IncludeExtractor::new();
    let reuse = matches!(mode, CacheMode::Use);
    let cached: &cache::Cache = cache_state;

    let outcomes: Vec<Extraction> = files
        .par_iter()
        .map(|path| {
            let bytes = match std::fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "no includes extracted");
                    return Extraction::Unreadable;
                }
            };
            let meta = CacheEntryMeta::from_content(&bytes);
            if reuse {
                if let Some(entry) = cached.entries.get(path).filter(|e| e.meta == meta) {
                    return Extraction::Reused(entry.includes.clone());
                }
            }
            match extractor.try_extract_bytes(path, bytes) {
                Ok(includes) => Extraction::Parsed(CacheEntry { meta, includes }),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "no includes extracted");
                    Extraction::Unreadable
                }
            }
        })
        .collect();

    let mut reused = 0usize;
    let out: Vec<Extracted> = files
        .into_iter()
        .zip(outcomes)
        .map(|(path, outcome)| match outcome {
            Extraction::Reused(includes) => {
                reused += 1;
                (path, includes)
            }
            Extraction::Parsed(entry) => {
                let includes = entry.includes.clone();
                cache_state.entries.insert(path.clone(), entry);
                (path, includes)
            }
            Extraction::Unreadable => (path, Vec::new()),
        })
        .collect();
    tracing::debug!(reused, parsed = out.len() - reused, "extracted includes");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[HeaderName]) -> Vec<&str> {
        v.iter().map(AsRef::as_ref).collect()
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut rel = InclusionRelation::default();
        rel.append(Arc::from("a.h"), [Arc::from("b.h"), Arc::from("c.h")]);
        rel.append(Arc::from("a.h"), [Arc::from("b.h")]);
        assert_eq!(names(rel.children("a.h")), vec!["b.h", "c.h", "b.h"]);
        assert_eq!(rel.edge_count(), 3);
    }

    #[test]
    fn unknown_header_is_leaf() {
        let rel: InclusionRelation = [("a.h", vec!["b.h"])].into_iter().collect();
        assert!(rel.children("zzz.h").is_empty());
        assert!(!rel.contains("b.h"));
    }

    #[test]
    fn interner_shares_allocations() {
        let mut i = Interner::default();
        let a = i.intern("x.h");
        let b = i.intern("x.h");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn build_rejects_non_directory_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.cpp");
        std::fs::write(&file, "").unwrap();
        let err = IncludeGraph::build_from_directory(&file).unwrap_err();
        assert!(matches!(err, SmasherError::InvalidRoot(ref p) if p == &file));
        assert!(err.to_string().contains("plain.cpp"));
    }

    #[test]
    fn translation_units_do_not_become_relation_keys() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.h"), "#include <sub/b.h>\n").unwrap();
        std::fs::write(root.join("main.cpp"), "#include \"a.h\"\n").unwrap();
        std::fs::write(root.join("notes.txt"), "#include \"a.h\"\n").unwrap();

        let g = IncludeGraph::build_from_directory(root).unwrap();
        assert_eq!(names(g.relation.children("a.h")), vec!["b.h"]);
        assert!(!g.relation.contains("main.cpp"));
        assert_eq!(g.translation_units.len(), 1);
        assert_eq!(names(&g.translation_units[0].includes), vec!["a.h"]);
        assert_eq!(g.metadata.scanned_files, 2);
    }
}
