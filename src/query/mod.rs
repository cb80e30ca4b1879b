use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::graph::resolver::{DescendantCache, DescendantResolver};
use crate::graph::{HeaderName, IncludeGraph, TranslationUnit};

/// Query trait implemented by all query types.
///
/// Given an immutable reference to an `IncludeGraph`, returns a result of type `R`.
pub trait Query<R> {
    fn run(&self, graph: &IncludeGraph) -> R;
}

/// Descendant multiset of a single header.
pub struct DescendantsQuery {
    pub header: String,
}

impl DescendantsQuery {
    /// Accepts a bare name or a path; only the base name is used.
    #[must_use]
    pub fn new(header: &str) -> Self {
        Self { header: crate::parser::base_name(header).to_string() }
    }
}

impl Query<Vec<HeaderName>> for DescendantsQuery {
    fn run(&self, graph: &IncludeGraph) -> Vec<HeaderName> {
        DescendantResolver::new(&graph.relation).resolve(&self.header)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileScore {
    pub path: PathBuf,
    pub deps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCount {
    pub header: HeaderName,
    pub count: usize,
}

/// Heuristic: names without any upper-case character look like system headers.
#[must_use]
pub fn looks_like_system_header(name: &str) -> bool {
    name == name.to_lowercase()
}

/// Per-file scores and the global header counter of one scoring pass.
#[derive(Debug, Clone, Default)]
pub struct ScoreReport {
    /// Ascending by deps, then by path text.
    pub files: Vec<FileScore>,
    pub header_counter: HashMap<HeaderName, usize>,
    pub total_deps: usize,
}

impl ScoreReport {
    /// Header occurrence counts ascending by `(count, name)`.
    ///
    /// Unless `include_system` is set, names that look like system headers are dropped.
    #[must_use]
    pub fn header_popularity(&self, include_system: bool) -> Vec<HeaderCount> {
        let mut rows: Vec<HeaderCount> = self
            .header_counter
            .iter()
            .filter(|(h, _)| include_system || !looks_like_system_header(h))
            .map(|(h, &count)| HeaderCount { header: h.clone(), count })
            .collect();
        rows.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.header.cmp(&b.header)));
        rows
    }

    #[must_use]
    pub fn deps_of(&self, path: &std::path::Path) -> Option<usize> {
        self.files.iter().find(|f| f.path == path).map(|f| f.deps)
    }
}

/// Scores every translation unit by the summed size of its includes' descendant multisets.
#[derive(Debug, Clone, Default)]
pub struct ScoreQuery {
    pub exclude: Option<Regex>,
}

impl ScoreQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip translation units whose path matches `pattern`.
    #[must_use]
    pub fn with_exclude(mut self, pattern: Regex) -> Self {
        self.exclude = Some(pattern);
        self
    }

    fn selected<'g>(&self, graph: &'g IncludeGraph) -> impl Iterator<Item = &'g TranslationUnit> {
        let exclude = self.exclude.clone();
        graph.translation_units.iter().filter(move |tu| match &exclude {
            Some(re) => !re.is_match(&tu.path.to_string_lossy()),
            None => true,
        })
    }

    /// Score with an explicit cache, calling `observe` for each translation unit with its
    /// deps-count and combined descendant list, in processing order.
    pub fn run_with<F>(
        &self,
        graph: &IncludeGraph,
        cache: &mut DescendantCache,
        mut observe: F,
    ) -> ScoreReport
    where
        F: FnMut(&TranslationUnit, usize, &[HeaderName]),
    {
        let resolver = DescendantResolver::new(&graph.relation);
        let warmed = cache.warm(&resolver, self.selected(graph).flat_map(|tu| tu.includes.iter()));
        tracing::debug!(warmed, "descendant cache warmed");

        let mut report = ScoreReport::default();
        let mut combined: Vec<HeaderName> = Vec::new();
        for tu in self.selected(graph) {
            combined.clear();
            let mut deps = 0usize;
            for include in &tu.includes {
                let descendants = cache.get_or_resolve(include, &resolver);
                deps += descendants.len();
                combined.extend(descendants.iter().cloned());
            }
            for header in &combined {
                *report.header_counter.entry(header.clone()).or_insert(0) += 1;
            }
            observe(tu, deps, &combined);
            report.total_deps += deps;
            report.files.push(FileScore { path: tu.path.clone(), deps });
        }

        // Ties order by the raw path text, so `foo.cpp` sorts before `foo/bar.cpp`.
        report.files.sort_by(|a, b| {
            a.deps.cmp(&b.deps).then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
        });
        let (hits, misses) = cache.stats();
        tracing::debug!(files = report.files.len(), hits, misses, "scoring finished");
        report
    }
}

impl Query<ScoreReport> for ScoreQuery {
    fn run(&self, graph: &IncludeGraph) -> ScoreReport {
        let mut cache = DescendantCache::new();
        self.run_with(graph, &mut cache, |_, _, _| {})
    }
}
