use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::slice;
use std::sync::Arc;

use crate::graph::{HeaderName, InclusionRelation};

/// Ordered, duplicate-preserving descendants of one header.
pub type Descendants = Arc<[HeaderName]>;

/// Expands a header into every include edge reachable from it.
///
/// Traversal is depth-first over an explicit stack. A child already on the current
/// path is recorded but not expanded, so cycles are cut per path rather than by a
/// global visited set: a header reached again through a different, non-cyclic route
/// is expanded in full each time.
#[derive(Debug, Clone, Copy)]
pub struct DescendantResolver<'a> {
    relation: &'a InclusionRelation,
}

struct Frame<'a> {
    node: &'a str,
    children: slice::Iter<'a, HeaderName>,
}

impl<'a> DescendantResolver<'a> {
    #[must_use]
    pub fn new(relation: &'a InclusionRelation) -> Self {
        Self { relation }
    }

    /// Descendant multiset of `header`, in traversal order.
    #[must_use]
    pub fn resolve(&self, header: &str) -> Vec<HeaderName> {
        let mut out: Vec<HeaderName> = Vec::new();
        // Nodes of the frames currently on the stack; unique along a path.
        let mut on_path: HashSet<&str> = HashSet::new();
        on_path.insert(header);
        let mut stack: Vec<Frame<'_>> =
            vec![Frame { node: header, children: self.relation.children(header).iter() }];

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.children.next() {
                out.push(child.clone());
                if on_path.insert(child.as_ref()) {
                    stack.push(Frame {
                        node: child.as_ref(),
                        children: self.relation.children(child).iter(),
                    });
                }
            } else if let Some(done) = stack.pop() {
                on_path.remove(done.node);
            }
        }
        out
    }
}

/// Memoized descendant multisets, keyed by header identity.
///
/// Entries never go stale: the relation is immutable once built and every
/// resolution starts from a fresh path.
#[derive(Debug, Default, Clone)]
pub struct DescendantCache {
    entries: HashMap<HeaderName, Descendants>,
    hits: usize,
    misses: usize,
}

impl DescendantCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, header: &str) -> Option<&Descendants> {
        self.entries.get(header)
    }

    pub fn get_or_resolve(
        &mut self,
        header: &HeaderName,
        resolver: &DescendantResolver<'_>,
    ) -> Descendants {
        if let Some(d) = self.entries.get(header) {
            self.hits += 1;
            return d.clone();
        }
        self.misses += 1;
        let d: Descendants = resolver.resolve(header).into();
        self.entries.insert(header.clone(), d.clone());
        d
    }

    /// Resolve every not-yet-cached header in parallel and store the results.
    ///
    /// Returns how many headers were resolved.
    pub fn warm<'h, I>(&mut self, resolver: &DescendantResolver<'_>, headers: I) -> usize
    where
        I: IntoIterator<Item = &'h HeaderName>,
    {
        let mut seen: HashSet<&HeaderName> = HashSet::new();
        let missing: Vec<&HeaderName> = headers
            .into_iter()
            .filter(|h| !self.entries.contains_key::<str>(h) && seen.insert(*h))
            .collect();
        let resolved: Vec<(HeaderName, Descendants)> = missing
            .into_par_iter()
            .map(|h| (h.clone(), Descendants::from(resolver.resolve(h))))
            .collect();
        let n = resolved.len();
        self.misses += n;
        self.entries.extend(resolved);
        n
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
