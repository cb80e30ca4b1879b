//! include-smasher: find the translation units and headers that drag in the most includes.
//!
//! Scans a C/C++ source tree for `#include` lines, builds a header → header inclusion
//! relation keyed by file name, expands each header into its transitive includes
//! (duplicates kept, cycles cut per path) and scores every `.c`/`.cpp` file by the
//! total size of those expansions.
//!
//! This is a text scan, not a preprocessor: conditionals, macros and search paths are
//! ignored, and two headers with the same file name are the same node.
//!
//! # Quickstart (Library)
//! ```no_run
//! use include_smasher::graph::{IncludeGraph, ScanOptions};
//! use include_smasher::query::{Query, ScoreQuery};
//!
//! let opts = ScanOptions::new("src").with_include_paths(vec!["third_party/include".into()]);
//! let graph = IncludeGraph::build(&opts).expect("scan source tree");
//! let report = ScoreQuery::new().run(&graph);
//! for f in &report.files {
//!     println!("{} {}", f.path.display(), f.deps);
//! }
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! include-smasher scan path/to/src -I path/to/include --headers
//! include-smasher descendants path/to/src --header Widget.h
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod graph;
pub mod parser;
pub mod query;
pub mod utils;
