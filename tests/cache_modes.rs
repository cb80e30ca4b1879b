use include_smasher::graph::{IncludeGraph, ScanOptions};
use include_smasher::utils::cache::{self, Cache, CacheEntry, CacheEntryMeta, CacheMode};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn names(v: &[std::sync::Arc<str>]) -> Vec<&str> {
    v.iter().map(AsRef::as_ref).collect()
}

fn setup(root: &Path) {
    fs::write(root.join("A.h"), "#include \"B.h\"\n").unwrap();
    fs::write(root.join("main.cpp"), "#include \"A.h\"\n").unwrap();
}

// A cache entry that matches A.h's fingerprint but lies about its includes.
fn plant_stale_entry(root: &Path) {
    let path = root.join("A.h");
    let mut state = Cache::default();
    state.entries.insert(
        path.clone(),
        CacheEntry { meta: CacheEntryMeta::of(&path).unwrap(), includes: vec!["Planted.h".into()] },
    );
    cache::save_cache(root, &state);
}

fn build(root: &Path, mode: CacheMode) -> IncludeGraph {
    IncludeGraph::build(&ScanOptions::new(root).with_cache_mode(mode)).unwrap()
}

#[test]
fn use_mode_writes_cache_and_reuses_matching_entries() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);

    let g = build(root, CacheMode::Use);
    assert_eq!(names(g.relation.children("A.h")), vec!["B.h"]);
    let saved = cache::load_cache(root).expect("cache written");
    assert_eq!(saved.entries.len(), 2);
    assert_eq!(saved.entries[&root.join("A.h")].includes, vec!["B.h".to_string()]);

    plant_stale_entry(root);
    let g = build(root, CacheMode::Use);
    assert_eq!(names(g.relation.children("A.h")), vec!["Planted.h"]);
}

#[test]
fn use_mode_reparses_when_content_changes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);
    plant_stale_entry(root);
    fs::write(root.join("A.h"), "#include \"B.h\"\n#include \"C.h\"\n").unwrap();

    let g = build(root, CacheMode::Use);
    assert_eq!(names(g.relation.children("A.h")), vec!["B.h", "C.h"]);
}

#[test]
fn use_mode_reparses_same_size_rewrite() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);

    let first = build(root, CacheMode::Use);
    assert_eq!(names(first.relation.children("A.h")), vec!["B.h"]);
    fs::write(root.join("A.h"), "#include \"C.h\"\n").unwrap();

    let second = build(root, CacheMode::Use);
    assert_eq!(names(second.relation.children("A.h")), vec!["C.h"]);
    let saved = cache::load_cache(root).unwrap();
    assert_eq!(saved.entries[&root.join("A.h")].includes, vec!["C.h".to_string()]);
}

#[test]
fn ignore_mode_neither_reads_nor_writes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);

    build(root, CacheMode::Ignore);
    assert!(!cache::cache_path(root).exists());

    plant_stale_entry(root);
    let before = fs::read_to_string(cache::cache_path(root)).unwrap();
    let g = build(root, CacheMode::Ignore);
    assert_eq!(names(g.relation.children("A.h")), vec!["B.h"]);
    assert_eq!(fs::read_to_string(cache::cache_path(root)).unwrap(), before);
}

#[test]
fn rebuild_mode_discards_and_rewrites() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);
    plant_stale_entry(root);

    let g = build(root, CacheMode::Rebuild);
    assert_eq!(names(g.relation.children("A.h")), vec!["B.h"]);
    let saved = cache::load_cache(root).expect("cache rewritten");
    assert_eq!(saved.entries[&root.join("A.h")].includes, vec!["B.h".to_string()]);
}

#[test]
fn entries_for_deleted_files_are_pruned() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);
    build(root, CacheMode::Use);
    fs::remove_file(root.join("main.cpp")).unwrap();

    build(root, CacheMode::Use);
    let saved = cache::load_cache(root).unwrap();
    assert_eq!(saved.entries.len(), 1);
    assert!(saved.entries.contains_key(&root.join("A.h")));
}

#[test]
fn corrupt_cache_file_is_treated_as_empty() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    setup(root);
    fs::write(cache::cache_path(root), "{not json").unwrap();

    let g = build(root, CacheMode::Use);
    assert_eq!(names(g.relation.children("A.h")), vec!["B.h"]);
    assert!(cache::load_cache(root).is_some());
}
