use include_smasher::utils::file_walker::{self, HEADER_EXTENSIONS, SOURCE_EXTENSIONS};
use include_smasher::utils::table;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn table_renderer_produces_expected_grid() {
    let headers = ["#", "Header"];
    let rows = vec![vec!["1".into(), "Widget.h".into()], vec!["2".into(), "x.h".into()]];
    let out = table::render(&headers, &rows);
    assert!(out.starts_with('+'));
    assert!(out.contains("| # | Header   |"));
    assert!(out.contains("| 2 | x.h      |"));
}

#[test]
fn file_walker_filters_by_extension_and_sorts() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    for rel in ["b/z.cpp", "b/a.h", "a.hpp", "c.c", "readme.md", "upper.H", "x.cc"] {
        write(&root.join(rel), "");
    }

    let files = file_walker::source_files(root, SOURCE_EXTENSIONS, false);
    let rel: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(rel, vec!["a.hpp", "b/a.h", "b/z.cpp", "c.c"]);

    let headers = file_walker::source_files(root, HEADER_EXTENSIONS, false);
    assert_eq!(headers.len(), 2);
}

#[test]
fn file_walker_respects_ignore_only_when_asked() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("kept.h"), "");
    write(&root.join("generated/out.h"), "");
    write(&root.join(".gitignore"), "generated/\n");

    let all = file_walker::source_files(root, HEADER_EXTENSIONS, false);
    assert!(all.iter().any(|p| p.ends_with("generated/out.h")));

    let filtered = file_walker::source_files(root, HEADER_EXTENSIONS, true);
    assert!(filtered.iter().any(|p| p.ends_with("kept.h")));
    assert!(!filtered.iter().any(|p| p.ends_with("generated/out.h")));
}

#[test]
fn file_walker_on_missing_root_is_empty() {
    let dir = tempdir().unwrap();
    assert!(file_walker::source_files(&dir.path().join("nope"), SOURCE_EXTENSIONS, false).is_empty());
}

fn write(path: &Path, s: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, s).unwrap();
}

#[cfg(unix)]
#[test]
fn file_walker_lists_symlinked_files_in_both_modes() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    write(&dir.path().join("outside/Real.h"), "");
    write(&root.join("plain.h"), "");
    std::os::unix::fs::symlink(dir.path().join("outside/Real.h"), root.join("Link.h")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing.h"), root.join("Dangling.h")).unwrap();

    for respect_ignore in [false, true] {
        let files = file_walker::source_files(&root, HEADER_EXTENSIONS, respect_ignore);
        let names: Vec<String> =
            files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["Link.h", "plain.h"]);
    }
}
