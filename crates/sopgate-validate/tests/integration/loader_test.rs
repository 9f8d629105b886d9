//! Tests for directory walking and glob filtering

use sopgate_validate::{SourceLoader, ValidationError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn file_names(root: &Path, loaded: &sopgate_validate::LoadedSources) -> Vec<String> {
    loaded
        .files
        .iter()
        .map(|f| {
            Path::new(&f.name)
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_default_globs_filter_tree() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/b.service.ts", "export const b = 1;\n");
    write(root, "src/a.controller.ts", "export const a = 1;\n");
    write(root, "src/types.d.ts", "declare const x: number;\n");
    write(root, "src/readme.md", "# notes\n");
    write(root, "node_modules/lib/index.js", "module.exports = {};\n");
    write(root, "dist/main.js", "console.log(1);\n");
    write(root, "scripts/seed.mjs", "export {};\n");

    let loaded = SourceLoader::new().unwrap().load_paths(&[root]);
    assert!(loaded.diagnostics.is_empty());
    assert_eq!(
        file_names(root, &loaded),
        ["scripts/seed.mjs", "src/a.controller.ts", "src/b.service.ts"]
    );
}

#[test]
fn test_custom_globs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/keep.ts", "export {};\n");
    write(root, "src/keep.spec.ts", "export {};\n");
    write(root, "src/skip.js", "export {};\n");

    let loader = SourceLoader::with_globs(&["**/*.ts"], &["**/*.spec.ts"]).unwrap();
    let loaded = loader.load_paths(&[root]);
    assert_eq!(file_names(root, &loaded), ["src/keep.ts"]);
}

#[test]
fn test_explicit_file_bypasses_globs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "notes.txt", "eval(x);\n");

    let loaded = SourceLoader::new().unwrap().load_paths(&[root.join("notes.txt")]);
    assert_eq!(loaded.files.len(), 1);
    assert_eq!(loaded.files[0].content, "eval(x);\n");
}

#[test]
fn test_bad_exclude_glob_is_rejected() {
    let err = SourceLoader::with_globs(&["**/*.ts"], &["[unclosed"]).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidPattern { .. }));
}
