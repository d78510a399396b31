//! File discovery: walk a root, filter, and classify.
//!
//! Discovery produces read-only [`FileInfo`] values. A file that cannot
//! be read is logged, recorded as a diagnostic, and skipped; one bad file
//! never aborts the scan.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use globset::GlobSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::{defaults, EngineConfig};
use crate::error::Diagnostic;
use crate::syntax;

/// Coarse architectural classification of a file, inferred from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Data,
    Domain,
    Presentation,
    Framework,
    Test,
    Unknown,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Data => "data",
            Layer::Domain => "domain",
            Layer::Presentation => "presentation",
            Layer::Framework => "framework",
            Layer::Test => "test",
            Layer::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discovered source file with derived metadata. Read-only after
/// creation; every downstream stage borrows it.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the scanned root, with forward slashes.
    pub relative_path: String,
    pub layer: Layer,
    pub is_test: bool,
    /// Declared namespace/package, parsed from the leading lines.
    pub namespace: Option<String>,
}

/// Directory names treated as test containers.
const TEST_DIR_SEGMENTS: &[&str] = &["test", "tests", "__tests__", "testdata", "spec"];

/// Filename stem suffixes that mark a test file.
const TEST_FILE_SUFFIXES: &[&str] = &["_test", "_spec", "Test", "Tests", ".test", ".spec"];

static NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    // `package com.example.app;` / `package main` / `namespace Foo.Bar`
    Regex::new(r"^\s*(?:package|namespace)\s+([A-Za-z_][\w./]*)").unwrap()
});

/// Walk `root` and return every analyzable file plus the diagnostics for
/// entries that could not be read.
pub fn discover(
    root: &Path,
    config: &EngineConfig,
    excludes: &GlobSet,
) -> (Vec<FileInfo>, Vec<Diagnostic>) {
    let mut files = Vec::new();
    let mut diagnostics = Vec::new();
    let extensions = syntax::supported_extensions();

    let walker = WalkDir::new(root).follow_links(true).into_iter();
    let walker = walker.filter_entry(|entry| {
        // Skip hidden directories, but never the walk root itself.
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !(entry.file_type().is_dir() && name.starts_with('.') && name.len() > 1)
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                tracing::warn!(path = %path, error = %e, "skipping unreadable entry");
                diagnostics.push(Diagnostic::discovery(path, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(path, root);

        if excludes.is_match(&relative) {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !extensions.contains(&ext) {
            continue;
        }

        match classify(path, &relative, config) {
            Ok(info) => files.push(info),
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "skipping unreadable file");
                diagnostics.push(Diagnostic::discovery(relative, e.to_string()));
            }
        }
    }

    // Deterministic ordering regardless of walk order.
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    (files, diagnostics)
}

/// Build the FileInfo for one candidate, reading only its leading lines.
fn classify(path: &Path, relative: &str, config: &EngineConfig) -> std::io::Result<FileInfo> {
    let namespace = extract_namespace(path)?;
    Ok(FileInfo {
        path: path.to_path_buf(),
        relative_path: relative.to_string(),
        layer: classify_layer(relative, config),
        is_test: is_test_path(relative),
        namespace,
    })
}

fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Match path segments against the ordered layer rules; first match wins.
fn classify_layer(relative: &str, config: &EngineConfig) -> Layer {
    let lowered = relative.to_lowercase();
    let segments: Vec<&str> = lowered.split('/').collect();
    for rule in &config.layers {
        if segments
            .iter()
            .any(|segment| segment.contains(rule.pattern.as_str()))
        {
            return rule.layer;
        }
    }
    Layer::Unknown
}

/// A file is a test when it lives under a test directory or its name
/// follows a test-suffix convention.
fn is_test_path(relative: &str) -> bool {
    let path = Path::new(relative);
    let in_test_dir = path
        .components()
        .rev()
        .skip(1) // the filename itself
        .any(|c| TEST_DIR_SEGMENTS.contains(&c.as_os_str().to_string_lossy().as_ref()));
    if in_test_dir {
        return true;
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    TEST_FILE_SUFFIXES
        .iter()
        .any(|suffix| stem.ends_with(suffix))
}

/// Cheap namespace heuristic: scan the first few lines for a
/// package/namespace declaration. Not a parse.
fn extract_namespace(path: &Path) -> std::io::Result<Option<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    for line in reader.lines().take(defaults::NAMESPACE_SCAN_LINES) {
        let line = line?;
        if let Some(caps) = NAMESPACE_RE.captures(&line) {
            return Ok(Some(caps[1].to_string()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn discover_all(root: &Path) -> (Vec<FileInfo>, Vec<Diagnostic>) {
        let config = EngineConfig::default();
        let excludes = config.compile_excludes().unwrap();
        discover(root, &config, &excludes)
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src/data")).unwrap();
        std::fs::write(temp.path().join("src/data/Repo.java"), "package a.data;\n").unwrap();
        std::fs::write(temp.path().join("src/Main.java"), "package a;\n").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not code").unwrap();

        let (files, diags) = discover_all(temp.path());
        assert!(diags.is_empty());
        let rels: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["src/Main.java", "src/data/Repo.java"]);
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("build")).unwrap();
        std::fs::write(temp.path().join("build/Gen.java"), "package gen;\n").unwrap();
        std::fs::write(temp.path().join("App.java"), "package app;\n").unwrap();

        let (files, _) = discover_all(temp.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "App.java");
    }

    #[test]
    fn test_layer_classification_first_match_wins() {
        let config = EngineConfig::default();
        assert_eq!(
            classify_layer("src/data/UserRepository.java", &config),
            Layer::Data
        );
        assert_eq!(
            classify_layer("src/presentation/LoginView.java", &config),
            Layer::Presentation
        );
        // "test" outranks "data" because test rules come first
        assert_eq!(
            classify_layer("data/tests/RepoTest.java", &config),
            Layer::Test
        );
        assert_eq!(classify_layer("misc/Util.java", &config), Layer::Unknown);
    }

    #[test]
    fn test_is_test_path_conventions() {
        assert!(is_test_path("src/tests/helper.py"));
        assert!(is_test_path("pkg/parser_test.go"));
        assert!(is_test_path("src/UserServiceTest.java"));
        assert!(is_test_path("web/login.spec.ts"));
        assert!(!is_test_path("src/service/UserService.java"));
        // A directory named tests marks files; a file merely containing
        // "test" mid-name does not
        assert!(!is_test_path("src/contest/Entry.java"));
    }

    #[test]
    fn test_namespace_extraction() {
        let temp = TempDir::new().unwrap();
        let java = temp.path().join("A.java");
        std::fs::write(&java, "// header\npackage com.example.app;\n\nclass A {}\n").unwrap();
        assert_eq!(
            extract_namespace(&java).unwrap(),
            Some("com.example.app".to_string())
        );

        let go = temp.path().join("main.go");
        std::fs::write(&go, "package main\n").unwrap();
        assert_eq!(extract_namespace(&go).unwrap(), Some("main".to_string()));

        let none = temp.path().join("plain.rs");
        std::fs::write(&none, "fn main() {}\n").unwrap();
        assert_eq!(extract_namespace(&none).unwrap(), None);
    }

    #[test]
    fn test_unreadable_file_yields_diagnostic_and_continues() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("ok_one.go"), "package one\n").unwrap();
        std::fs::write(temp.path().join("ok_two.go"), "package two\n").unwrap();
        // A dangling symlink fails the walk for that entry only
        std::os::unix::fs::symlink(
            temp.path().join("missing.go"),
            temp.path().join("broken.go"),
        )
        .unwrap();

        let (files, diags) = discover_all(temp.path());

        let rels: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(rels, vec!["ok_one.go", "ok_two.go"]);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].path.contains("broken.go"));
    }
}
