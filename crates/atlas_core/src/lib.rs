//! Core pipeline for building a repository atlas.
//!
//! This crate turns a repository root plus scan settings into a
//! deterministic file list and a heuristic import/export table:
//! - Resolving scan roots (explicit or auto-detected) into glob patterns
//! - Expanding patterns into candidate paths
//! - Filtering candidates (exclusions, extension preference, size, binary)
//! - Extracting imports and exports from JS/TS sources

mod collector;
mod config;
mod constants;
mod filter;
mod parser;
mod resolver;
mod types;

use anyhow::Result;
use log::{debug, info};
use std::path::Path;

// Re-export public API
pub use collector::{build_globset, collect_candidates};
pub use config::find_repo_root;
pub use constants::{
    DEFAULT_EXCLUDE, DEFAULT_IMPORT_IGNORE, DEFAULT_INCLUDE, DEFAULT_MAX_BYTES, DEFAULT_OUTPUT_DIR,
    JS_TS_EXTENSIONS, extension_rank,
};
pub use filter::{filter_candidates, looks_binary, prefer_extensions};
pub use parser::{build_file_map, cross_reference_for, extract_exports, extract_imports};
pub use resolver::{RootDetection, detect_roots, normalize_root, resolve_patterns};
pub use types::{CrossReference, FileMap, FileRecord, ScanConfig};

/// Runs pattern resolution, expansion and filtering for one repository.
///
/// Fails only on invalid globs or when no existing scan root can be listed.
pub fn scan_files(repo_root: &Path, cfg: &ScanConfig) -> Result<Vec<FileRecord>> {
    info!("Scanning {} roots under {}", cfg.roots.len(), repo_root.display());
    let patterns = resolve_patterns(repo_root, &cfg.roots, &cfg.include);
    debug!("Patterns: {:?}", patterns);

    let candidates = collect_candidates(repo_root, &patterns, cfg.respect_gitignore)?;
    let files = filter_candidates(repo_root, candidates, cfg)?;

    info!("Scan complete: {} files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn config(root: &Path, include: &[&str]) -> ScanConfig {
        ScanConfig {
            roots: vec![root.to_path_buf()],
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            max_bytes: DEFAULT_MAX_BYTES,
            import_ignore: vec![],
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            respect_gitignore: false,
        }
    }

    fn paths(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_scan_prefers_ts_over_js() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "a.ts", "export const a = 1;");
        create_test_file(root, "a.js", "exports.a = 1;");

        let files = scan_files(root, &config(root, &["*.ts", "*.js"])).unwrap();
        assert_eq!(paths(&files), vec!["a.ts"]);
    }

    #[test]
    fn test_scan_never_includes_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "out/report.md", "# old report");
        create_test_file(root, "docs/guide.md", "# guide");

        let mut cfg = config(root, &["**/*.md", "out/*.md"]);
        cfg.exclude.clear();
        cfg.output_dir = "out".to_string();
        let files = scan_files(root, &cfg).unwrap();
        assert_eq!(paths(&files), vec!["docs/guide.md"]);
    }

    #[test]
    fn test_scan_overlapping_roots_are_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "packages/core/src/index.ts", "export {}");
        create_test_file(root, "packages/core/package.json", "{}");

        let mut cfg = config(root, &["**/*.{ts,json}"]);
        cfg.roots = vec![root.join("packages/*/src"), root.join("packages/*")];
        let files = scan_files(root, &cfg).unwrap();
        assert_eq!(paths(&files), vec!["packages/core/package.json", "packages/core/src/index.ts"]);
    }

    #[test]
    fn test_scan_default_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/index.ts", "export {}");
        create_test_file(root, "src/legacy.js", "module.exports = {}");
        create_test_file(root, "node_modules/dep/index.ts", "export {}");
        create_test_file(root, "dist/index.js", "");
        create_test_file(root, "types/index.d.ts", "export {}");

        let files = scan_files(root, &config(root, DEFAULT_INCLUDE)).unwrap();
        assert_eq!(paths(&files), vec!["src/index.ts"]);
    }

    #[test]
    fn test_scan_missing_root_contributes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "export {}");

        let mut cfg = config(root, &["**/*.ts"]);
        cfg.roots = vec![root.join("missing"), root.join("src")];
        let files = scan_files(root, &cfg).unwrap();
        assert_eq!(paths(&files), vec!["src/a.ts"]);

        cfg.roots = vec![root.join("missing")];
        assert!(scan_files(root, &cfg).unwrap().is_empty());
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..40 {
            create_test_file(root, &format!("src/m{}/f{}.ts", i % 7, i), "import x from './x';");
        }
        let cfg = config(root, &["**/*.ts"]);

        let first = scan_files(root, &cfg).unwrap();
        let second = scan_files(root, &cfg).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 40);

        let map_a = build_file_map(root, &first, &[]);
        let map_b = build_file_map(root, &second, &[]);
        assert_eq!(map_a, map_b);
    }
}
