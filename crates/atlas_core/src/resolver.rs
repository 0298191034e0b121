//! Scan root detection and `(root, include)` pattern expansion.

use log::{debug, trace, warn};
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

use crate::constants::{DEFAULT_PACKAGE_DIRS, DEFAULT_SOURCE_DIR, DEFAULT_WORKSPACE_MARKERS};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Markers used to synthesize scan roots when none are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDetection {
    /// Top-level directories holding one package per child (`apps`, `packages`).
    pub package_dirs: Vec<String>,
    /// Files whose presence marks a multi-package workspace.
    pub markers: Vec<String>,
    /// Conventional flat source directory.
    pub source_dir: String,
}

impl Default for RootDetection {
    fn default() -> Self {
        Self {
            package_dirs: DEFAULT_PACKAGE_DIRS.iter().map(|s| s.to_string()).collect(),
            markers: DEFAULT_WORKSPACE_MARKERS.iter().map(|s| s.to_string()).collect(),
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
        }
    }
}

/// Synthesizes scan roots from the repository layout, most specific first.
///
/// Package-level source directories win over a flat top-level source
/// directory. When nothing more specific is found the repository root is the
/// only root.
pub fn detect_roots(repo_root: &Path, detection: &RootDetection) -> Vec<PathBuf> {
    debug!("Auto-detecting scan roots under {}", repo_root.display());
    let package_dirs: Vec<&String> =
        detection.package_dirs.iter().filter(|d| repo_root.join(d).exists()).collect();
    let has_marker = detection.markers.iter().any(|m| repo_root.join(m).exists());
    let source_dir = repo_root.join(&detection.source_dir);

    let mut roots: Vec<PathBuf> = Vec::new();
    if !package_dirs.is_empty() || has_marker {
        for dir in package_dirs {
            roots.push(repo_root.join(dir).join("*").join(&detection.source_dir));
            roots.push(repo_root.join(dir).join("*"));
        }
        if source_dir.exists() {
            roots.push(source_dir);
        }
    } else if source_dir.exists() {
        roots.push(source_dir);
    }
    if roots.is_empty() {
        roots.push(repo_root.to_path_buf());
    }

    debug!("Detected {} scan roots: {:?}", roots.len(), roots);
    roots
}

/// Makes a configured root absolute (relative roots hang off `repo_root`).
pub fn normalize_root(repo_root: &Path, root: &Path) -> PathBuf {
    if root.is_absolute() { root.to_path_buf().clean() } else { repo_root.join(root).clean() }
}

/// Expands every `(root, include)` pair into a repo-relative `/`-separated glob.
///
/// Roots whose literal prefix is missing on disk, or which lie outside the
/// repository, contribute nothing. The result is deduplicated but otherwise
/// unordered in meaning.
pub fn resolve_patterns(repo_root: &Path, roots: &[PathBuf], include: &[String]) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();

    for root in roots {
        let rel_root = match root.strip_prefix(repo_root) {
            Ok(rel) => to_posix(rel),
            Err(_) => {
                warn!("Skipping scan root outside the repository: {}", root.display());
                continue;
            }
        };

        let literal = static_prefix(&rel_root);
        if !repo_root.join(literal).exists() {
            debug!("Skipping missing scan root: {}", root.display());
            continue;
        }

        for inc in include {
            let inc = inc.trim_start_matches("./");
            let pattern =
                if rel_root.is_empty() { inc.to_string() } else { format!("{}/{}", rel_root, inc) };
            trace!("Resolved pattern: {}", pattern);
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }

    debug!("Resolved {} include patterns", patterns.len());
    patterns
}

/// Leading path segments of `pattern` that contain no glob syntax.
pub fn static_prefix(pattern: &str) -> &str {
    let mut end = 0;
    for (idx, segment) in pattern.split('/').enumerate() {
        if segment.contains(GLOB_META) {
            break;
        }
        end = if idx == 0 { segment.len() } else { end + 1 + segment.len() };
    }
    &pattern[..end.min(pattern.len())]
}

pub(crate) fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn includes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_static_prefix() {
        assert_eq!(static_prefix("apps/*/src/**/*.ts"), "apps");
        assert_eq!(static_prefix("src/lib/**/*.{ts,js}"), "src/lib");
        assert_eq!(static_prefix("**/*.ts"), "");
        assert_eq!(static_prefix("README.md"), "README.md");
        assert_eq!(static_prefix(""), "");
    }

    #[test]
    fn test_detect_roots_plain_repo_uses_repo_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let roots = detect_roots(root, &RootDetection::default());
        assert_eq!(roots, vec![root.to_path_buf()]);
    }

    #[test]
    fn test_detect_roots_flat_src() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();

        let roots = detect_roots(root, &RootDetection::default());
        assert_eq!(roots, vec![root.join("src")]);
    }

    #[test]
    fn test_detect_roots_prefers_package_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("packages/core/src")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();

        let roots = detect_roots(root, &RootDetection::default());
        assert_eq!(
            roots,
            vec![root.join("packages/*/src"), root.join("packages/*"), root.join("src")]
        );
    }

    #[test]
    fn test_detect_roots_marker_without_package_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("pnpm-workspace.yaml"), "packages: []").unwrap();

        let roots = detect_roots(root, &RootDetection::default());
        assert_eq!(roots, vec![root.to_path_buf()]);
    }

    #[test]
    fn test_detect_roots_custom_markers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("libs/a/lib")).unwrap();

        let detection = RootDetection {
            package_dirs: vec!["libs".to_string()],
            markers: vec![],
            source_dir: "lib".to_string(),
        };
        let roots = detect_roots(root, &detection);
        assert_eq!(roots, vec![root.join("libs/*/lib"), root.join("libs/*")]);
    }

    #[test]
    fn test_normalize_root() {
        let repo = Path::new("/repo");
        assert_eq!(normalize_root(repo, Path::new("./src/../lib")), PathBuf::from("/repo/lib"));
        assert_eq!(normalize_root(repo, Path::new("/elsewhere/x")), PathBuf::from("/elsewhere/x"));
    }

    #[test]
    fn test_resolve_patterns_cross_product() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("apps/web/src")).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();

        let roots = vec![root.join("apps/*/src"), root.join("src")];
        let patterns = resolve_patterns(root, &roots, &includes(&["**/*.ts", "./*.md"]));
        assert_eq!(
            patterns,
            vec!["apps/*/src/**/*.ts", "apps/*/src/*.md", "src/**/*.ts", "src/*.md"]
        );
    }

    #[test]
    fn test_resolve_patterns_repo_root_has_no_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let patterns = resolve_patterns(root, &[root.to_path_buf()], &includes(&["*.ts", "*.js"]));
        assert_eq!(patterns, vec!["*.ts", "*.js"]);
    }

    #[test]
    fn test_resolve_patterns_skips_missing_and_foreign_roots() {
        let temp_dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let root = temp_dir.path();

        let roots = vec![root.join("missing"), other.path().to_path_buf()];
        let patterns = resolve_patterns(root, &roots, &includes(&["**/*.ts"]));
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_resolve_patterns_deduplicates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();

        let roots = vec![root.join("src"), root.join("src")];
        let patterns = resolve_patterns(root, &roots, &includes(&["**/*.ts"]));
        assert_eq!(patterns, vec!["src/**/*.ts"]);
    }
}
