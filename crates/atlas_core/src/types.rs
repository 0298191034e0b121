use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};

/// Fully resolved scan settings handed to the core pipeline.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Absolute scan roots; may contain glob segments (e.g. `<repo>/apps/*/src`).
    pub roots: Vec<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_bytes: u64,
    /// Lowercase module identifiers dropped from cross-references.
    pub import_ignore: Vec<String>,
    /// Repo-relative report directory; never scanned.
    pub output_dir: String,
    pub respect_gitignore: bool,
}

/// A repo-relative path that survived every filter stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileRecord {
    pub path: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Lowercased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        match name.rfind('.') {
            Some(idx) if idx > 0 => Some(name[idx + 1..].to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Fence label used when embedding the file in a markdown report.
    pub fn language(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("ts") => "ts",
            Some("tsx") => "tsx",
            Some("js") => "js",
            Some("jsx") => "jsx",
            Some("json") => "json",
            Some("md") | Some("mdx") => "md",
            Some("yml") | Some("yaml") => "yaml",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

/// Cross-reference table keyed by repo-relative path.
pub type FileMap = BTreeMap<String, CrossReference>;
