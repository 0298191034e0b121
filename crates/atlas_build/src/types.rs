use atlas_core::FileRecord;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub repo_root: PathBuf,
    pub output_dir: String,
    pub files: Vec<FileRecord>,
    /// Number of cross-referenced files, None when the file map was skipped
    pub cross_referenced: Option<usize>,
    /// Artifacts written, in write order
    pub artifacts: Vec<PathBuf>,
}
