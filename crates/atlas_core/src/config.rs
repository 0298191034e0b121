use log::{debug, trace};
use std::path::{Path, PathBuf};

/// Walks up from `start` until a directory containing `.git` is found.
///
/// Falls back to `start` itself when no ancestor is a repository, so a plain
/// directory can still be surveyed.
pub fn find_repo_root(start: &Path) -> PathBuf {
    find_marked_ancestor(start, ".git")
}

fn find_marked_ancestor(start: &Path, marker: &str) -> PathBuf {
    debug!("Searching for repo root from: {:?}", start);
    let mut current_dir = start.to_path_buf();

    loop {
        let marker_path = current_dir.join(marker);
        trace!("Checking for {} at: {:?}", marker, marker_path);
        if marker_path.exists() {
            debug!("Found repo root at: {:?}", current_dir);
            return current_dir;
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("No {} above {:?}, using it as the root", marker, start);
                return start.to_path_buf();
            }
        }
    }
}
