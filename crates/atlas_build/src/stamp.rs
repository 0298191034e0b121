use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, trace};
use serde::Serialize;
use std::{path::Path, process::Command};

const UNKNOWN: &str = "unknown";

/// Version/commit/time label attached to every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStamp {
    pub version: String,
    pub git_commit: String,
    pub generated_at: String,
}

impl VersionStamp {
    /// Stamps a build of `repo_root` made by tool version `version`.
    pub fn collect(repo_root: &Path, version: &str) -> Self {
        Self::at(repo_root, version, Utc::now())
    }

    pub fn at(repo_root: &Path, version: &str, now: DateTime<Utc>) -> Self {
        let version = if version.trim().is_empty() { UNKNOWN } else { version.trim() };
        Self {
            version: version.to_string(),
            git_commit: read_git_commit(repo_root),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Short HEAD commit of the repository, or `unknown` when git is missing,
/// the directory is not a repository, or HEAD has no commits yet.
fn read_git_commit(repo_root: &Path) -> String {
    trace!("Reading git commit in {:?}", repo_root);
    match Command::new("git").args(["rev-parse", "--short", "HEAD"]).current_dir(repo_root).output() {
        Ok(out) if out.status.success() => {
            let commit = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if commit.is_empty() { UNKNOWN.to_string() } else { commit }
        }
        Ok(out) => {
            debug!("git rev-parse failed: {}", String::from_utf8_lossy(&out.stderr).trim());
            UNKNOWN.to_string()
        }
        Err(e) => {
            debug!("Could not run git: {}", e);
            UNKNOWN.to_string()
        }
    }
}
