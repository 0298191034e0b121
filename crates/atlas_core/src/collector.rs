use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use log::{debug, trace, warn};
use std::{fs, path::Path};

use crate::resolver::{static_prefix, to_posix};

/// Expands repo-relative glob `patterns` into candidate paths.
///
/// Only regular files are returned; hidden segments are never matched and
/// symlinks are not followed. Output may contain paths in walk order and is
/// not yet filtered or sorted.
pub fn collect_candidates(
    repo_root: &Path,
    patterns: &[String],
    respect_gitignore: bool,
) -> Result<Vec<String>> {
    debug!("Collecting candidates for {} patterns", patterns.len());
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = build_globset(patterns)?;

    let mut candidates: Vec<String> = Vec::new();
    let mut first_error = None;
    let mut walked = 0usize;

    for base in walk_bases(patterns) {
        let abs = repo_root.join(&base);
        if !abs.exists() {
            trace!("Skipping missing walk base: {}", abs.display());
            continue;
        }

        if abs.is_file() {
            walked += 1;
            if !is_hidden(&base) && matcher.is_match(&base) {
                candidates.push(base);
            }
            continue;
        }

        // an unlistable root is a configuration problem, not a per-file one
        if let Err(e) = fs::read_dir(&abs) {
            warn!("Cannot enumerate scan root {}: {}", abs.display(), e);
            if first_error.is_none() {
                first_error = Some(
                    anyhow::Error::new(e)
                        .context(format!("Failed to enumerate {}", abs.display())),
                );
            }
            continue;
        }
        walked += 1;

        debug!("Walking directory tree from: {}", abs.display());
        let walker = WalkBuilder::new(&abs)
            .hidden(true)
            .follow_links(false)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .git_global(false)
            .ignore(respect_gitignore)
            .parents(respect_gitignore)
            .require_git(false)
            .build();

        for res in walker {
            let dent = match res {
                Ok(dent) => dent,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !dent.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let rel = match dent.path().strip_prefix(repo_root) {
                Ok(rel) => to_posix(rel),
                Err(_) => continue,
            };
            // the walker never skips its own starting directory
            if is_hidden(&rel) {
                continue;
            }
            if matcher.is_match(&rel) {
                trace!("Matched candidate: {}", rel);
                candidates.push(rel);
            }
        }
    }

    if walked == 0
        && let Some(e) = first_error
    {
        return Err(e);
    }

    debug!("Collected {} candidates", candidates.len());
    Ok(candidates)
}

/// Compiles glob patterns with path-aware semantics: `*` stays within one
/// segment, `**` spans directories.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder.build().context("Failed to build glob set")
}

fn compile_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid glob pattern '{}'", pattern))
}

/// True when any segment of a repo-relative path starts with `.`.
fn is_hidden(rel: &str) -> bool {
    rel.split('/').any(|segment| segment.starts_with('.'))
}

/// Distinct directories (or files) to walk, with nested bases folded into
/// their ancestors so no file is visited twice.
fn walk_bases(patterns: &[String]) -> Vec<String> {
    let mut bases: Vec<String> = patterns.iter().map(|p| static_prefix(p).to_string()).collect();
    bases.sort();
    bases.dedup();

    let mut folded: Vec<String> = Vec::new();
    for base in bases {
        let nested = folded
            .iter()
            .any(|outer| outer.is_empty() || base.starts_with(&format!("{}/", outer)));
        if !nested {
            folded.push(base);
        }
    }
    folded
}
