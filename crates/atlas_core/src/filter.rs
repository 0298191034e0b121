//! Candidate filtering: exclusion, deduplication, extension preference,
//! size ceiling and binary rejection, in that order.

use anyhow::Result;
use log::{debug, trace};
use rayon::prelude::*;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use crate::{
    collector::build_globset,
    constants::{BINARY_MAX_UNPRINTABLE_RATIO, BINARY_SAMPLE_BYTES, extension_rank},
    types::{FileRecord, ScanConfig},
};

/// Turns raw candidates into the final sorted list of file records.
///
/// Per-file I/O failures drop the file; only an invalid exclude glob is an error.
pub fn filter_candidates(
    repo_root: &Path,
    candidates: Vec<String>,
    cfg: &ScanConfig,
) -> Result<Vec<FileRecord>> {
    debug!("Filtering {} candidates", candidates.len());
    let excluded = build_globset(&cfg.exclude)?;
    let output_dir = normalize_dir(&cfg.output_dir);
    let output_prefix = format!("{}/", output_dir);

    let unique: BTreeSet<String> = candidates
        .into_iter()
        .filter(|p| {
            let hard = !output_dir.is_empty() && p.starts_with(&output_prefix);
            if hard {
                trace!("Dropping output dir path: {}", p);
            }
            !hard
        })
        .filter(|p| {
            let hit = excluded.is_match(p);
            if hit {
                trace!("Excluded by pattern: {}", p);
            }
            !hit
        })
        .collect();
    debug!("{} candidates after exclusion and dedup", unique.len());

    let preferred = prefer_extensions(unique);

    let mut kept: Vec<FileRecord> = preferred
        .par_iter()
        .filter(|rel| accept_file(&repo_root.join(rel), cfg.max_bytes))
        .map(|rel| FileRecord::new(rel.as_str()))
        .collect();
    kept.sort();

    debug!("Kept {} files", kept.len());
    Ok(kept)
}

/// Keeps one path per stem, choosing the highest-ranked extension.
///
/// Input is iterated in sorted order, so equal ranks resolve to the
/// lexicographically later path.
pub fn prefer_extensions(paths: BTreeSet<String>) -> Vec<String> {
    let mut by_stem: BTreeMap<String, (u8, String)> = BTreeMap::new();
    for path in paths {
        let (stem, ext) = split_ext(&path);
        let rank = extension_rank(&ext);
        match by_stem.get(&stem) {
            Some((prev_rank, prev)) if rank < *prev_rank => {
                trace!("Preferring {} over {}", prev, path);
            }
            Some((_, prev)) => {
                trace!("Preferring {} over {}", path, prev);
                by_stem.insert(stem, (rank, path));
            }
            None => {
                by_stem.insert(stem, (rank, path));
            }
        }
    }

    let mut kept: Vec<String> = by_stem.into_values().map(|(_, path)| path).collect();
    kept.sort();
    kept
}

/// Size and content checks for a single file. Any I/O error rejects it.
fn accept_file(path: &Path, max_bytes: u64) -> bool {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            return false;
        }
    };
    if meta.len() > max_bytes {
        trace!("Skipping {} ({} bytes > {})", path.display(), meta.len(), max_bytes);
        return false;
    }

    match fs::read(path) {
        Ok(buf) if looks_binary(&buf) => {
            trace!("Skipping binary file: {}", path.display());
            false
        }
        Ok(_) => true,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Binary heuristic: any null byte, or more than 20% of the first 4 KiB
/// outside tab/newline/CR, printable ASCII and UTF-8 lead bytes.
pub fn looks_binary(buf: &[u8]) -> bool {
    if buf.contains(&0) {
        return true;
    }
    let sample = &buf[..buf.len().min(BINARY_SAMPLE_BYTES)];
    let weird = sample
        .iter()
        .filter(|&&c| !matches!(c, 9 | 10 | 13 | 32..=126 | 194..=244))
        .count();
    weird as f64 / sample.len().max(1) as f64 > BINARY_MAX_UNPRINTABLE_RATIO
}

fn split_ext(path: &str) -> (String, String) {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(idx) if idx > 0 => {
            let dot = name_start + idx;
            (path[..dot].to_string(), path[dot + 1..].to_ascii_lowercase())
        }
        _ => (path.to_string(), String::new()),
    }
}

fn normalize_dir(dir: &str) -> &str {
    dir.trim_start_matches("./").trim_end_matches('/')
}
