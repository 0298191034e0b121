//! Heuristic import/export extraction for JS/TS sources.
//!
//! This is a lexical pass over raw text, not a parser: it never fails on
//! malformed input and re-exports are only resolved by their syntactic alias.

use anyhow::{Context, Result};
use log::{debug, trace};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::{collections::HashSet, fs, path::Path};

use crate::{
    constants::JS_TS_EXTENSIONS,
    types::{CrossReference, FileMap, FileRecord},
};

static IMPORT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // import x from 'm'; import { a as b } from "m"
        r#"(?-u:\b)import\s+[^'"]*(?-u:\b)from\s+['"]([^'"]+)['"]"#,
        // import 'm'
        r#"(?-u:\b)import\s+['"]([^'"]+)['"]"#,
        // require('m')
        r#"(?-u:\b)require\(\s*['"]([^'"]+)['"]\s*\)"#,
    ]
    .iter()
    .map(|re| Regex::new(re).expect("valid import regex"))
    .collect()
});

static EXPORT_DECL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?-u:\b)export\s+(?:async\s+)?function\s+([A-Za-z0-9_$]+)",
        r"(?-u:\b)export\s+class\s+([A-Za-z0-9_$]+)",
        r"(?-u:\b)export\s+(?:const|let|var)\s+([A-Za-z0-9_$]+)",
        r"(?-u:\b)export\s+type\s+([A-Za-z0-9_$]+)",
        r"(?-u:\b)export\s+interface\s+([A-Za-z0-9_$]+)",
        r"(?-u:\b)export\s+enum\s+([A-Za-z0-9_$]+)",
    ]
    .iter()
    .map(|re| Regex::new(re).expect("valid export regex"))
    .collect()
});

static EXPORT_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)export\s*\{\s*([^}]+)\s*\}").expect("valid export list regex")
});

static EXPORT_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)as\s+([A-Za-z0-9_$]+)$").expect("valid alias regex"));

static EXPORT_DEFAULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)export\s+default(?-u:\b)").expect("valid default regex"));

/// Whether the file's extension marks it as JS/TS source.
pub fn is_source_file(record: &FileRecord) -> bool {
    record.extension().is_some_and(|ext| JS_TS_EXTENSIONS.contains(&ext.as_str()))
}

/// Imported module specifiers in first-seen order, minus ignored ones.
///
/// `import_ignore` must hold lowercase identifiers; matching is
/// case-insensitive.
pub fn extract_imports(src: &str, import_ignore: &HashSet<String>) -> Vec<String> {
    let found = IMPORT_RES
        .iter()
        .flat_map(|re| re.captures_iter(src).map(|caps| caps[1].to_string()))
        .filter(|spec| !import_ignore.contains(&spec.to_lowercase()));
    dedup_in_order(found)
}

/// Exported symbol names in first-seen order.
///
/// Declarations come first, then `export { .. }` entries (aliases win),
/// then `default` if a default export is present anywhere.
pub fn extract_exports(src: &str) -> Vec<String> {
    let mut names: Vec<String> = EXPORT_DECL_RES
        .iter()
        .flat_map(|re| re.captures_iter(src).map(|caps| caps[1].to_string()))
        .collect();

    for caps in EXPORT_LIST_RE.captures_iter(src) {
        for entry in caps[1].split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let name = match EXPORT_ALIAS_RE.captures(entry) {
                Some(alias) => alias[1].to_string(),
                None => entry.split_whitespace().next().unwrap_or(entry).to_string(),
            };
            names.push(name);
        }
    }

    if EXPORT_DEFAULT_RE.is_match(src) {
        names.push("default".to_string());
    }

    dedup_in_order(names)
}

/// Reads one source file and extracts its cross-reference.
pub fn cross_reference_for(file: &Path, import_ignore: &HashSet<String>) -> Result<CrossReference> {
    trace!("Extracting cross-reference: {}", file.display());
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let src = String::from_utf8_lossy(&bytes);

    Ok(CrossReference {
        imports: extract_imports(&src, import_ignore),
        exports: extract_exports(&src),
    })
}

/// Builds the cross-reference table for every source file in `files`.
///
/// Unreadable files are left out of the table; files without matches get
/// empty lists.
pub fn build_file_map(repo_root: &Path, files: &[FileRecord], import_ignore: &[String]) -> FileMap {
    let ignore: HashSet<String> = import_ignore.iter().map(|s| s.to_lowercase()).collect();

    let map: FileMap = files
        .par_iter()
        .filter(|record| is_source_file(record))
        .filter_map(|record| {
            match cross_reference_for(&repo_root.join(&record.path), &ignore) {
                Ok(xref) => Some((record.path.clone(), xref)),
                Err(e) => {
                    debug!("Skipping cross-reference for {}: {:#}", record.path, e);
                    None
                }
            }
        })
        .collect();

    debug!("Built cross-references for {} of {} files", map.len(), files.len());
    map
}

fn dedup_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
