use anyhow::Result;
use atlas_core::{build_file_map, scan_files};
use log::{debug, info};
use std::path::Path;

use crate::{
    config::Config,
    stamp::VersionStamp,
    types::BuildResult,
    writer::{write_report_md, write_report_meta},
};

/// Resolves configuration, scans the repository and writes the report.
///
/// `cwd` is where repository root detection starts when `--root` is not
/// given; `version` is stamped into the output.
pub fn run_build(cfg: Config, cwd: &Path, version: &str) -> Result<BuildResult> {
    info!("Starting atlas build");

    let plan = cfg.resolve(cwd)?;
    let repo_root = plan.repo_root;
    let scan = plan.scan;
    debug!("Scan config: {:?}", scan);

    let files = scan_files(&repo_root, &scan)?;
    let stamp = VersionStamp::collect(&repo_root, version);
    debug!("Version stamp: {:?}", stamp);

    let file_map = if plan.file_map {
        info!("Building file map for {} files", files.len());
        Some(build_file_map(&repo_root, &files, &scan.import_ignore))
    } else {
        debug!("File map disabled");
        None
    };

    let mut artifacts = Vec::new();
    if !plan.meta_only {
        artifacts.push(write_report_md(
            &repo_root,
            &scan.output_dir,
            &files,
            &scan.roots,
            file_map.as_ref(),
            &stamp,
        )?);
    }
    artifacts.push(write_report_meta(
        &repo_root,
        &scan.output_dir,
        &files,
        file_map.as_ref(),
        &stamp,
    )?);

    info!("Atlas build complete: {} files", files.len());
    Ok(BuildResult {
        repo_root,
        output_dir: scan.output_dir,
        files,
        cross_referenced: file_map.as_ref().map(|m| m.len()),
        artifacts,
    })
}
