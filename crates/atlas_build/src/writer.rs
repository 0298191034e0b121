//! Report artifacts: `report.md` and `report.meta.json`.

use anyhow::{Context, Result};
use atlas_core::{FileMap, FileRecord};
use log::{debug, trace};
use serde::Serialize;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use crate::stamp::VersionStamp;

pub const REPORT_MD: &str = "report.md";
pub const REPORT_META: &str = "report.meta.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportMeta<'a> {
    root: String,
    output_dir: &'a str,
    generated_at: &'a str,
    version: &'a str,
    git_commit: &'a str,
    files: &'a [FileRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    file_map: Option<&'a FileMap>,
}

/// Writes `report.meta.json` into `<repo_root>/<output_dir>`.
pub fn write_report_meta(
    repo_root: &Path,
    output_dir: &str,
    files: &[FileRecord],
    file_map: Option<&FileMap>,
    stamp: &VersionStamp,
) -> Result<PathBuf> {
    let out_dir = ensure_output_dir(repo_root, output_dir)?;
    let meta_path = out_dir.join(REPORT_META);

    let json = render_meta(repo_root, output_dir, files, file_map, stamp)?;
    fs::write(&meta_path, json)
        .with_context(|| format!("Failed to write {}", meta_path.display()))?;
    debug!("Wrote {}", meta_path.display());
    Ok(meta_path)
}

/// Writes `report.md` into `<repo_root>/<output_dir>`.
pub fn write_report_md(
    repo_root: &Path,
    output_dir: &str,
    files: &[FileRecord],
    roots: &[PathBuf],
    file_map: Option<&FileMap>,
    stamp: &VersionStamp,
) -> Result<PathBuf> {
    let out_dir = ensure_output_dir(repo_root, output_dir)?;
    let md_path = out_dir.join(REPORT_MD);

    let markdown = render_markdown(repo_root, output_dir, files, roots, file_map, stamp)?;
    fs::write(&md_path, markdown)
        .with_context(|| format!("Failed to write {}", md_path.display()))?;
    debug!("Wrote {}", md_path.display());
    Ok(md_path)
}

pub fn render_meta(
    repo_root: &Path,
    output_dir: &str,
    files: &[FileRecord],
    file_map: Option<&FileMap>,
    stamp: &VersionStamp,
) -> Result<String> {
    let meta = ReportMeta {
        root: repo_root.display().to_string(),
        output_dir,
        generated_at: &stamp.generated_at,
        version: &stamp.version,
        git_commit: &stamp.git_commit,
        files,
        file_map,
    };
    serde_json::to_string_pretty(&meta).context("Failed to serialize report metadata")
}

/// Renders the markdown report, embedding the full content of every file.
pub fn render_markdown(
    repo_root: &Path,
    output_dir: &str,
    files: &[FileRecord],
    roots: &[PathBuf],
    file_map: Option<&FileMap>,
    stamp: &VersionStamp,
) -> Result<String> {
    let roots_display =
        roots.iter().map(|r| display_root(repo_root, r)).collect::<Vec<_>>().join(", ");

    let header = format!(
        "## Atlas Summary\n\
         Root: {}\n\
         Included files: {}\n\
         Roots: {}\n\
         Output dir: {}\n\
         Version: {}\n\
         Git Commit: {}\n\
         Generated At: {}\n\
         \n\
         ---",
        repo_root.display(),
        files.len(),
        roots_display,
        output_dir,
        stamp.version,
        stamp.git_commit,
        stamp.generated_at
    );

    let mut out = String::new();
    out.push_str(&header);
    out.push('\n');
    if let Some(map) = file_map {
        out.push_str(&render_file_map(map));
    }
    out.push('\n');

    for record in files {
        let abs = repo_root.join(&record.path);
        trace!("Embedding {}", abs.display());
        let bytes = fs::read(&abs).with_context(|| format!("Failed to read {}", abs.display()))?;
        out.push_str(&format!(
            "### File: {}\n```{}\n{}\n```\n\n",
            record.path,
            record.language(),
            String::from_utf8_lossy(&bytes)
        ));
    }

    Ok(out)
}

/// Compact imports/exports listing, one bullet per file in path order.
pub fn render_file_map(map: &FileMap) -> String {
    let mut lines = vec!["## File Map".to_string()];
    for (path, xref) in map {
        let imports = if xref.imports.is_empty() { "-".to_string() } else { xref.imports.join(", ") };
        let exports = if xref.exports.is_empty() { "-".to_string() } else { xref.exports.join(", ") };
        lines.push(format!("- **{}**\n  - imports: {}\n  - exports: {}", path, imports, exports));
    }
    lines.push("\n---".to_string());
    lines.join("\n")
}

fn ensure_output_dir(repo_root: &Path, output_dir: &str) -> Result<PathBuf> {
    let out_dir = repo_root.join(output_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    Ok(out_dir)
}

/// Root relative to the repository (`.` for the repository itself).
fn display_root(repo_root: &Path, root: &Path) -> String {
    match root.strip_prefix(repo_root) {
        Ok(rel) => {
            let parts: Vec<String> = rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            if parts.is_empty() { ".".to_string() } else { parts.join("/") }
        }
        Err(_) => root.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::CrossReference;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn stamp() -> VersionStamp {
        VersionStamp {
            version: "0.1.0".to_string(),
            git_commit: "abc1234".to_string(),
            generated_at: "2024-01-02T03:04:05.000Z".to_string(),
        }
    }

    fn sample_map() -> FileMap {
        let mut map = FileMap::new();
        map.insert(
            "src/b.ts".to_string(),
            CrossReference { imports: vec![], exports: vec!["b".to_string()] },
        );
        map.insert(
            "src/a.ts".to_string(),
            CrossReference {
                imports: vec!["./b".to_string(), "react".to_string()],
                exports: vec!["default".to_string()],
            },
        );
        map
    }

    #[test]
    fn test_render_file_map() {
        let rendered = render_file_map(&sample_map());
        assert_eq!(
            rendered,
            "## File Map\n\
             - **src/a.ts**\n  - imports: ./b, react\n  - exports: default\n\
             - **src/b.ts**\n  - imports: -\n  - exports: b\n\
             \n---"
        );
    }

    #[test]
    fn test_render_markdown_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "export default 1;");
        create_test_file(root, "notes.txt", "plain");

        let files = vec![FileRecord::new("notes.txt"), FileRecord::new("src/a.ts")];
        let roots = vec![root.to_path_buf(), root.join("src")];
        let md = render_markdown(root, ".atlas", &files, &roots, None, &stamp()).unwrap();

        let expected_header = format!(
            "## Atlas Summary\nRoot: {}\nIncluded files: 2\nRoots: ., src\nOutput dir: .atlas\n\
             Version: 0.1.0\nGit Commit: abc1234\nGenerated At: 2024-01-02T03:04:05.000Z\n\n---\n\n",
            root.display()
        );
        assert!(md.starts_with(&expected_header));
        assert!(md.contains("### File: notes.txt\n```\nplain\n```\n\n"));
        assert!(md.ends_with("### File: src/a.ts\n```ts\nexport default 1;\n```\n\n"));
        assert!(!md.contains("## File Map"));
    }

    #[test]
    fn test_render_markdown_includes_file_map() {
        let temp_dir = TempDir::new().unwrap();
        let md = render_markdown(temp_dir.path(), ".atlas", &[], &[], Some(&sample_map()), &stamp())
            .unwrap();
        assert!(md.contains("---\n## File Map\n- **src/a.ts**"));
        assert!(md.ends_with("\n---\n"));
    }

    #[test]
    fn test_render_markdown_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![FileRecord::new("gone.md")];
        let result = render_markdown(temp_dir.path(), ".atlas", &files, &[], None, &stamp());
        assert!(result.is_err());
    }

    #[test]
    fn test_render_meta_key_order_and_optional_map() {
        let root = Path::new("/repo");
        let files = vec![FileRecord::new("a.ts")];

        let json = render_meta(root, ".atlas", &files, None, &stamp()).unwrap();
        let keys: Vec<&str> = json
            .lines()
            .filter(|l| l.starts_with("  \""))
            .map(|l| l.trim().split('"').nth(1).unwrap())
            .collect();
        assert_eq!(keys, vec!["root", "outputDir", "generatedAt", "version", "gitCommit", "files"]);
        assert!(json.contains("\"files\": [\n    \"a.ts\"\n  ]"));

        let json = render_meta(root, ".atlas", &files, Some(&sample_map()), &stamp()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fileMap"]["src/a.ts"]["imports"][1], "react");
        assert_eq!(value["root"], "/repo");
    }

    #[test]
    fn test_write_reports_create_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "a.md", "# a");
        let files = vec![FileRecord::new("a.md")];

        let meta = write_report_meta(root, "out/nested", &files, None, &stamp()).unwrap();
        let md = write_report_md(root, "out/nested", &files, &[], None, &stamp()).unwrap();

        assert_eq!(meta, root.join("out/nested").join(REPORT_META));
        assert!(fs::read_to_string(md).unwrap().contains("### File: a.md\n```md\n# a\n```"));
    }
}
