use anyhow::{Context, Result, anyhow, bail};
use atlas_core::{
    DEFAULT_EXCLUDE, DEFAULT_IMPORT_IGNORE, DEFAULT_INCLUDE, DEFAULT_MAX_BYTES, DEFAULT_OUTPUT_DIR,
    RootDetection, ScanConfig, detect_roots, find_repo_root, normalize_root,
};
use clap::Parser;
use log::{debug, info, trace};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the optional settings file at the repository root.
pub const SETTINGS_FILE: &str = "atlas.json";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "build")]
#[command(about = "Scan the repository and write the atlas report")]
pub struct Config {
    /// Repository root (defaults to the nearest ancestor containing .git)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Scan roots, comma-separated (overrides atlas.json and auto-detection)
    #[arg(long, value_delimiter = ',')]
    pub roots: Vec<String>,

    /// Include globs, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Exclude globs, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Maximum file size in bytes
    #[arg(long)]
    pub max_bytes: Option<u64>,

    /// Write report.meta.json only
    #[arg(long)]
    pub meta_only: bool,

    /// Skip the imports/exports map
    #[arg(long)]
    pub no_file_map: bool,

    /// Honour .gitignore and .ignore files while scanning
    #[arg(long)]
    pub gitignore: bool,
}

/// Contents of `atlas.json`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub output_dir: Option<String>,
    pub roots: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_bytes: Option<u64>,
    pub import_ignore: Vec<String>,
    pub respect_gitignore: Option<bool>,
    pub auto_roots: AutoRoots,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoRoots {
    pub package_dirs: Option<Vec<String>>,
    pub markers: Option<Vec<String>>,
    pub source_dir: Option<String>,
}

impl AutoRoots {
    fn detection(&self) -> RootDetection {
        let defaults = RootDetection::default();
        RootDetection {
            package_dirs: self.package_dirs.clone().unwrap_or(defaults.package_dirs),
            markers: self.markers.clone().unwrap_or(defaults.markers),
            source_dir: self.source_dir.clone().unwrap_or(defaults.source_dir),
        }
    }
}

/// Everything a build needs, resolved from CLI flags, settings and defaults.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub repo_root: PathBuf,
    pub scan: ScanConfig,
    pub meta_only: bool,
    pub file_map: bool,
}

impl Config {
    /// Resolves the repository root from `cwd` (or `--root`), loads
    /// `atlas.json` and merges it with the command-line overrides.
    pub fn resolve(&self, cwd: &Path) -> Result<BuildPlan> {
        let repo_root = match &self.root {
            Some(r) => {
                debug!("Using provided root directory: {:?}", r);
                let abs = if r.is_absolute() { r.clone() } else { cwd.join(r) };
                let root = abs
                    .canonicalize()
                    .with_context(|| format!("Repository root {} is not accessible", abs.display()))?;
                if !root.is_dir() {
                    bail!("Repository root {} is not a directory", root.display());
                }
                root
            }
            None => {
                debug!("No root provided, searching from {:?}", cwd);
                find_repo_root(cwd)
            }
        };
        info!("Using root directory: {}", repo_root.display());

        let settings = load_settings(&repo_root)?;
        let scan = merge_scan_config(&repo_root, &settings, self)?;

        Ok(BuildPlan {
            repo_root,
            scan,
            meta_only: self.meta_only,
            file_map: !self.no_file_map,
        })
    }
}

/// Reads `atlas.json` from the repository root. A missing file yields defaults;
/// an unreadable or malformed one is an error.
pub fn load_settings(repo_root: &Path) -> Result<Settings> {
    let path = repo_root.join(SETTINGS_FILE);
    if !path.exists() {
        debug!("No {} found, using defaults", SETTINGS_FILE);
        return Ok(Settings::default());
    }

    trace!("Reading settings from {:?}", path);
    let raw =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

/// Merges one field: a non-empty override wins, then a non-empty settings
/// value, then the default.
fn pick(overrides: &[String], settings: &[String], defaults: &[&str]) -> Vec<String> {
    if !overrides.is_empty() {
        overrides.to_vec()
    } else if !settings.is_empty() {
        settings.to_vec()
    } else {
        defaults.iter().map(|s| s.to_string()).collect()
    }
}

pub fn merge_scan_config(repo_root: &Path, settings: &Settings, cli: &Config) -> Result<ScanConfig> {
    let explicit = if !cli.roots.is_empty() { &cli.roots } else { &settings.roots };
    let roots = if explicit.is_empty() {
        detect_roots(repo_root, &settings.auto_roots.detection())
    } else {
        explicit.iter().map(|r| normalize_root(repo_root, Path::new(r))).collect()
    };

    let max_bytes = cli.max_bytes.or(settings.max_bytes).unwrap_or(DEFAULT_MAX_BYTES);
    if max_bytes == 0 {
        return Err(anyhow!("maxBytes must be a positive number of bytes"));
    }

    let output_dir = match settings.output_dir.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => normalize_output_dir(repo_root, dir)?,
        _ => DEFAULT_OUTPUT_DIR.to_string(),
    };

    let import_ignore = pick(&[], &settings.import_ignore, DEFAULT_IMPORT_IGNORE)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();

    Ok(ScanConfig {
        roots,
        include: pick(&cli.include, &settings.include, DEFAULT_INCLUDE),
        exclude: pick(&cli.exclude, &settings.exclude, DEFAULT_EXCLUDE),
        max_bytes,
        import_ignore,
        output_dir,
        respect_gitignore: cli.gitignore || settings.respect_gitignore.unwrap_or(false),
    })
}

/// Resolves `outputDir` to a clean `/`-separated path relative to the
/// repository root. It must name a directory strictly inside the repository.
fn normalize_output_dir(repo_root: &Path, dir: &str) -> Result<String> {
    let abs = normalize_root(repo_root, Path::new(dir));
    let rel = match abs.strip_prefix(repo_root) {
        Ok(rel) => rel,
        Err(_) => bail!("outputDir '{}' points outside the repository", dir),
    };
    if rel.as_os_str().is_empty() {
        bail!("outputDir '{}' points at the repository root", dir);
    }

    let normalized = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    trace!("Normalized outputDir '{}' to '{}'", dir, normalized);
    Ok(normalized)
}
