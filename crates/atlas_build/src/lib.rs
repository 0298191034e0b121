//! The `atlas build` command.
//!
//! Resolves configuration (CLI flags over `atlas.json` over defaults), runs
//! the core scan, and writes `report.md` and `report.meta.json` into the
//! output directory.
//!
//! # Examples
//!
//! ```no_run
//! use atlas_build::{Config, run_build};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config { root: Some(std::path::PathBuf::from("/path/to/repo")), ..Config::default() };
//! let cwd = std::env::current_dir()?;
//!
//! let result = run_build(cfg, &cwd, env!("CARGO_PKG_VERSION"))?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! atlas_build::print_build_summary(&mut stdout, &result, 0)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod reporter;
mod stamp;
mod types;
mod writer;

// Re-export public API
pub use builder::run_build;
pub use config::{AutoRoots, BuildPlan, Config, SETTINGS_FILE, Settings, load_settings};
pub use reporter::print_build_summary;
pub use stamp::VersionStamp;
pub use types::BuildResult;
pub use writer::{
    REPORT_MD, REPORT_META, render_file_map, render_markdown, write_report_md, write_report_meta,
};
