use anyhow::{Context, Result};
use atlas_build::Config;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(version)]
#[command(about = "Generate a point-in-time atlas of a source repository", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan the repository and write report.md and report.meta.json
    Build(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Build(cfg) => {
            info!("Running atlas build (using {} threads)", rayon::current_num_threads());
            debug!("Config: root={:?}, roots={:?}", cfg.root, cfg.roots);

            let cwd = std::env::current_dir().context("Failed to read the current directory")?;
            let result = atlas_build::run_build(cfg, &cwd, env!("CARGO_PKG_VERSION"))?;
            debug!("Wrote {} artifacts", result.artifacts.len());

            atlas_build::print_build_summary(&mut stdout, &result, start.elapsed().as_millis())?;
            stdout.flush()?;

            Ok(())
        }
    }
}
