//! Constants for file extensions, filter thresholds and scan defaults.
//!
//! ## Source Extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)
//!
//! Only files with one of these extensions get a cross-reference entry.
//! Markup, data and documentation files are listed but never parsed.

/// File extensions treated as executable source for cross-referencing
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Same-stem preference order, highest first. Anything else ranks 0.
pub const EXTENSION_RANKS: &[(&str, u8)] = &[("tsx", 4), ("ts", 3), ("jsx", 2), ("js", 1)];

/// Bytes inspected by the printable-ratio half of the binary heuristic
pub const BINARY_SAMPLE_BYTES: usize = 4096;

/// Share of non-text bytes in the sample above which a file is binary
pub const BINARY_MAX_UNPRINTABLE_RATIO: f64 = 0.2;

pub const DEFAULT_OUTPUT_DIR: &str = ".atlas";

pub const DEFAULT_MAX_BYTES: u64 = 256 * 1024;

pub const DEFAULT_INCLUDE: &[&str] =
    &["**/*.{ts,tsx,js,jsx,mjs,cjs}", "**/*.{json,yaml,yml}", "**/*.{md,mdx}"];

pub const DEFAULT_EXCLUDE: &[&str] = &[
    "**/node_modules/**",
    ".git/**",
    "**/dist/**",
    ".atlas/**",
    "**/*.d.ts",
    "**/*.map",
    "**/.DS_Store",
    "**/.next/**",
    "**/.turbo/**",
    "**/.cache/**",
    // stray compiled JS next to TS sources
    "**/src/**/*.js",
    "**/src/**/*.js.map",
];

/// Placeholder specifiers that only add noise to the file map
pub const DEFAULT_IMPORT_IGNORE: &[&str] = &["pkg", "side-effect"];

/// Top-level directories whose children are treated as packages
pub const DEFAULT_PACKAGE_DIRS: &[&str] = &["apps", "packages"];

/// Files that mark a multi-package workspace
pub const DEFAULT_WORKSPACE_MARKERS: &[&str] = &["pnpm-workspace.yaml"];

pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Rank of an extension under the same-stem preference rule.
pub fn extension_rank(ext: &str) -> u8 {
    EXTENSION_RANKS.iter().find(|(e, _)| *e == ext).map(|(_, rank)| *rank).unwrap_or(0)
}
