//! mk: the build script for this workspace.
//!
//! ```bash
//! # List targets
//! mk
//!
//! # Format check, lint and compile
//! mk verify
//!
//! # Echo every command that runs
//! mk -v build test
//! ```

mod cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use mkrs_lib::{Build, BuildOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let root = workspace_root()?;
  std::env::set_current_dir(&root).with_context(|| format!("Failed to enter workspace {}", root.display()))?;
  debug!(root = %root.display(), "running from workspace root");

  let mut b = Build::new(BuildOptions::from_env().env("RUST_BACKTRACE", "1"));
  b.register(cmd::commands());
  Ok(b.build_from_os_args())
}

/// The workspace root, two levels above this crate's manifest.
fn workspace_root() -> Result<PathBuf> {
  let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  manifest_dir
    .ancestors()
    .nth(2)
    .map(PathBuf::from)
    .context("mk must live in crates/<name> inside the workspace")
}
