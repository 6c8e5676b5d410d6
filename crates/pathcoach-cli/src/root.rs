use anyhow::Context;
use pathcoach_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the data directory.
///
/// Priority:
/// 1. `--root` flag / `PATHCOACH_HOME` env var (passed in as `explicit`)
/// 2. `~/.pathcoach`
pub fn resolve_root(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    paths::default_root().context("cannot locate the data directory")
}
