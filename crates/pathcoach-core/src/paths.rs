use crate::error::{CoachError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Default data root under the user's home directory.
pub const DEFAULT_DIR: &str = ".pathcoach";
pub const CONFIG_FILE: &str = "config.yaml";
pub const STORE_DIR: &str = "store";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn default_root() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(DEFAULT_DIR))
        .ok_or(CoachError::HomeNotFound)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn store_dir(root: &Path) -> PathBuf {
    root.join(STORE_DIR)
}
