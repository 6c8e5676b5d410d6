//! Per-user key/value store mirroring every piece of session state on disk.
//!
//! Each [`StorageKey`] maps to one file under `<root>/store/`. Records are
//! JSON; ids, URLs and API keys are plain strings. The `get_*`/`set_*`
//! methods are best-effort: failures are logged and swallowed so a broken
//! store never aborts a user action. The `load_*`/`save_*` methods return
//! errors for callers that need them.
//!
//! There is no cross-process locking; two concurrent `pathcoach` processes
//! may race and the last write wins.

use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    CurrentState,
    DesiredState,
    UserInfo,
    GeneratedPlan,
    SongLyrics,
    SongAudioUrl,
    SongTaskId,
    SongProgress,
    LastError,
    TextApiKey,
    MusicApiKey,
}

impl StorageKey {
    pub fn all() -> &'static [StorageKey] {
        &[
            StorageKey::CurrentState,
            StorageKey::DesiredState,
            StorageKey::UserInfo,
            StorageKey::GeneratedPlan,
            StorageKey::SongLyrics,
            StorageKey::SongAudioUrl,
            StorageKey::SongTaskId,
            StorageKey::SongProgress,
            StorageKey::LastError,
            StorageKey::TextApiKey,
            StorageKey::MusicApiKey,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::CurrentState => "current_state",
            StorageKey::DesiredState => "desired_state",
            StorageKey::UserInfo => "user_info",
            StorageKey::GeneratedPlan => "generated_plan",
            StorageKey::SongLyrics => "song_lyrics",
            StorageKey::SongAudioUrl => "song_audio_url",
            StorageKey::SongTaskId => "song_task_id",
            StorageKey::SongProgress => "song_progress",
            StorageKey::LastError => "last_error",
            StorageKey::TextApiKey => "openai_api_key",
            StorageKey::MusicApiKey => "suno_api_key",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, StorageKey::TextApiKey | StorageKey::MusicApiKey)
    }

    fn is_plain(self) -> bool {
        matches!(
            self,
            StorageKey::SongAudioUrl
                | StorageKey::SongTaskId
                | StorageKey::LastError
                | StorageKey::TextApiKey
                | StorageKey::MusicApiKey
        )
    }

    pub fn filename(self) -> String {
        let ext = if self.is_plain() { "txt" } else { "json" };
        format!("{}.{ext}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    /// Store rooted at `<root>/store`.
    pub fn open(root: &Path) -> Self {
        Store::new(paths::store_dir(root))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(key.filename())
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.path(key).exists()
    }

    // -----------------------------------------------------------------------
    // Strict API
    // -----------------------------------------------------------------------

    pub fn load_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save_json<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<()> {
        let data = serde_json::to_string_pretty(value)?;
        self.write(key, data.as_bytes())
    }

    /// Plain-string value; blank files read as `None`.
    pub fn load_string(&self, key: StorageKey) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path)?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    pub fn save_string(&self, key: StorageKey, value: &str) -> Result<()> {
        self.write(key, value.trim().as_bytes())
    }

    /// Delete the record for `key` (no-op if none exists).
    pub fn remove(&self, key: StorageKey) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Remove every session record. API keys survive when `keep_keys` is set.
    pub fn clear_session(&self, keep_keys: bool) -> Result<()> {
        for &key in StorageKey::all() {
            if keep_keys && key.is_secret() {
                continue;
            }
            self.remove(key)?;
        }
        Ok(())
    }

    fn write(&self, key: StorageKey, data: &[u8]) -> Result<()> {
        let path = self.path(key);
        atomic_write(&path, data)?;
        if key.is_secret() {
            restrict_permissions(&path)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Best-effort API
    // -----------------------------------------------------------------------

    pub fn get_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        self.load_json(key).unwrap_or_else(|e| {
            tracing::warn!(key = key.as_str(), error = %e, "failed to read stored record");
            None
        })
    }

    pub fn set_json<T: Serialize>(&self, key: StorageKey, value: &T) -> bool {
        match self.save_json(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "failed to store record");
                false
            }
        }
    }

    pub fn get_string(&self, key: StorageKey) -> Option<String> {
        self.load_string(key).unwrap_or_else(|e| {
            tracing::warn!(key = key.as_str(), error = %e, "failed to read stored value");
            None
        })
    }

    pub fn set_string(&self, key: StorageKey, value: &str) -> bool {
        match self.save_string(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "failed to store value");
                false
            }
        }
    }

    pub fn forget(&self, key: StorageKey) {
        if let Err(e) = self.remove(key) {
            tracing::warn!(key = key.as_str(), error = %e, "failed to remove stored value");
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
