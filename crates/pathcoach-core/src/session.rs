use crate::error::Result;
use crate::store::{StorageKey, Store};
use crate::task::SongProgress;
use crate::types::{CurrentState, DesiredState, GeneratedPlan, SongData, UserInfo};
use serde::Serialize;

/// Everything the user has entered or generated so far, read from the store
/// in one pass at start-up. Writes go through the `save_*` helpers so the
/// snapshot and the store stay in step.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub current: CurrentState,
    pub desired: DesiredState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<GeneratedPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SongData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<SongProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Session {
    /// Best-effort load: unreadable records come back empty.
    pub fn load(store: &Store) -> Self {
        Session {
            current: store.get_json(StorageKey::CurrentState).unwrap_or_default(),
            desired: store.get_json(StorageKey::DesiredState).unwrap_or_default(),
            user: store.get_json(StorageKey::UserInfo),
            plan: store.get_json(StorageKey::GeneratedPlan),
            song: store.get_json(StorageKey::SongLyrics),
            audio_url: store.get_string(StorageKey::SongAudioUrl),
            task_id: store.get_string(StorageKey::SongTaskId),
            progress: store.get_json(StorageKey::SongProgress),
            last_error: store.get_string(StorageKey::LastError),
        }
    }

    pub fn save_current(&mut self, store: &Store, current: CurrentState) -> Result<()> {
        store.save_json(StorageKey::CurrentState, &current)?;
        self.current = current;
        Ok(())
    }

    pub fn save_desired(&mut self, store: &Store, desired: DesiredState) -> Result<()> {
        store.save_json(StorageKey::DesiredState, &desired)?;
        self.desired = desired;
        Ok(())
    }

    pub fn save_user(&mut self, store: &Store, user: UserInfo) -> Result<()> {
        store.save_json(StorageKey::UserInfo, &user)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn save_plan(&mut self, store: &Store, plan: GeneratedPlan) -> Result<()> {
        store.save_json(StorageKey::GeneratedPlan, &plan)?;
        self.plan = Some(plan);
        Ok(())
    }

    /// New lyrics invalidate any audio rendered for the previous ones.
    pub fn save_song(&mut self, store: &Store, song: SongData) -> Result<()> {
        store.save_json(StorageKey::SongLyrics, &song)?;
        self.song = Some(song);
        self.clear_audio(store)?;
        Ok(())
    }

    pub fn save_task(&mut self, store: &Store, task_id: &str, progress: SongProgress) -> Result<()> {
        store.save_string(StorageKey::SongTaskId, task_id)?;
        store.remove(StorageKey::SongAudioUrl)?;
        self.task_id = Some(task_id.to_string());
        self.audio_url = None;
        self.save_progress(store, progress)
    }

    pub fn save_progress(&mut self, store: &Store, progress: SongProgress) -> Result<()> {
        store.save_json(StorageKey::SongProgress, &progress)?;
        self.progress = Some(progress);
        Ok(())
    }

    pub fn save_audio_url(&mut self, store: &Store, url: &str) -> Result<()> {
        store.save_string(StorageKey::SongAudioUrl, url)?;
        self.audio_url = Some(url.to_string());
        Ok(())
    }

    fn clear_audio(&mut self, store: &Store) -> Result<()> {
        for key in [
            StorageKey::SongAudioUrl,
            StorageKey::SongTaskId,
            StorageKey::SongProgress,
        ] {
            store.remove(key)?;
        }
        self.audio_url = None;
        self.task_id = None;
        self.progress = None;
        Ok(())
    }

    /// Persist the message shown inline until the next successful action.
    pub fn record_error(&mut self, store: &Store, message: &str) {
        store.set_string(StorageKey::LastError, message);
        self.last_error = Some(message.to_string());
    }

    pub fn clear_error(&mut self, store: &Store) {
        if self.last_error.take().is_some() {
            store.forget(StorageKey::LastError);
        }
    }

    /// Task id of an audio render that was interrupted before finishing.
    pub fn resumable_task(&self) -> Option<&str> {
        if self.audio_url.is_some() {
            return None;
        }
        match &self.progress {
            Some(p) if p.is_resumable() => p.task_id.as_deref(),
            Some(_) => None,
            None => self.task_id.as_deref(),
        }
    }
}
