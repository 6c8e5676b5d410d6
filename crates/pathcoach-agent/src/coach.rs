use crate::chat::ChatClient;
use crate::music::MusicClient;
use crate::poller::{poll_task, PollOutcome, PollPolicy};
use crate::retry::{with_retry, RetryPolicy};
use crate::Result;
use pathcoach_core::config::Config;
use pathcoach_core::credentials::Credential;
use pathcoach_core::prompt::{plan_prompt, song_prompt};
use pathcoach_core::session::Session;
use pathcoach_core::store::{StorageKey, Store};
use pathcoach_core::task::SongProgress;
use pathcoach_core::types::{GeneratedPlan, SongData};
use pathcoach_core::validate::validate_inputs;
use pathcoach_core::CoachError;
use serde::Serialize;

// ─── Reports ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongReport {
    pub task_id: String,
    pub outcome: PollOutcome,
    pub progress: SongProgress,
}

/// Result of a full plan → lyrics → audio run. The plan is always present;
/// a song failure is reported alongside it instead of replacing it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingReport {
    pub plan: GeneratedPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SongData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<SongReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_error: Option<String>,
}

// ─── Coach ──────────────────────────────────────────────────────────────────

/// Drives the generation flow against the stored session.
///
/// Inputs are validated before any request is made. Every failure is also
/// written to the session's last-error record so it survives the process.
pub struct Coach {
    store: Store,
    session: Session,
    chat: Option<ChatClient>,
    music: Option<MusicClient>,
    retry: RetryPolicy,
    poll: PollPolicy,
    auto_song: bool,
}

impl Coach {
    pub fn new(store: Store, config: &Config) -> Self {
        let session = Session::load(&store);
        Coach {
            store,
            session,
            chat: None,
            music: None,
            retry: RetryPolicy::from(&config.retry),
            poll: PollPolicy::from(&config.polling),
            auto_song: config.auto_song,
        }
    }

    pub fn with_chat(mut self, chat: ChatClient) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_music(mut self, music: MusicClient) -> Self {
        self.music = Some(music);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn fail<T>(&mut self, err: impl Into<crate::AgentError>) -> Result<T> {
        let err = err.into();
        self.session.record_error(&self.store, &err.to_string());
        Err(err)
    }

    /// Build the plan prompt, call the text API and persist the result.
    pub async fn generate_plan(&mut self) -> Result<GeneratedPlan> {
        let prompt = match validate_inputs(
            &self.session.current,
            &self.session.desired,
            self.session.user.as_ref(),
        ) {
            Ok(user) => plan_prompt(&self.session.current, &self.session.desired, user),
            Err(e) => return self.fail(e),
        };
        let Some(chat) = self.chat.as_ref() else {
            return self.fail(CoachError::MissingCredential(Credential::TextApi));
        };

        let prompt = &prompt;
        let result = with_retry(self.retry, "plan", move || {
            chat.complete_json::<GeneratedPlan>(prompt)
        })
        .await
        .and_then(|plan| {
            plan.validate()?;
            Ok(plan)
        });
        let plan = match result {
            Ok(plan) => plan,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = self.session.save_plan(&self.store, plan.clone()) {
            return self.fail(e);
        }
        self.session.clear_error(&self.store);
        tracing::info!(steps = plan.steps.len(), "plan generated");
        Ok(plan)
    }

    /// Ask the text API for song lyrics. Never touches the stored plan.
    pub async fn generate_lyrics(&mut self) -> Result<SongData> {
        let prompt = match validate_inputs(
            &self.session.current,
            &self.session.desired,
            self.session.user.as_ref(),
        ) {
            Ok(user) => song_prompt(&self.session.current, &self.session.desired, user),
            Err(e) => return self.fail(e),
        };
        let Some(chat) = self.chat.as_ref() else {
            return self.fail(CoachError::MissingCredential(Credential::TextApi));
        };

        let prompt = &prompt;
        let result = with_retry(self.retry, "lyrics", move || {
            chat.complete_json::<SongData>(prompt)
        })
        .await
        .and_then(|song| {
            song.validate()?;
            Ok(song)
        });
        let song = match result {
            Ok(song) => song,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = self.session.save_song(&self.store, song.clone()) {
            return self.fail(e);
        }
        self.session.clear_error(&self.store);
        tracing::info!(title = %song.title, "lyrics generated");
        Ok(song)
    }

    /// Submit the stored lyrics and poll until the task settles. An
    /// unfinished task for the same lyrics is polled again instead of
    /// submitting a new one; new lyrics always clear the old task.
    pub async fn render_audio<F>(&mut self, on_progress: F) -> Result<SongReport>
    where
        F: FnMut(&SongProgress),
    {
        let Some(song) = self.session.song.clone() else {
            return self.fail(CoachError::MissingLyrics);
        };
        if let Some(task_id) = self.session.resumable_task().map(str::to_string) {
            tracing::info!(task_id = %task_id, "unfinished music task found, resuming it");
            let progress = self.stored_progress(&task_id);
            return self.follow(task_id, progress, on_progress).await;
        }
        let Some(music) = self.music.as_ref() else {
            return self.fail(CoachError::MissingCredential(Credential::MusicApi));
        };

        let song = &song;
        let task_id = match with_retry(self.retry, "submit", move || music.submit(song)).await {
            Ok(id) => id,
            Err(e) => {
                let mut progress = SongProgress::default();
                progress.fail(e.to_string());
                if let Err(save) = self.session.save_progress(&self.store, progress) {
                    tracing::warn!(error = %save, "failed to store song progress");
                }
                return self.fail(e);
            }
        };

        let progress = SongProgress::submitted(&task_id);
        if let Err(e) = self.session.save_task(&self.store, &task_id, progress.clone()) {
            return self.fail(e);
        }
        self.follow(task_id, progress, on_progress).await
    }

    /// Continue polling a task left unfinished by an earlier run.
    pub async fn resume_audio<F>(&mut self, on_progress: F) -> Result<SongReport>
    where
        F: FnMut(&SongProgress),
    {
        let Some(task_id) = self.session.resumable_task().map(str::to_string) else {
            return self.fail(CoachError::NothingToResume);
        };
        let progress = self.stored_progress(&task_id);
        tracing::info!(task_id = %task_id, "resuming music task");
        self.follow(task_id, progress, on_progress).await
    }

    fn stored_progress(&self, task_id: &str) -> SongProgress {
        self.session
            .progress
            .clone()
            .filter(|p| p.task_id.as_deref() == Some(task_id))
            .unwrap_or_else(|| SongProgress::submitted(task_id))
    }

    async fn follow<F>(
        &mut self,
        task_id: String,
        mut progress: SongProgress,
        mut on_progress: F,
    ) -> Result<SongReport>
    where
        F: FnMut(&SongProgress),
    {
        let Some(music) = self.music.as_ref() else {
            return self.fail(CoachError::MissingCredential(Credential::MusicApi));
        };

        let store = &self.store;
        let outcome = poll_task(music, &task_id, self.poll, |record| {
            progress.observe(record.status);
            store.set_json(StorageKey::SongProgress, &progress);
            on_progress(&progress);
        })
        .await;

        match &outcome {
            PollOutcome::Success { audio_url } => {
                progress.succeed(audio_url.as_str());
                self.session.save_audio_url(&self.store, audio_url)?;
                self.session.clear_error(&self.store);
            }
            PollOutcome::Failed { reason } => {
                progress.fail(reason.as_str());
                self.session.record_error(&self.store, reason);
            }
            PollOutcome::TimedOut { .. } => progress.time_out(),
        }
        on_progress(&progress);
        self.session.save_progress(&self.store, progress.clone())?;

        Ok(SongReport {
            task_id,
            outcome,
            progress,
        })
    }

    /// Plan first, then lyrics and audio when `auto_song` is on. Only a plan
    /// failure is an error; song failures land in `song_error`.
    pub async fn run<F>(&mut self, on_progress: F) -> Result<CoachingReport>
    where
        F: FnMut(&SongProgress),
    {
        let plan = self.generate_plan().await?;
        let mut report = CoachingReport {
            plan,
            song: None,
            audio: None,
            song_error: None,
        };
        if !self.auto_song {
            return Ok(report);
        }

        match self.generate_lyrics().await {
            Ok(song) => report.song = Some(song),
            Err(e) => {
                tracing::warn!(error = %e, "lyrics generation failed, plan kept");
                report.song_error = Some(e.to_string());
                return Ok(report);
            }
        }

        match self.render_audio(on_progress).await {
            Ok(audio) => {
                if let PollOutcome::Failed { reason } = &audio.outcome {
                    report.song_error = Some(reason.clone());
                }
                report.audio = Some(audio);
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio generation failed, plan kept");
                report.song_error = Some(e.to_string());
            }
        }
        Ok(report)
    }
}
