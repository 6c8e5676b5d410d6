use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status string reported by the music API for a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    TextSuccess,
    FirstSuccess,
    Success,
    CreateTaskFailed,
    GenerateAudioFailed,
    CallbackException,
    SensitiveWordError,
    /// Any status this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::TextSuccess => "TEXT_SUCCESS",
            TaskStatus::FirstSuccess => "FIRST_SUCCESS",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::CreateTaskFailed => "CREATE_TASK_FAILED",
            TaskStatus::GenerateAudioFailed => "GENERATE_AUDIO_FAILED",
            TaskStatus::CallbackException => "CALLBACK_EXCEPTION",
            TaskStatus::SensitiveWordError => "SENSITIVE_WORD_ERROR",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            TaskStatus::CreateTaskFailed
                | TaskStatus::GenerateAudioFailed
                | TaskStatus::CallbackException
                | TaskStatus::SensitiveWordError
        )
    }

    pub fn is_terminal(self) -> bool {
        self == TaskStatus::Success || self.is_failure()
    }

    /// Progress shown to the user; `None` keeps the previous value.
    pub fn progress_percent(self) -> Option<u8> {
        match self {
            TaskStatus::Pending => Some(25),
            TaskStatus::TextSuccess => Some(50),
            TaskStatus::FirstSuccess => Some(75),
            TaskStatus::Success => Some(100),
            _ => None,
        }
    }

    pub fn progress_message(self) -> &'static str {
        match self {
            TaskStatus::Pending => "task queued, waiting for the generator",
            TaskStatus::TextSuccess => "lyrics accepted, composing music",
            TaskStatus::FirstSuccess => "first track ready, finishing audio",
            TaskStatus::Success => "audio ready",
            TaskStatus::Unknown => "still processing",
            _ => "generation failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskRecord
// ---------------------------------------------------------------------------

/// One status poll, reduced to what the client acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    /// First track's `audioUrl`, falling back to `streamAudioUrl`.
    pub audio_url: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    InProgress,
    Succeeded { audio_url: String },
    Failed { reason: String },
}

impl TaskRecord {
    pub fn verdict(&self) -> Verdict {
        if self.status == TaskStatus::Success {
            return match self.audio_url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => Verdict::Succeeded {
                    audio_url: url.to_string(),
                },
                _ => Verdict::Failed {
                    reason: "the service reported success but returned no audio URL".to_string(),
                },
            };
        }
        if let Some(msg) = self.error_message.as_deref().map(str::trim) {
            if !msg.is_empty() {
                return Verdict::Failed {
                    reason: format!("audio generation failed: {msg}"),
                };
            }
        }
        if self.status.is_failure() {
            return Verdict::Failed {
                reason: format!("audio generation failed: {}", self.status),
            };
        }
        Verdict::InProgress
    }
}

// ---------------------------------------------------------------------------
// SongProgress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    NotStarted,
    Submitted,
    Polling,
    Succeeded,
    Failed,
    /// Poll window exhausted without a terminal status; may be resumed.
    TimedOut,
}

impl TaskPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPhase::NotStarted => "not_started",
            TaskPhase::Submitted => "submitted",
            TaskPhase::Polling => "polling",
            TaskPhase::Succeeded => "succeeded",
            TaskPhase::Failed => "failed",
            TaskPhase::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskPhase::Succeeded | TaskPhase::Failed)
    }
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted progress of the audio-generation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongProgress {
    pub phase: TaskPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub percent: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SongProgress {
    fn default() -> Self {
        Self {
            phase: TaskPhase::NotStarted,
            task_id: None,
            status: None,
            percent: 0,
            message: "not started".to_string(),
            audio_url: None,
            error: None,
            updated_at: Utc::now(),
        }
    }
}

impl SongProgress {
    pub fn submitted(task_id: impl Into<String>) -> Self {
        Self {
            phase: TaskPhase::Submitted,
            task_id: Some(task_id.into()),
            percent: 10,
            message: "task submitted".to_string(),
            ..Self::default()
        }
    }

    /// Record an intermediate poll result. Terminal phases are left alone.
    pub fn observe(&mut self, status: TaskStatus) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = TaskPhase::Polling;
        self.status = Some(status);
        if let Some(p) = status.progress_percent() {
            self.percent = self.percent.max(p);
        }
        self.message = status.progress_message().to_string();
        self.updated_at = Utc::now();
    }

    pub fn succeed(&mut self, audio_url: impl Into<String>) {
        self.phase = TaskPhase::Succeeded;
        self.status = Some(TaskStatus::Success);
        self.percent = 100;
        self.message = TaskStatus::Success.progress_message().to_string();
        self.audio_url = Some(audio_url.into());
        self.error = None;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        self.phase = TaskPhase::Failed;
        self.message = reason.clone();
        self.error = Some(reason);
        self.updated_at = Utc::now();
    }

    pub fn time_out(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = TaskPhase::TimedOut;
        self.message = "still processing, check back later with 'pathcoach song resume'".to_string();
        self.updated_at = Utc::now();
    }

    /// A task id without a terminal outcome can be polled again.
    pub fn is_resumable(&self) -> bool {
        self.task_id.is_some()
            && matches!(
                self.phase,
                TaskPhase::Submitted | TaskPhase::Polling | TaskPhase::TimedOut
            )
    }
}
