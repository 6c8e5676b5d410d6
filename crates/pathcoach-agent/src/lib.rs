//! `pathcoach-agent` — async clients for the two generation services and
//! the flow that chains them.
//!
//! # Architecture
//!
//! ```text
//! Coach
//!   │ validate_inputs → plan_prompt / song_prompt      (pathcoach-core)
//!   ▼
//! ChatClient   ← POST {text_base}/chat/completions, JSON response format
//!   │            content recovered with extract_json (fences, first object)
//!   ▼
//! MusicClient  ← POST {music_base}/generate → taskId
//!   │
//!   ▼
//! poll_task    ← GET {music_base}/generate/record-info?taskId=…
//!                immediate first check, fixed interval, max duration
//! ```
//!
//! Every request carries a bounded timeout. Failures map onto
//! [`AgentError`] variants with distinct, actionable messages; a song failure
//! never rolls back a generated plan.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pathcoach_agent::{ChatClient, Coach, MusicClient};
//! use pathcoach_core::{config::Config, store::Store};
//!
//! let config = Config::default();
//! let mut coach = Coach::new(Store::open(root), &config)
//!     .with_chat(ChatClient::new(&config.text_api, text_key)?)
//!     .with_music(MusicClient::new(&config.music_api, music_key)?);
//! let report = coach.run(|p| println!("{}% {}", p.percent, p.message)).await?;
//! ```

pub mod chat;
pub mod coach;
pub mod error;
pub mod music;
pub mod poller;
pub mod retry;

pub use chat::ChatClient;
pub use coach::{Coach, CoachingReport, SongReport};
pub use error::{AgentError, Service};
pub use music::{download_audio, MusicClient};
pub use poller::{poll_task, PollOutcome, PollPolicy, StatusSource};
pub use retry::{with_retry, RetryPolicy};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AgentError>;
