pub mod config;
pub mod init;
pub mod key;
pub mod plan;
pub mod profile;
pub mod quiz;
pub mod reset;
pub mod song;
pub mod state;

use anyhow::Context;
use pathcoach_agent::{ChatClient, Coach, MusicClient};
use pathcoach_core::config::{Config, WarnLevel};
use pathcoach_core::credentials::{Credential, CredentialResolver};
use pathcoach_core::session::Session;
use pathcoach_core::store::Store;
use pathcoach_core::CoachError;
use std::future::Future;
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Config file plus environment overrides.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load(root).context("failed to load config")?;
    config.apply_env();
    Ok(config)
}

/// Refuse to talk to the APIs with a config `config validate` would reject.
pub fn ensure_valid(config: &Config) -> anyhow::Result<()> {
    let errors: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .map(|w| w.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!(
            "invalid config: {} (run 'pathcoach config validate')",
            errors.join("; ")
        );
    }
    Ok(())
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

/// Resolve a key from the environment or the store. When neither has one and
/// stdin is a terminal, ask for it and store it before continuing.
pub fn require_key(store: &Store, credential: Credential) -> anyhow::Result<String> {
    let resolver = CredentialResolver::new(store);
    match resolver.resolve(credential) {
        Ok(resolved) => Ok(resolved.value),
        Err(CoachError::MissingCredential(_)) if std::io::stdin().is_terminal() => {
            let value = prompt_line(&format!(
                "Enter your {} key ({} is not set): ",
                credential.label(),
                credential.env_var()
            ))?;
            resolver
                .store_key(credential, &value)
                .with_context(|| format!("failed to store the {} key", credential.label()))?;
            Ok(value.trim().to_string())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Coach with whichever clients the command needs. A missing music key is
/// tolerated when `music` is `Optional`: the song step then reports it.
pub fn build_coach(
    root: &Path,
    config: &Config,
    text: bool,
    music: KeyNeed,
) -> anyhow::Result<Coach> {
    ensure_valid(config)?;
    let store = Store::open(root);
    let mut coach = Coach::new(store.clone(), config);
    if text {
        let key = require_key(&store, Credential::TextApi)?;
        coach = coach.with_chat(ChatClient::new(&config.text_api, key)?);
    }
    let music_key = match music {
        KeyNeed::None => None,
        KeyNeed::Required => Some(require_key(&store, Credential::MusicApi)?),
        KeyNeed::Optional => match require_key(&store, Credential::MusicApi) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(error = %e, "music key unavailable, audio will be skipped");
                None
            }
        },
    };
    if let Some(key) = music_key {
        coach = coach.with_music(MusicClient::new(&config.music_api, key)?);
    }
    Ok(coach)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNeed {
    None,
    Optional,
    Required,
}

/// Run `fut` to completion unless Ctrl-C arrives first. Dropping the future
/// stops any polling in progress; its last progress stays in the store.
pub async fn until_interrupted<T>(root: &Path, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        out = fut => Some(out),
        _ = tokio::signal::ctrl_c() => {
            match resume_hint(root) {
                Some(hint) => eprintln!("interrupted: {hint}"),
                None => eprintln!("interrupted"),
            }
            None
        }
    }
}

/// Only an unfinished audio task is worth resuming.
fn resume_hint(root: &Path) -> Option<String> {
    let session = Session::load(&Store::open(root));
    session.resumable_task().map(|task_id| {
        format!("task {task_id} keeps rendering, continue with 'pathcoach song resume'")
    })
}
