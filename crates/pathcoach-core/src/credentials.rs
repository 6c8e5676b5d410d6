use crate::error::{CoachError, Result};
use crate::store::{StorageKey, Store};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    TextApi,
    MusicApi,
}

impl Credential {
    pub fn all() -> &'static [Credential] {
        &[Credential::TextApi, Credential::MusicApi]
    }

    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Credential::TextApi => "text",
            Credential::MusicApi => "music",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Credential::TextApi => "text-generation API",
            Credential::MusicApi => "music-generation API",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Credential::TextApi => "OPENAI_API_KEY",
            Credential::MusicApi => "SUNO_API_KEY",
        }
    }

    pub fn storage_key(self) -> StorageKey {
        match self {
            Credential::TextApi => StorageKey::TextApiKey,
            Credential::MusicApi => StorageKey::MusicApiKey,
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Credential {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" | "openai" => Ok(Credential::TextApi),
            "music" | "suno" => Ok(Credential::MusicApi),
            _ => Err(format!("unknown credential '{s}': expected 'text' or 'music'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    Environment,
    Stored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub value: String,
    pub source: CredentialSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub credential: Credential,
    pub env_var: &'static str,
    pub source: Option<CredentialSource>,
    pub masked: Option<String>,
}

// ---------------------------------------------------------------------------
// CredentialResolver
// ---------------------------------------------------------------------------

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// Resolves API keys with precedence environment > stored value.
///
/// An environment value is copied into the store on resolve so later runs
/// without the variable still find it; the copy is skipped when the stored
/// value already matches.
pub struct CredentialResolver<'a> {
    store: &'a Store,
    env: EnvLookup<'a>,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self::with_env(store, |name| std::env::var(name).ok())
    }

    pub fn with_env(store: &'a Store, env: impl Fn(&str) -> Option<String> + 'a) -> Self {
        CredentialResolver {
            store,
            env: Box::new(env),
        }
    }

    fn from_env(&self, credential: Credential) -> Option<String> {
        (self.env)(credential.env_var())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn resolve(&self, credential: Credential) -> Result<ResolvedCredential> {
        let key = credential.storage_key();
        if let Some(value) = self.from_env(credential) {
            if self.store.get_string(key).as_deref() != Some(value.as_str()) {
                self.store.set_string(key, &value);
            }
            return Ok(ResolvedCredential {
                value,
                source: CredentialSource::Environment,
            });
        }
        match self.store.get_string(key) {
            Some(value) => Ok(ResolvedCredential {
                value,
                source: CredentialSource::Stored,
            }),
            None => Err(CoachError::MissingCredential(credential)),
        }
    }

    /// Where the key would come from, without touching the store.
    pub fn source(&self, credential: Credential) -> Option<CredentialSource> {
        if self.from_env(credential).is_some() {
            Some(CredentialSource::Environment)
        } else if self.store.get_string(credential.storage_key()).is_some() {
            Some(CredentialSource::Stored)
        } else {
            None
        }
    }

    /// One entry per credential, with the masked value when one is available.
    pub fn status(&self) -> Vec<CredentialStatus> {
        Credential::all()
            .iter()
            .map(|&credential| {
                let value = self
                    .from_env(credential)
                    .or_else(|| self.store.get_string(credential.storage_key()));
                CredentialStatus {
                    credential,
                    env_var: credential.env_var(),
                    source: self.source(credential),
                    masked: value.as_deref().map(mask),
                }
            })
            .collect()
    }

    pub fn store_key(&self, credential: Credential, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoachError::EmptyCredential(credential));
        }
        self.store.save_string(credential.storage_key(), value)
    }

    pub fn forget(&self, credential: Credential) -> Result<()> {
        self.store.remove(credential.storage_key())
    }
}

/// `sk-proj…9f2a` style rendering for status output.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn environment_wins_and_is_persisted() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        store.save_string(StorageKey::TextApiKey, "stored").unwrap();
        let resolver = CredentialResolver::with_env(&store, env(&[("OPENAI_API_KEY", "from-env")]));

        let got = resolver.resolve(Credential::TextApi).unwrap();
        assert_eq!(got.value, "from-env");
        assert_eq!(got.source, CredentialSource::Environment);
        assert_eq!(store.get_string(StorageKey::TextApiKey), Some("from-env".into()));
    }

    #[test]
    fn repeated_resolution_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver = CredentialResolver::with_env(&store, env(&[("SUNO_API_KEY", "m-key")]));
        let first = resolver.resolve(Credential::MusicApi).unwrap();
        let second = resolver.resolve(Credential::MusicApi).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get_string(StorageKey::MusicApiKey), Some("m-key".into()));
    }

    #[test]
    fn stored_value_is_the_fallback() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver = CredentialResolver::with_env(&store, env(&[("OPENAI_API_KEY", "  ")]));
        resolver.store_key(Credential::TextApi, " sk-saved ").unwrap();
        let got = resolver.resolve(Credential::TextApi).unwrap();
        assert_eq!(got.value, "sk-saved");
        assert_eq!(got.source, CredentialSource::Stored);
    }

    #[test]
    fn missing_everywhere_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver = CredentialResolver::with_env(&store, env(&[]));
        let err = resolver.resolve(Credential::MusicApi).unwrap_err();
        assert!(matches!(err, CoachError::MissingCredential(Credential::MusicApi)));
        assert!(err.to_string().contains("SUNO_API_KEY"));
        assert_eq!(resolver.source(Credential::MusicApi), None);
    }

    #[test]
    fn credentials_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver = CredentialResolver::with_env(&store, env(&[("OPENAI_API_KEY", "t")]));
        assert!(resolver.resolve(Credential::TextApi).is_ok());
        assert!(resolver.resolve(Credential::MusicApi).is_err());
    }

    #[test]
    fn empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver = CredentialResolver::with_env(&store, env(&[]));
        assert!(matches!(
            resolver.store_key(Credential::TextApi, "  "),
            Err(CoachError::EmptyCredential(Credential::TextApi))
        ));
    }

    #[test]
    fn status_reports_both_keys_without_persisting() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path());
        let resolver =
            CredentialResolver::with_env(&store, env(&[("OPENAI_API_KEY", "sk-proj-1234567890")]));
        let status = resolver.status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].source, Some(CredentialSource::Environment));
        assert_eq!(status[0].masked.as_deref(), Some("sk-p…7890"));
        assert_eq!(status[1].source, None);
        assert!(!store.contains(StorageKey::TextApiKey));
    }

    #[test]
    fn mask_hides_the_middle() {
        assert_eq!(mask("sk-proj-1234567890"), "sk-p…7890");
        assert_eq!(mask("short"), "*****");
    }
}
