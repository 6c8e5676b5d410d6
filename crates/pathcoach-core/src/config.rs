use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_TEXT_API_URL: &str = "PATHCOACH_TEXT_API_URL";
pub const ENV_MUSIC_API_URL: &str = "PATHCOACH_MUSIC_API_URL";
pub const ENV_POLL_INTERVAL: &str = "PATHCOACH_POLL_INTERVAL_SECS";
pub const ENV_POLL_MAX: &str = "PATHCOACH_POLL_MAX_SECS";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TextApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextApiConfig {
    #[serde(default = "default_text_base_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_text_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TextApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_text_base_url(),
            model: default_text_model(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TextApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// MusicApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicApiConfig {
    #[serde(default = "default_music_base_url")]
    pub base_url: String,
    #[serde(default = "default_music_model")]
    pub model: String,
    #[serde(default = "default_style")]
    pub style: String,
    /// The API insists on a callback URL; results are polled, never pushed.
    #[serde(default = "default_callback_url")]
    pub callback_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_music_base_url() -> String {
    "https://apibox.erweima.ai/api/v1".to_string()
}

fn default_music_model() -> String {
    "V4".to_string()
}

fn default_style() -> String {
    "Pop".to_string()
}

fn default_callback_url() -> String {
    "https://no-callback.com".to_string()
}

impl Default for MusicApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_music_base_url(),
            model: default_music_model(),
            style: default_style(),
            callback_url: default_callback_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MusicApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// PollingConfig / RetryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_max_duration_secs() -> u64 {
    600
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

impl PollingConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request; 1 means no automatic retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub text_api: TextApiConfig,
    #[serde(default)]
    pub music_api: MusicApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Generate lyrics and audio right after a successful plan.
    #[serde(default = "default_auto_song")]
    pub auto_song: bool,
}

fn default_version() -> u32 {
    1
}

fn default_auto_song() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            text_api: TextApiConfig::default(),
            music_api: MusicApiConfig::default(),
            polling: PollingConfig::default(),
            retry: RetryConfig::default(),
            auto_song: default_auto_song(),
        }
    }
}

impl Config {
    /// Load `<root>/config.yaml`, falling back to defaults when absent.
    /// Environment overrides are not applied here; see [`Config::apply_env`].
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(ENV_TEXT_API_URL).filter(|v| !v.trim().is_empty()) {
            self.text_api.base_url = url.trim().to_string();
        }
        if let Some(url) = env(ENV_MUSIC_API_URL).filter(|v| !v.trim().is_empty()) {
            self.music_api.base_url = url.trim().to_string();
        }
        if let Some(secs) = env(ENV_POLL_INTERVAL).and_then(|v| parse_secs(ENV_POLL_INTERVAL, &v)) {
            self.polling.interval_secs = secs;
        }
        if let Some(secs) = env(ENV_POLL_MAX).and_then(|v| parse_secs(ENV_POLL_MAX, &v)) {
            self.polling.max_duration_secs = secs;
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message })
        };

        if self.text_api.base_url.trim().is_empty() {
            push(WarnLevel::Error, "text_api.base_url is empty".to_string());
        }
        if self.music_api.base_url.trim().is_empty() {
            push(WarnLevel::Error, "music_api.base_url is empty".to_string());
        }
        if self.text_api.timeout_secs == 0 {
            push(WarnLevel::Error, "text_api.timeout_secs must be > 0".to_string());
        }
        if self.music_api.timeout_secs == 0 {
            push(WarnLevel::Error, "music_api.timeout_secs must be > 0".to_string());
        }
        if let Some(t) = self.text_api.temperature {
            if !(0.0..=2.0).contains(&t) {
                push(
                    WarnLevel::Warning,
                    format!("text_api.temperature={t} is outside 0.0-2.0"),
                );
            }
        }
        if self.polling.interval_secs == 0 {
            push(WarnLevel::Error, "polling.interval_secs must be > 0".to_string());
        }
        if self.polling.max_duration_secs < self.polling.interval_secs {
            push(
                WarnLevel::Warning,
                format!(
                    "polling.max_duration_secs ({}) is shorter than the interval ({}); \
                     only one status check will run",
                    self.polling.max_duration_secs, self.polling.interval_secs
                ),
            );
        }
        if self.retry.max_attempts == 0 {
            push(WarnLevel::Error, "retry.max_attempts must be >= 1".to_string());
        } else if self.retry.max_attempts > 5 {
            push(
                WarnLevel::Warning,
                format!(
                    "retry.max_attempts={} (>5 is unusual for paid APIs)",
                    self.retry.max_attempts
                ),
            );
        }

        warnings
    }
}

fn parse_secs(name: &str, value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value, "ignoring non-numeric override");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
