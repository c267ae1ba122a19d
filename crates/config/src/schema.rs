//! Config schema types.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxbotConfig {
    pub telegram: TelegramConfig,
    pub generation: GenerationConfig,
}

/// Telegram bot settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Verbose logging of bot traffic.
    pub debug: bool,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// Upper bound on commands processed at the same time.
    pub max_concurrent_invocations: usize,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("debug", &self.debug)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field(
                "max_concurrent_invocations",
                &self.max_concurrent_invocations,
            )
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            debug: false,
            poll_timeout_secs: 30,
            max_concurrent_invocations: 8,
        }
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Sound generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Full URL of the sound generation endpoint.
    pub endpoint: String,

    /// Timeout for one generation call (seconds).
    pub request_timeout_secs: u64,

    /// How strongly the prompt steers generation, in `[0, 1]`.
    pub prompt_influence: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.elevenlabs.io/sound-generation".into(),
            request_timeout_secs: 120,
            prompt_influence: 0.3,
        }
    }
}
