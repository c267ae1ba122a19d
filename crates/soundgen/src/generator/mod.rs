//! Sound generation request/response types and the provider abstraction.

mod elevenlabs;

pub use elevenlabs::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT, ElevenLabsSoundGen};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::error::GenerationError;

/// Prompt influence used by the chat pipeline.
pub const DEFAULT_PROMPT_INFLUENCE: f64 = 0.3;

/// Parameters of a single generation call. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    text: String,
    prompt_influence: f64,
    duration_seconds: Option<u32>,
}

impl GenerationRequest {
    /// Build a request with the default prompt influence and no fixed duration.
    pub fn new(text: impl Into<String>) -> Result<Self, GenerationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(GenerationError::invalid_request("text must not be empty"));
        }
        Ok(Self {
            text,
            prompt_influence: DEFAULT_PROMPT_INFLUENCE,
            duration_seconds: None,
        })
    }

    pub fn with_prompt_influence(mut self, prompt_influence: f64) -> Result<Self, GenerationError> {
        if !(0.0..=1.0).contains(&prompt_influence) {
            return Err(GenerationError::invalid_request(format!(
                "prompt influence must be within [0, 1], got {prompt_influence}"
            )));
        }
        self.prompt_influence = prompt_influence;
        Ok(self)
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Result<Self, GenerationError> {
        if seconds == 0 {
            return Err(GenerationError::invalid_request(
                "duration must be a positive number of seconds",
            ));
        }
        self.duration_seconds = Some(seconds);
        Ok(self)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn prompt_influence(&self) -> f64 {
        self.prompt_influence
    }

    #[must_use]
    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration_seconds
    }
}

/// Ordered list of generated clips as returned by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(rename = "sound_generations_with_waveforms")]
    pub items: Vec<GenerationItem>,
}

/// One generated clip: metadata plus its encoded waveform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationItem {
    #[serde(rename = "sound_generation_history_item")]
    pub history: HistoryItem,
    #[serde(rename = "waveform_base_64")]
    pub waveform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "sound_generation_history_item_id")]
    pub id: String,
    pub text: String,
    #[serde(rename = "created_at_unix")]
    pub created_at: i64,
    pub content_type: String,
    pub generation_config: GenerationConfigEcho,
}

/// Echo of the parameters the service actually used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfigEcho {
    pub text: String,
    pub generation_settings: GenerationSettings,
    #[serde(default)]
    pub number_of_generations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    pub prompt_influence: f64,
}

/// A remote service able to turn a text prompt into sound clips.
#[async_trait]
pub trait SoundGenerator: Send + Sync {
    /// Provider identifier (e.g. "elevenlabs").
    fn id(&self) -> &'static str;

    /// Issue a single generation call. No retries.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}
