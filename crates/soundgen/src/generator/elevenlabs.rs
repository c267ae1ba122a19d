//! ElevenLabs sound effect generation.
//!
//! Talks to the public endpoint used by the ElevenLabs web app. It is not a
//! documented API: requests only go through when they look like they come
//! from a browser, hence the fixed header profile below.

use std::time::Duration;

use {
    async_trait::async_trait,
    reqwest::{
        Client,
        header::{HeaderMap, HeaderName, HeaderValue},
    },
    serde::Serialize,
    tracing::{debug, info, warn},
};

use super::{GenerationRequest, GenerationResponse, SoundGenerator};
use crate::error::GenerationError;

/// Sound generation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io/sound-generation";

/// Upper bound for one generation call, including reading the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest slice of an error body kept in protocol errors.
const ERROR_BODY_EXCERPT_LEN: usize = 200;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("cache-control", "no-cache"),
    ("content-type", "application/json"),
    ("dnt", "1"),
    ("origin", "https://elevenlabs.io"),
    ("pragma", "no-cache"),
    ("priority", "u=1, i"),
    ("referer", "https://elevenlabs.io/"),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    ),
];

/// ElevenLabs sound effect generator.
#[derive(Debug, Clone)]
pub struct ElevenLabsSoundGen {
    client: Client,
    endpoint: String,
}

impl ElevenLabsSoundGen {
    /// Create a generator for the public endpoint with the default timeout.
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a generator for a custom endpoint and request timeout.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::transport("failed to build http client", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(BROWSER_HEADERS.len());
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

fn transport_error(context: &str, err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::transport(format!("{context} (timed out)"), err)
    } else {
        GenerationError::transport(context, err)
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl SoundGenerator for ElevenLabsSoundGen {
    fn id(&self) -> &'static str {
        "elevenlabs"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        info!(
            text = request.text(),
            prompt_influence = request.prompt_influence(),
            duration_seconds = ?request.duration_seconds(),
            "generating sound"
        );

        let body = SoundGenerationBody {
            text: request.text(),
            prompt_influence: request.prompt_influence(),
            duration_seconds: request.duration_seconds(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("failed to send sound generation request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "sound generation request rejected");
            return Err(GenerationError::protocol(format!(
                "unexpected status {status}: {}",
                excerpt(&body)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("failed to read sound generation response", e))?;
        debug!(bytes = bytes.len(), "sound generation response received");

        let parsed: GenerationResponse =
            serde_json::from_slice(&bytes).map_err(GenerationError::protocol)?;

        info!(count = parsed.items.len(), "sounds generated");
        Ok(parsed)
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SoundGenerationBody<'a> {
    text: &'a str,
    prompt_influence: f64,
    duration_seconds: Option<u32>,
}
