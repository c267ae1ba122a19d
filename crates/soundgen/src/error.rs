use std::error::Error as StdError;

use thiserror::Error;

/// Failure of a single sound generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request was rejected before anything was sent.
    #[error("invalid generation request: {message}")]
    InvalidRequest { message: String },

    /// Connection, TLS or timeout failure talking to the service.
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The service answered, but not with a response we understand.
    #[error("malformed sound generation response: {message}")]
    Protocol { message: String },
}

impl GenerationError {
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn protocol(message: impl std::fmt::Display) -> Self {
        Self::Protocol {
            message: message.to_string(),
        }
    }

    /// Short machine-readable tag shown to users next to the message.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "validation",
            Self::Transport { .. } => "transport",
            Self::Protocol { .. } => "protocol",
        }
    }
}

/// A waveform payload could not be decoded.
///
/// Decoding is all-or-nothing, so this error discards every item of the
/// response, including the ones before `index`.
#[derive(Debug, Error)]
#[error("failed to decode waveform #{index} ({item_id}): {source}")]
pub struct DecodeError {
    pub index: usize,
    pub item_id: String,
    #[source]
    pub source: base64::DecodeError,
}

impl DecodeError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        "decode"
    }
}
