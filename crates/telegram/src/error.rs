use {
    fxbot_soundgen::{DecodeError, GenerationError},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A send inside the result delivery sequence failed; the rest was skipped.
    #[error("delivery failed at {step}: {source}")]
    Delivery {
        step: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn delivery(step: impl Into<String>, source: Error) -> Self {
        Self::Delivery {
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Short machine-readable tag included in user-facing error notices.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Telegram(_) => "telegram",
            Self::Generation(e) => e.code(),
            Self::Decode(e) => e.code(),
            Self::Delivery { .. } => "delivery",
            Self::Message { .. } => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
