//! Sound effect generation for fxbot.
//!
//! Wraps the remote text-to-sound-effect service behind the [`SoundGenerator`]
//! trait and decodes the base64 waveforms it returns into raw audio bytes.

pub mod decode;
pub mod error;
pub mod generator;

pub use {
    decode::{DecodedAudio, decode_all},
    error::{DecodeError, GenerationError},
    generator::{
        DEFAULT_PROMPT_INFLUENCE, ElevenLabsSoundGen, GenerationConfigEcho, GenerationItem,
        GenerationRequest, GenerationResponse, GenerationSettings, HistoryItem, SoundGenerator,
    },
};
