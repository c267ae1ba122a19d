//! Waveform decoding.

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    bytes::Bytes,
    tracing::debug,
};

use crate::{error::DecodeError, generator::GenerationItem};

/// Raw audio of one generated clip, in response order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Service-side id of the clip.
    pub id: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Decode every waveform of a response.
///
/// Returns exactly one [`DecodedAudio`] per item, in the same order, or the
/// first [`DecodeError`]. Nothing decoded before the failing item is kept.
pub fn decode_all(items: &[GenerationItem]) -> Result<Vec<DecodedAudio>, DecodeError> {
    let audios = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let data = STANDARD
                .decode(item.waveform.as_bytes())
                .map_err(|source| DecodeError {
                    index,
                    item_id: item.history.id.clone(),
                    source,
                })?;
            Ok(DecodedAudio {
                id: item.history.id.clone(),
                content_type: item.history.content_type.clone(),
                data: Bytes::from(data),
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    for (index, audio) in audios.iter().enumerate() {
        debug!(index, id = %audio.id, bytes = audio.data.len(), "decoded audio");
    }
    Ok(audios)
}
