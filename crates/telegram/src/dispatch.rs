//! Delivery of decoded audio back to the chat.

use std::sync::Arc;

use {
    fxbot_soundgen::DecodedAudio,
    teloxide::types::ChatId,
    tracing::{debug, info},
};

use crate::{Error, Result, messages, outbound::ChatOutbound};

/// Aggregate result of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Nothing to send; the user got the empty-result notice.
    Empty,
    /// Every clip was sent, followed by the completion notice.
    Delivered { sent: usize },
}

/// Sends zero, one or many clips with the matching status notices.
///
/// Sends happen strictly in order. The first failed send aborts the rest
/// and comes back as [`Error::Delivery`].
#[derive(Clone)]
pub struct ResultDispatcher {
    outbound: Arc<dyn ChatOutbound>,
}

impl ResultDispatcher {
    #[must_use]
    pub fn new(outbound: Arc<dyn ChatOutbound>) -> Self {
        Self { outbound }
    }

    /// Deliver `audios` to `chat`. `invocation` is echoed in the completion
    /// notice so the user can resend it.
    pub async fn deliver(
        &self,
        chat: ChatId,
        audios: &[DecodedAudio],
        invocation: &str,
    ) -> Result<DeliveryOutcome> {
        let total = audios.len();

        if total == 0 {
            info!(chat_id = chat.0, "generation returned no audio");
            self.notice(chat, messages::EMPTY_RESULT, "empty-result notice")
                .await?;
            return Ok(DeliveryOutcome::Empty);
        }

        if total > 1 {
            self.notice(chat, messages::MULTIPLE_FILES, "multiple-files notice")
                .await?;
        }

        for (index, audio) in audios.iter().enumerate() {
            let position = index + 1;
            self.outbound
                .send_audio(chat, audio)
                .await
                .map_err(|e| Error::delivery(format!("audio {position} of {total}"), e))?;
            debug!(chat_id = chat.0, position, total, "audio delivered");
        }

        self.notice(
            chat,
            &messages::generation_finished(invocation),
            "completion notice",
        )
        .await?;

        info!(chat_id = chat.0, sent = total, "delivery complete");
        Ok(DeliveryOutcome::Delivered { sent: total })
    }

    async fn notice(&self, chat: ChatId, html: &str, step: &str) -> Result<()> {
        self.outbound
            .send_notice(chat, html)
            .await
            .map_err(|e| Error::delivery(step, e))
    }
}
