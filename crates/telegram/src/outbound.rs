use {
    async_trait::async_trait,
    fxbot_soundgen::DecodedAudio,
    teloxide::{
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatAction, ChatId, InputFile, LinkPreviewOptions, ParseMode},
    },
    tracing::{debug, info},
};

use crate::Result;

/// File name used for every audio attachment.
pub const AUDIO_FILE_NAME: &str = "audio.mp3";

/// Sends notices and audio to a chat.
///
/// Handlers get this injected instead of reaching for a global bot handle.
#[async_trait]
pub trait ChatOutbound: Send + Sync {
    /// Send an HTML notice with link previews disabled.
    async fn send_notice(&self, chat: ChatId, html: &str) -> Result<()>;

    /// Send one decoded clip as an audio attachment.
    async fn send_audio(&self, chat: ChatId, audio: &DecodedAudio) -> Result<()>;
}

/// Outbound sender backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl ChatOutbound for TelegramOutbound {
    async fn send_notice(&self, chat: ChatId, html: &str) -> Result<()> {
        self.bot
            .send_message(chat, html)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_link_preview())
            .await?;
        debug!(chat_id = chat.0, text_len = html.len(), "telegram notice sent");
        Ok(())
    }

    async fn send_audio(&self, chat: ChatId, audio: &DecodedAudio) -> Result<()> {
        // Upload indicator only; a failure here must not block the upload.
        let _ = self
            .bot
            .send_chat_action(chat, ChatAction::UploadDocument)
            .await;

        let input = InputFile::memory(audio.data.to_vec()).file_name(AUDIO_FILE_NAME);
        self.bot.send_audio(chat, input).await?;
        info!(
            chat_id = chat.0,
            id = %audio.id,
            bytes = audio.data.len(),
            "telegram audio sent"
        );
        Ok(())
    }
}
