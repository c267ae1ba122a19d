use std::sync::Arc;

use {teloxide::types::ChatId, tracing::warn};

use crate::{Error, messages, outbound::ChatOutbound};

/// Tells a chat that its invocation failed.
///
/// Best effort: if the notice itself cannot be sent, that is logged and
/// swallowed.
#[derive(Clone)]
pub struct ErrorReporter {
    outbound: Arc<dyn ChatOutbound>,
}

impl ErrorReporter {
    #[must_use]
    pub fn new(outbound: Arc<dyn ChatOutbound>) -> Self {
        Self { outbound }
    }

    pub async fn report(&self, chat: ChatId, error: &Error) {
        let notice = messages::failure(error.code(), &error.to_string());
        if let Err(e) = self.outbound.send_notice(chat, &notice).await {
            warn!(
                chat_id = chat.0,
                original_error = %error,
                error = %e,
                "failed to send error notice"
            );
        }
    }
}
