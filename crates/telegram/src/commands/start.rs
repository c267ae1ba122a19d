use std::sync::Arc;

use {async_trait::async_trait, tracing::debug};

use super::{Command, CommandHandler};
use crate::{Result, messages, outbound::ChatOutbound};

/// `/start`: static welcome and usage text.
pub struct StartCommand {
    outbound: Arc<dyn ChatOutbound>,
}

impl StartCommand {
    #[must_use]
    pub fn new(outbound: Arc<dyn ChatOutbound>) -> Self {
        Self { outbound }
    }
}

#[async_trait]
impl CommandHandler for StartCommand {
    fn name(&self) -> &'static str {
        "start"
    }

    fn description(&self) -> &'static str {
        "Show welcome message and usage"
    }

    async fn handle(&self, command: &Command) -> Result<()> {
        debug!(chat_id = command.chat_id.0, "sending welcome");
        self.outbound
            .send_notice(command.chat_id, messages::WELCOME)
            .await
    }
}
