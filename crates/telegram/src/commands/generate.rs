use std::sync::Arc;

use {
    async_trait::async_trait,
    fxbot_soundgen::{GenerationRequest, SoundGenerator, decode_all},
    tracing::{debug, info, warn},
};

use super::{Command, CommandHandler};
use crate::{
    Result,
    dispatch::{DeliveryOutcome, ResultDispatcher},
    messages,
    outbound::ChatOutbound,
};

/// Progress of one `/generate` invocation.
///
/// `Completed` and `Failed` are terminal. A failing invocation is logged
/// with the last stage it reached before moving to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStage {
    Received,
    Validated,
    Requested,
    Decoded,
    Dispatched,
    Completed,
    Failed,
}

/// `/generate <text>`: request sound effects and deliver them to the chat.
pub struct GenerateCommand {
    outbound: Arc<dyn ChatOutbound>,
    generator: Arc<dyn SoundGenerator>,
    dispatcher: ResultDispatcher,
    prompt_influence: f64,
}

impl GenerateCommand {
    #[must_use]
    pub fn new(
        outbound: Arc<dyn ChatOutbound>,
        generator: Arc<dyn SoundGenerator>,
        dispatcher: ResultDispatcher,
        prompt_influence: f64,
    ) -> Self {
        Self {
            outbound,
            generator,
            dispatcher,
            prompt_influence,
        }
    }

    async fn run(&self, command: &Command, stage: &mut InvocationStage) -> Result<()> {
        let chat = command.chat_id;
        let text = command.args.trim();
        if text.is_empty() {
            debug!(chat_id = chat.0, "generate without text, prompting");
            return self
                .outbound
                .send_notice(chat, messages::GENERATE_USAGE)
                .await;
        }

        let request = GenerationRequest::new(text)?.with_prompt_influence(self.prompt_influence)?;
        *stage = InvocationStage::Validated;

        self.outbound
            .send_notice(chat, messages::GENERATION_STARTED)
            .await?;

        let response = self.generator.generate(&request).await?;
        *stage = InvocationStage::Requested;

        let audios = decode_all(&response.items)?;
        *stage = InvocationStage::Decoded;
        info!(
            chat_id = chat.0,
            provider = self.generator.id(),
            count = audios.len(),
            "decoded generated audio"
        );

        let outcome = self
            .dispatcher
            .deliver(chat, &audios, &command.invocation_text())
            .await?;
        *stage = InvocationStage::Dispatched;

        if let DeliveryOutcome::Delivered { sent } = outcome {
            debug!(chat_id = chat.0, sent, "generation delivered");
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for GenerateCommand {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn description(&self) -> &'static str {
        "Generate a sound effect from text"
    }

    async fn handle(&self, command: &Command) -> Result<()> {
        let mut stage = InvocationStage::Received;
        let result = self.run(command, &mut stage).await;
        let terminal = match &result {
            Ok(()) => InvocationStage::Completed,
            Err(e) => {
                warn!(
                    chat_id = command.chat_id.0,
                    reached = ?stage,
                    code = e.code(),
                    error = %e,
                    "generate invocation failed"
                );
                InvocationStage::Failed
            },
        };
        debug!(chat_id = command.chat_id.0, stage = ?terminal, "generate invocation finished");
        result
    }
}
