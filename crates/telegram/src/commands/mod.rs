//! Slash command parsing and routing.

mod generate;
mod start;

pub use {
    generate::{GenerateCommand, InvocationStage},
    start::StartCommand,
};

use std::{collections::HashMap, sync::Arc};

use {
    async_trait::async_trait,
    fxbot_soundgen::SoundGenerator,
    teloxide::types::{BotCommand, ChatId},
    tracing::{info, warn},
};

use crate::{
    Result, dispatch::ResultDispatcher, messages, outbound::ChatOutbound, report::ErrorReporter,
};

/// One incoming slash command. Lives for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name without the leading slash or `@botname` suffix.
    pub name: String,
    /// Everything after the command word, trimmed.
    pub args: String,
    pub chat_id: ChatId,
}

impl Command {
    /// Parse `/name[@bot] args...`.
    ///
    /// Returns `None` for plain text and for commands addressed to a
    /// different bot.
    #[must_use]
    pub fn parse(text: &str, chat_id: ChatId, bot_username: Option<&str>) -> Option<Self> {
        let body = text.strip_prefix('/')?;
        let (head, rest) = match body.find(char::is_whitespace) {
            Some(idx) => body.split_at(idx),
            None => (body, ""),
        };
        let (name, target) = match head.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }
        if let (Some(target), Some(me)) = (target, bot_username)
            && !target.eq_ignore_ascii_case(me)
        {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            args: rest.trim().to_string(),
            chat_id,
        })
    }

    /// The command as the user would retype it, e.g. `/generate kick`.
    #[must_use]
    pub fn invocation_text(&self) -> String {
        if self.args.is_empty() {
            format!("/{}", self.name)
        } else {
            format!("/{} {}", self.name, self.args)
        }
    }
}

/// A handler for one named command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name without the slash (e.g. "generate").
    fn name(&self) -> &'static str;

    /// Short description shown in Telegram's command menu.
    fn description(&self) -> &'static str;

    async fn handle(&self, command: &Command) -> Result<()>;
}

/// Maps command names to handlers.
///
/// Unknown names get a fixed fallback notice. Any handler failure is
/// reported to the originating chat before being returned to the caller.
pub struct CommandRouter {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
    /// Registration order, for the command menu.
    order: Vec<&'static str>,
    outbound: Arc<dyn ChatOutbound>,
    reporter: ErrorReporter,
}

impl CommandRouter {
    #[must_use]
    pub fn new(outbound: Arc<dyn ChatOutbound>) -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
            reporter: ErrorReporter::new(Arc::clone(&outbound)),
            outbound,
        }
    }

    /// Router with `/start` and `/generate` wired to the given services.
    #[must_use]
    pub fn with_default_commands(
        outbound: Arc<dyn ChatOutbound>,
        generator: Arc<dyn SoundGenerator>,
        prompt_influence: f64,
    ) -> Self {
        let dispatcher = ResultDispatcher::new(Arc::clone(&outbound));
        Self::new(Arc::clone(&outbound))
            .with(Arc::new(StartCommand::new(Arc::clone(&outbound))))
            .with(Arc::new(GenerateCommand::new(
                outbound,
                generator,
                dispatcher,
                prompt_influence,
            )))
    }

    #[must_use]
    pub fn with(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        let name = handler.name();
        if self.handlers.insert(name, handler).is_some() {
            warn!(command = name, "replacing existing command handler");
        } else {
            self.order.push(name);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// Commands to advertise through `setMyCommands`.
    #[must_use]
    pub fn bot_commands(&self) -> Vec<BotCommand> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|h| BotCommand::new(h.name(), h.description()))
            .collect()
    }

    /// Run one command end to end.
    pub async fn route(&self, command: &Command) -> Result<()> {
        let result = match self.handlers.get(command.name.as_str()) {
            Some(handler) => handler.handle(command).await,
            None => {
                info!(
                    chat_id = command.chat_id.0,
                    command = %command.name,
                    "unknown command"
                );
                self.outbound
                    .send_notice(command.chat_id, messages::UNKNOWN_COMMAND)
                    .await
            },
        };

        if let Err(ref e) = result {
            warn!(
                chat_id = command.chat_id.0,
                command = %command.name,
                code = e.code(),
                error = %e,
                "command failed"
            );
            self.reporter.report(command.chat_id, e).await;
        }
        result
    }
}
