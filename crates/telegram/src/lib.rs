//! Telegram front end for the sound generation bot.
//!
//! Polls the Bot API for slash commands, routes them to handlers and sends
//! the generated audio back to the originating chat.

pub mod bot;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod outbound;
pub mod report;

#[cfg(test)]
mod test_support;

pub use {
    bot::{PollingOptions, build_bot, connect, start_polling},
    commands::{Command, CommandHandler, CommandRouter, GenerateCommand, StartCommand},
    dispatch::{DeliveryOutcome, ResultDispatcher},
    error::{Error, Result},
    outbound::{AUDIO_FILE_NAME, ChatOutbound, TelegramOutbound},
    report::ErrorReporter,
};
