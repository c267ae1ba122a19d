//! Long-polling update loop.

use std::{sync::Arc, time::Duration};

use {
    fxbot_config::TelegramConfig,
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, UpdateKind},
    },
    tokio::{sync::Semaphore, task::JoinSet},
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result,
    commands::{Command, CommandRouter},
};

/// Pause before retrying a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Slack added on top of the long-poll timeout for the HTTP client, so the
/// client never aborts a poll Telegram is still holding open.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingOptions {
    /// `getUpdates` long-poll timeout in seconds.
    pub poll_timeout: u32,
    /// Commands allowed to run at the same time.
    pub max_concurrent: usize,
}

impl PollingOptions {
    #[must_use]
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            poll_timeout: config.poll_timeout_secs,
            max_concurrent: config.max_concurrent_invocations.max(1),
        }
    }
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self::from_config(&TelegramConfig::default())
    }
}

/// Build a bot whose HTTP client outlives the long-poll timeout.
pub fn build_bot(token: &Secret<String>, options: PollingOptions) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(u64::from(options.poll_timeout)) + CLIENT_TIMEOUT_SLACK)
        .build()
        .map_err(|e| Error::message(format!("failed to build telegram http client: {e}")))?;
    Ok(Bot::with_client(token.expose_secret(), client))
}

/// Verify the token, clear any webhook and publish the command menu.
///
/// Returns the bot's own username, used to drop commands addressed to
/// other bots in group chats.
pub async fn connect(bot: &Bot, router: &CommandRouter) -> Result<Option<String>> {
    let me = bot.get_me().await?;
    let username = me.username.clone();

    bot.delete_webhook().send().await?;

    if let Err(e) = bot.set_my_commands(router.bot_commands()).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?username, "telegram bot connected (webhook cleared)");
    Ok(username)
}

/// Connect and spawn the polling loop.
///
/// The loop runs until `cancel` fires or Telegram reports that another
/// instance is polling with the same token. In-flight commands are awaited
/// before the returned handle completes.
pub async fn start_polling(
    bot: Bot,
    router: Arc<CommandRouter>,
    options: PollingOptions,
    cancel: CancellationToken,
) -> Result<tokio::task::JoinHandle<()>> {
    let username = connect(&bot, &router).await?;
    Ok(tokio::spawn(poll_loop(
        bot, router, username, options, cancel,
    )))
}

async fn poll_loop(
    bot: Bot,
    router: Arc<CommandRouter>,
    username: Option<String>,
    options: PollingOptions,
    cancel: CancellationToken,
) {
    info!(
        poll_timeout = options.poll_timeout,
        max_concurrent = options.max_concurrent,
        "starting telegram polling loop"
    );
    let permits = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut offset: i32 = 0;

    'poll: loop {
        while let Some(joined) = tasks.try_join_next() {
            log_join_result(joined);
        }

        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(options.poll_timeout)
            .allowed_updates(vec![AllowedUpdate::Message]);

        let result = tokio::select! {
            () = cancel.cancelled() => break 'poll,
            result = request.send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    let UpdateKind::Message(msg) = update.kind else {
                        debug!("ignoring non-message update");
                        continue;
                    };
                    let Some(text) = msg.text() else {
                        continue;
                    };
                    let sender = msg
                        .from
                        .as_ref()
                        .and_then(|u| u.username.as_deref())
                        .map(|u| format!("@{u}"));
                    debug!(
                        chat_id = msg.chat.id.0,
                        username = ?sender,
                        text,
                        "received telegram message"
                    );

                    let Some(command) = Command::parse(text, msg.chat.id, username.as_deref())
                    else {
                        continue;
                    };

                    let permit = tokio::select! {
                        () = cancel.cancelled() => break 'poll,
                        permit = Arc::clone(&permits).acquire_owned() => permit,
                    };
                    let Ok(permit) = permit else {
                        break 'poll;
                    };

                    let router = Arc::clone(&router);
                    tasks.spawn(async move {
                        let _permit = permit;
                        if let Err(e) = router.route(&command).await {
                            debug!(
                                chat_id = command.chat_id.0,
                                command = %command.name,
                                code = e.code(),
                                "command finished with error"
                            );
                        }
                    });
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                warn!(
                    "telegram polling stopped: another instance is already running with this token"
                );
                break 'poll;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break 'poll,
                    () = tokio::time::sleep(RETRY_DELAY) => {},
                }
            },
        }
    }

    if !tasks.is_empty() {
        info!(pending = tasks.len(), "waiting for in-flight commands");
    }
    while let Some(joined) = tasks.join_next().await {
        log_join_result(joined);
    }
    info!("telegram polling stopped");
}

fn log_join_result(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "command task panicked");
    }
}
