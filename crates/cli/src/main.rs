mod config_commands;
mod generate_commands;

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    fxbot_config::FxbotConfig,
    fxbot_soundgen::ElevenLabsSoundGen,
    fxbot_telegram::{ChatOutbound, CommandRouter, PollingOptions, TelegramOutbound},
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
    tracing_subscriber::{
        EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
    },
};

#[derive(Parser)]
#[command(name = "fxbot", about = "fxbot: text-to-sound-effect Telegram bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching `./` and `~/.config/fxbot/`.
    #[arg(long, global = true, env = "FXBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging of bot traffic (same as `BOT_DEBUG=true`).
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default when no subcommand is provided).
    Run,
    /// Generate sound effects once and write them to disk.
    Generate(generate_commands::GenerateArgs),
    /// Validate the configuration and report errors/warnings.
    Check,
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter directive used when `RUST_LOG` is not set.
fn default_directive(log_level: &str, debug: bool) -> &str {
    if debug && log_level == "info" {
        "debug"
    } else {
        log_level
    }
}

/// Install the global subscriber before anything else logs.
///
/// Returns a reload handle unless `RUST_LOG` fixed the filter, so debug mode
/// enabled from the config file can still raise the level afterwards.
fn init_telemetry(cli: &Cli) -> Option<FilterHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (
            EnvFilter::new(default_directive(&cli.log_level, cli.debug)),
            false,
        ),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }

    (!from_env).then_some(handle)
}

/// Switch to debug logging when the loaded config asks for it.
fn apply_config_debug(cli: &Cli, config: &FxbotConfig, filter: Option<&FilterHandle>) {
    if cli.debug || !config.telegram.debug {
        return;
    }
    if let Some(handle) = filter
        && let Err(e) = handle.reload(EnvFilter::new(default_directive(&cli.log_level, true)))
    {
        warn!(error = %e, "failed to enable debug logging");
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FxbotConfig> {
    let mut config = fxbot_config::load(cli.config.as_deref())?;
    if cli.debug {
        config.telegram.debug = true;
    }
    Ok(config)
}

fn generator(config: &FxbotConfig) -> anyhow::Result<ElevenLabsSoundGen> {
    Ok(ElevenLabsSoundGen::with_endpoint(
        config.generation.endpoint.clone(),
        Duration::from_secs(config.generation.request_timeout_secs),
    )?)
}

async fn run_bot(config: FxbotConfig) -> anyhow::Result<()> {
    let validation = fxbot_config::validate(&config);
    for d in validation.warnings() {
        warn!(path = d.path, "{}", d.message);
    }
    validation.into_result()?;
    fxbot_config::require_token(&config)?;

    let options = PollingOptions::from_config(&config.telegram);
    let bot = fxbot_telegram::build_bot(&config.telegram.token, options)?;
    let outbound: Arc<dyn ChatOutbound> = Arc::new(TelegramOutbound::new(bot.clone()));
    let router = Arc::new(CommandRouter::with_default_commands(
        outbound,
        Arc::new(generator(&config)?),
        config.generation.prompt_influence,
    ));

    let cancel = CancellationToken::new();
    let mut handle = fxbot_telegram::start_polling(bot, router, options, cancel.clone())
        .await
        .context("failed to start telegram bot")?;
    info!(endpoint = %config.generation.endpoint, "fxbot running, press Ctrl-C to stop");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("shutting down");
            cancel.cancel();
            (&mut handle).await.context("polling task failed")?;
        },
        joined = &mut handle => {
            joined.context("polling task failed")?;
            warn!("telegram polling stopped, exiting");
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let filter = init_telemetry(&cli);
    let config = load_config(&cli)?;
    apply_config_debug(&cli, &config, filter.as_ref());

    info!(version = env!("CARGO_PKG_VERSION"), "fxbot starting");

    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Generate(args)) => {
            generate_commands::handle_generate(&generator(&config)?, &config, args).await
        },
        Some(Commands::Check) => config_commands::check(&config, cli.config.as_deref()),
    }
}
