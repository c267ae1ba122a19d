use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{ConfigError, Result},
    schema::FxbotConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["fxbot.toml", "fxbot.yaml", "fxbot.yml", "fxbot.json"];

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_API_TOKEN";

/// Environment variable enabling debug mode (`true`, any case).
pub const DEBUG_ENV: &str = "BOT_DEBUG";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<FxbotConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./fxbot.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/fxbot/fxbot.{toml,yaml,yml,json}` (user-global)
///
/// Returns `FxbotConfig::default()` if no usable config file is found.
pub fn discover_and_load() -> FxbotConfig {
    discover_and_load_in(Path::new("."))
}

/// Same as [`discover_and_load`], with `local_dir` standing in for `./`.
pub fn discover_and_load_in(local_dir: &Path) -> FxbotConfig {
    if let Some(path) = find_config_file(local_dir) {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    FxbotConfig::default()
}

/// Load the effective configuration: an explicit file (errors are fatal) or
/// the discovered one, then environment overrides on top.
pub fn load(explicit: Option<&Path>) -> Result<FxbotConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Apply `TELEGRAM_BOT_API_TOKEN` and `BOT_DEBUG` on top of file values.
pub fn apply_env_overrides(config: &mut FxbotConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        config.telegram.token = Secret::new(token);
    }
    if let Some(flag) = lookup(DEBUG_ENV) {
        config.telegram.debug = flag.trim().eq_ignore_ascii_case("true");
    }
}

/// Returns the user-global config directory (`~/.config/fxbot/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "fxbot").map(|d| d.config_dir().to_path_buf())
}

/// Find the first config file under `local_dir`, then in the user config dir.
fn find_config_file(local_dir: &Path) -> Option<PathBuf> {
    let user_dir = config_dir();
    std::iter::once(local_dir.to_path_buf())
        .chain(user_dir)
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<FxbotConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| ConfigError::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| ConfigError::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| ConfigError::parse(path, e)),
        other => Err(ConfigError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
