//! Configuration loading, env substitution, overrides and validation.
//!
//! Config files: `fxbot.toml`, `fxbot.yaml` or `fxbot.json`,
//! searched in `./` then `~/.config/fxbot/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{ConfigError, Result},
    loader::{
        apply_env_overrides, config_dir, discover_and_load, discover_and_load_in, load, load_config,
    },
    schema::{FxbotConfig, GenerationConfig, TelegramConfig},
    validate::{Diagnostic, Severity, ValidationResult, require_token, validate},
};
