//! Semantic checks on a loaded configuration.

use crate::{
    error::{ConfigError, Result},
    schema::FxbotConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "generation.prompt_influence"
    pub path: &'static str,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Collapse error diagnostics into a [`ConfigError`].
    pub fn into_result(self) -> Result<()> {
        let errors: Vec<String> = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                message: errors.join("; "),
            })
        }
    }

    fn push(&mut self, severity: Severity, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path,
            message: message.into(),
        });
    }
}

/// Check the settings the bot runtime depends on.
///
/// A missing token is reported separately as [`ConfigError::MissingToken`]
/// by [`require_token`]; the one-off `generate` command runs without it.
#[must_use]
pub fn validate(config: &FxbotConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let generation = &config.generation;
    let telegram = &config.telegram;

    if !(0.0..=1.0).contains(&generation.prompt_influence) {
        result.push(
            Severity::Error,
            "generation.prompt_influence",
            format!("must be within [0, 1], got {}", generation.prompt_influence),
        );
    }
    if generation.request_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "generation.request_timeout_secs",
            "must be greater than zero",
        );
    } else if generation.request_timeout_secs > 600 {
        result.push(
            Severity::Warning,
            "generation.request_timeout_secs",
            "timeouts above 10 minutes keep stalled invocations alive for a long time",
        );
    }
    if !generation.endpoint.starts_with("http://") && !generation.endpoint.starts_with("https://")
    {
        result.push(
            Severity::Error,
            "generation.endpoint",
            format!("must be an http(s) URL, got {:?}", generation.endpoint),
        );
    }
    if telegram.max_concurrent_invocations == 0 {
        result.push(
            Severity::Error,
            "telegram.max_concurrent_invocations",
            "must be greater than zero",
        );
    }
    if telegram.poll_timeout_secs > 50 {
        result.push(
            Severity::Warning,
            "telegram.poll_timeout_secs",
            "long-poll timeouts above 50s may be cut by the HTTP client",
        );
    }

    result
}

/// Fail with [`ConfigError::MissingToken`] unless a bot token is configured.
pub fn require_token(config: &FxbotConfig) -> Result<()> {
    if config.telegram.has_token() {
        Ok(())
    } else {
        Err(ConfigError::MissingToken)
    }
}
