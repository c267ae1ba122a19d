use std::path::Path;

use {
    anyhow::Result,
    fxbot_config::{FxbotConfig, Severity},
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub fn check(config: &FxbotConfig, explicit: Option<&Path>) -> Result<()> {
    match explicit {
        Some(path) => eprintln!("Checking {}\n", path.display()),
        None => eprintln!("Checking discovered config and environment.\n"),
    }

    let mut result = fxbot_config::validate(config);
    if let Err(e) = fxbot_config::require_token(config) {
        result.diagnostics.push(fxbot_config::Diagnostic {
            severity: Severity::Error,
            path: "telegram.token",
            message: e.to_string(),
        });
    }

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = result.diagnostics.len() - errors;

    if result.diagnostics.is_empty() {
        eprintln!("No issues found.");
    } else {
        eprintln!("\n{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
