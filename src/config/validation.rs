//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use super::overrides::{CommandsConfig, parse_commands};
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one [[bots]] entry is required")]
    NoBots,
    #[error("bots[{0}].name is required")]
    MissingBotName(usize),
    #[error("duplicate bot name '{0}'")]
    DuplicateBotName(String),
    #[error("prefix for {section} must not contain whitespace, got '{prefix}'")]
    InvalidPrefix { section: String, prefix: String },
    #[error("{section}: {reason}")]
    InvalidCommands { section: String, reason: String },
}

fn check_prefix(section: &str, prefix: Option<&str>, errors: &mut Vec<ValidationError>) {
    if let Some(prefix) = prefix
        && prefix.chars().any(char::is_whitespace)
    {
        errors.push(ValidationError::InvalidPrefix {
            section: section.to_string(),
            prefix: prefix.to_string(),
        });
    }
}

fn check_commands(section: &str, commands: &CommandsConfig, errors: &mut Vec<ValidationError>) {
    if let Err(e) = parse_commands(commands) {
        errors.push(ValidationError::InvalidCommands {
            section: section.to_string(),
            reason: e.to_string(),
        });
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_prefix("defaults", config.defaults.prefix.as_deref(), &mut errors);
    check_commands("defaults", &config.defaults.commands, &mut errors);

    if config.bots.is_empty() {
        errors.push(ValidationError::NoBots);
    }

    let mut seen = HashSet::new();
    for (i, bot) in config.bots.iter().enumerate() {
        if bot.name.trim().is_empty() {
            errors.push(ValidationError::MissingBotName(i));
            continue;
        }
        if !seen.insert(bot.name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateBotName(bot.name.clone()));
        }
        let section = format!("bot '{}'", bot.name);
        check_prefix(&section, bot.prefix.as_deref(), &mut errors);
        check_commands(&section, &bot.commands, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::parse(
            r#"
[defaults]
prefix = "!"
[[bots]]
name = "main"
[[bots]]
name = "relay"
prefix = "bot:"
"#,
        )
        .expect("parses");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let config = Config::parse(
            r#"
[defaults]
prefix = "! "
[defaults.commands]
"resolve.Type.x" = 1
[[bots]]
name = "main"
[[bots]]
name = "MAIN"
[[bots]]
name = ""
"#,
        )
        .expect("parses");
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidPrefix { .. }));
        assert!(matches!(errors[1], ValidationError::InvalidCommands { .. }));
        assert!(matches!(errors[2], ValidationError::DuplicateBotName(ref n) if n == "MAIN"));
        assert!(matches!(errors[3], ValidationError::MissingBotName(2)));
    }

    #[test]
    fn test_no_bots() {
        let errors = validate(&Config::default()).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::NoBots]));
    }
}
