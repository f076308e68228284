//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, HeraldConfig, LogOutput, LoggingConfig, TriggerOverride};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_bot_config(&config.bot)?;
    for (name, over) in &config.triggers {
        validate_trigger_override(name, over)?;
    }
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid log filter module name: {module:?}"
        )));
    }

    Ok(())
}

/// Validates bot-wide settings.
fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.default_prefix.is_empty() {
        return Err(ConfigError::missing_field("bot.default_prefix"));
    }

    if bot.default_prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(
            "bot.default_prefix cannot contain whitespace",
        ));
    }

    Ok(())
}

/// Validates a single trigger override.
fn validate_trigger_override(name: &str, over: &TriggerOverride) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::validation("Trigger name cannot be empty"));
    }

    if let Some(command) = &over.command {
        if command.command.is_empty() {
            return Err(ConfigError::validation(format!(
                "triggers.{name}.command must list at least one alias"
            )));
        }
        if command.command.iter().any(|alias| alias.is_empty()) {
            return Err(ConfigError::validation(format!(
                "triggers.{name}.command contains an empty alias"
            )));
        }
    }

    Ok(())
}
