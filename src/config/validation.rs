use crate::config::types::{CrawlerSettings, OutputSettings, Settings, UserAgentSettings};
use crate::ConfigError;

/// Validates the entire settings file
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_settings(&settings.crawler)?;
    validate_user_agent_settings(&settings.user_agent)?;
    validate_output_settings(&settings.output)?;
    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if settings.max_concurrent_fetches < 1 || settings.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            settings.max_concurrent_fetches
        )));
    }

    if settings.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            settings.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the request identity
fn validate_user_agent_settings(settings: &UserAgentSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Header values cannot carry line breaks
    if settings.user_agent.chars().any(|c| c == '\r' || c == '\n') {
        return Err(ConfigError::Validation(
            "user_agent must be a single line".to_string(),
        ));
    }

    Ok(())
}

/// Validates output settings
fn validate_output_settings(settings: &OutputSettings) -> Result<(), ConfigError> {
    if settings.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
