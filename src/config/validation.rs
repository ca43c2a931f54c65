use crate::config::types::{
    Config, CrawlerConfig, DiscoveryConfig, MetricsConfig, PolicyConfig, SeedsConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_seeds_config(&config.seeds)?;
    validate_policy_config(&config.policy)?;
    validate_metrics_config(&config.metrics)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.politeness_delay.is_finite() || config.politeness_delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "politeness_delay must be a finite number >= 0, got {}",
            config.politeness_delay
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.fetch_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout must be >= 1s, got {}s",
            config.fetch_timeout
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates seed source configuration
fn validate_seeds_config(config: &SeedsConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seeds path cannot be empty".to_string(),
        ));
    }

    if let Some(discovery) = &config.discovery {
        validate_discovery_config(discovery)?;
    }

    Ok(())
}

/// Validates the optional seed discovery settings
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation(
            "discovery query cannot be empty".to_string(),
        ));
    }

    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid discovery endpoint '{}': {}",
            config.endpoint, e
        ))
    })?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Discovery endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    if config.max_results < 1 || config.max_results > 100 {
        return Err(ConfigError::Validation(format!(
            "discovery max_results must be between 1 and 100, got {}",
            config.max_results
        )));
    }

    Ok(())
}

/// Validates URL policy configuration
fn validate_policy_config(config: &PolicyConfig) -> Result<(), ConfigError> {
    if config.banned_substrings.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "banned_substrings cannot contain an empty string".to_string(),
        ));
    }
    Ok(())
}

/// Validates metrics configuration
fn validate_metrics_config(config: &MetricsConfig) -> Result<(), ConfigError> {
    if config.enabled && config.report_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "report_interval must be >= 1s, got {}s",
            config.report_interval
        )));
    }
    Ok(())
}
