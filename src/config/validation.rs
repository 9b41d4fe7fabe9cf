use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::{ConfigError, ConfigResult};

/// Upper bound on the concurrent request ceiling
const MAX_CONCURRENT_REQUESTS_LIMIT: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_concurrent_requests < 1
        || config.max_concurrent_requests > MAX_CONCURRENT_REQUESTS_LIMIT
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and {}, got {}",
            MAX_CONCURRENT_REQUESTS_LIMIT, config.max_concurrent_requests
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.read_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "read-timeout-secs must be >= 1, got {}",
            config.read_timeout_secs
        )));
    }

    for ext in &config.skip_extensions {
        validate_extension(ext)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.reports_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "reports-dir cannot be empty".to_string(),
        ));
    }

    if config.preview_rows < 1 {
        return Err(ConfigError::Validation(format!(
            "preview-rows must be >= 1, got {}",
            config.preview_rows
        )));
    }

    Ok(())
}

/// Validates a skipped extension such as `.pdf`
fn validate_extension(ext: &str) -> ConfigResult<()> {
    let Some(body) = ext.strip_prefix('.') else {
        return Err(ConfigError::Validation(format!(
            "skip-extensions entry '{}' must start with '.'",
            ext
        )));
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "skip-extensions entry '{}' must be a dot followed by letters or digits",
            ext
        )));
    }

    Ok(())
}
