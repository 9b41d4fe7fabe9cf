use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-concurrent-requests = 10
connect-timeout-secs = 5
read-timeout-secs = 15
skip-extensions = [".png", ".zip"]

[output]
reports-dir = "./out"
preview-rows = 20
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_concurrent_requests, 10);
        assert_eq!(config.crawler.connect_timeout_secs, 5);
        assert_eq!(config.crawler.read_timeout_secs, 15);
        assert_eq!(config.crawler.skip_extensions, vec![".png", ".zip"]);
        assert_eq!(config.output.reports_dir, std::path::PathBuf::from("./out"));
        assert_eq!(config.output.preview_rows, 20);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config("[crawler]\nread-timeout-secs = 3\n").unwrap();

        assert_eq!(config.crawler.read_timeout_secs, 3);
        assert_eq!(config.crawler.max_concurrent_requests, 50);
        assert_eq!(config.crawler.connect_timeout_secs, 40);
        assert!(config.crawler.skip_extensions.contains(&".pdf".to_string()));
        assert_eq!(config.output.preview_rows, 50);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.max_concurrent_requests, 50);
        assert_eq!(
            config.output.reports_dir,
            std::path::PathBuf::from("reports")
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/cache-probe.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nmax-concurrent-requests = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
