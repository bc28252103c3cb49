use crate::config::types::{Config, ContentConfig, CrawlerConfig, IndexConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_content_config(&config.content)?;
    validate_index_config(&config.index, &config.content)?;
    validate_crawler_config(&config.crawler)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates content root configuration
fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "content root cannot be empty".to_string(),
        ));
    }

    if config.page_filename.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page-filename cannot be empty".to_string(),
        ));
    }

    if config
        .page_filename
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0')
    {
        return Err(ConfigError::Validation(format!(
            "page-filename must be a bare file name, got '{}'",
            config.page_filename
        )));
    }

    Ok(())
}

/// Validates index configuration
fn validate_index_config(config: &IndexConfig, content: &ContentConfig) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    // The crawl treats the content root as read-only
    if lexical_normalize(&config.database_path).starts_with(lexical_normalize(&content.root)) {
        return Err(ConfigError::Validation(format!(
            "database-path '{}' must not be inside the content root '{}'",
            config.database_path.display(),
            content.root.display()
        )));
    }

    if config.reader_connections < 1 || config.reader_connections > 64 {
        return Err(ConfigError::Validation(format!(
            "reader-connections must be between 1 and 64, got {}",
            config.reader_connections
        )));
    }

    Ok(())
}

/// Validates crawl scheduling configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.scan_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "scan-interval-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Drops `.` components so `./web` and `web` compare equal
fn lexical_normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::new("./web", "./backup/pages.db")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_page_filename() {
        let mut config = valid_config();
        config.content.page_filename = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_page_filename_with_separator() {
        let mut config = valid_config();
        config.content.page_filename = "docs/index.html".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_database_inside_content_root() {
        let mut config = valid_config();
        config.index.database_path = PathBuf::from("web/pages.db");
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("content root"));
    }

    #[test]
    fn test_database_beside_content_root() {
        let mut config = valid_config();
        config.index.database_path = PathBuf::from("./website.db");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_reader_connections_bounds() {
        let mut config = valid_config();
        config.index.reader_connections = 0;
        assert!(validate(&config).is_err());

        config.index.reader_connections = 65;
        assert!(validate(&config).is_err());

        config.index.reader_connections = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_scan_interval() {
        let mut config = valid_config();
        config.crawler.scan_interval_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = valid_config();
        config.server.bind = "localhost".to_string();
        assert!(validate(&config).is_err());
    }
}
