use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
pub fn parse_config(text: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the raw configuration text
///
/// Every crawl run records this hash, so the run history shows which
/// configuration produced which index state. Formatting changes count as a
/// different configuration.
pub fn config_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Loads, parses and validates the configuration file at `path`
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// The file is read once, so the hash always describes the loaded config
/// even if the file is rewritten concurrently.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    Ok((config, config_hash(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[content]
root = "./web"

[index]
database-path = "./backup/pages.db"
"#;

    #[test]
    fn test_parse_every_section() {
        let config = parse_config(
            r#"
[content]
root = "/srv/web"
page-filename = "INDEX.HTM"

[index]
database-path = "/var/lib/shelfmark/pages.db"
reader-connections = 8

[crawler]
scan-interval-secs = 300

[server]
bind = "127.0.0.1:8080"
"#,
        )
        .unwrap();

        assert_eq!(config.content.root, PathBuf::from("/srv/web"));
        assert_eq!(config.content.page_filename, "INDEX.HTM");
        assert_eq!(
            config.index.database_path,
            PathBuf::from("/var/lib/shelfmark/pages.db")
        );
        assert_eq!(config.index.reader_connections, 8);
        assert_eq!(config.crawler.scan_interval_secs, 300);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_omitted_settings_take_defaults() {
        let config = parse_config(MINIMAL).unwrap();

        assert_eq!(config.content.page_filename, "index.html");
        assert_eq!(config.index.reader_connections, 4);
        assert_eq!(config.crawler.scan_interval_secs, 60);
        assert_eq!(config.server.bind, "0.0.0.0:2025");
    }

    #[test]
    fn test_missing_index_section_is_a_parse_error() {
        let result = parse_config("[content]\nroot = \"./web\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_snake_case_keys_are_rejected() {
        let text = MINIMAL.replace("database-path", "database_path");
        assert!(matches!(parse_config(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parsed_config_is_validated() {
        let text = format!("{}\n[crawler]\nscan-interval-secs = 0\n", MINIMAL);
        assert!(matches!(
            parse_config(&text),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_hash_tracks_exact_text() {
        let hash = config_hash(MINIMAL);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, config_hash(MINIMAL));

        let reformatted = MINIMAL.replace("root = ", "root=");
        assert_eq!(
            parse_config(&reformatted).unwrap().content.root,
            parse_config(MINIMAL).unwrap().content.root
        );
        assert_ne!(config_hash(&reformatted), hash);
    }

    #[test]
    fn test_load_config_with_hash_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shelfmark.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let (config, hash) = load_config_with_hash(&path).unwrap();
        assert_eq!(config.content.root, PathBuf::from("./web"));
        assert_eq!(hash, config_hash(MINIMAL));
        assert_eq!(load_config(&path).unwrap().index.reader_connections, 4);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config_with_hash(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
