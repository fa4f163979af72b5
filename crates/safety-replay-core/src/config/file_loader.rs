//! File-based configuration loading

use crate::config::model::ReplayConfig;
use crate::error::{ReplayError, ReplayResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON and TOML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> ReplayResult<ReplayConfig> {
    if !path.exists() {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        return Ok(ReplayConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ReplayError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: ReplayConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            ReplayError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            ReplayError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::TestCase;
    use crate::config::LogFormat;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("replay.json");
        let config_json = r#"{
            "base_url": "http://localhost:9000/ci/",
            "cases": [
                {"route": "routeX", "mode": "SUBARU", "param": "0"}
            ],
            "fail_fast": true,
            "logging": {"format": "json"}
        }"#;
        fs::write(&config_path, config_json).unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/ci/");
        assert_eq!(config.cases, vec![TestCase::new("routeX", "SUBARU", "0")]);
        assert!(config.fail_fast);
        assert_eq!(config.logging.format, LogFormat::Json);
        // Unset fields fall back to defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("replay.toml");
        let config_toml = r#"
            data_dir = "/tmp/routes"
            request_timeout_secs = 30

            [safety_modes]
            TOYOTA = 100

            [[cases]]
            route = "routeX"
            mode = "TOYOTA"
            param = "100"
        "#;
        fs::write(&config_path, config_toml).unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.data_dir, std::path::PathBuf::from("/tmp/routes"));
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.safety_modes.get("TOYOTA"), Some(&100));
        assert_eq!(config.cases.len(), 1);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ReplayConfig::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON config"));
    }
}
