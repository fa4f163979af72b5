//! Configuration data structures

use crate::cases::{TestCase, default_cases};
use crate::config::logging_config::{LogFormat, LoggingConfig};
use crate::error::{ReplayError, ReplayResult};
use crate::modes::SafetyModeTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Blob store the route logs are fetched from
pub const DEFAULT_BASE_URL: &str = "https://commadataci.blob.core.windows.net/openpilotci/";

/// Default configuration file name used across all CLI commands
pub const DEFAULT_CONFIG_FILE: &str = "replay_config.json";

/// Complete configuration of a replay run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Base URL; the route identifier is appended verbatim
    pub base_url: String,
    /// Directory route files are looked up in and downloaded to
    pub data_dir: PathBuf,
    /// Test cases, replayed in order
    pub cases: Vec<TestCase>,
    /// Extra or overriding safety mode names
    pub safety_modes: BTreeMap<String, u16>,
    /// Stop at the first failing case
    pub fail_fast: bool,
    /// Per-request timeout for downloads; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    pub logging: LoggingConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("."),
            cases: default_cases(),
            safety_modes: BTreeMap::new(),
            fail_fast: false,
            request_timeout_secs: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ReplayConfig {
    /// Apply a set of overrides on top of this configuration
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if !overrides.cases.is_empty() {
            self.cases = overrides.cases;
        }
        if let Some(fail_fast) = overrides.fail_fast {
            self.fail_fast = fail_fast;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    /// Validate the configuration and normalise the base URL
    pub fn validate(&mut self) -> ReplayResult<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ReplayError::config("Base URL cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ReplayError::config(format!(
                "Base URL must use http or https: '{}'",
                base_url
            )));
        }
        self.base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        if self.cases.is_empty() {
            return Err(ReplayError::config("At least one test case is required"));
        }
        for (index, case) in self.cases.iter().enumerate() {
            if case.route.trim().is_empty() {
                return Err(ReplayError::config(format!(
                    "Test case {} has an empty route",
                    index
                )));
            }
            if case.mode.trim().is_empty() {
                return Err(ReplayError::config(format!(
                    "Test case {} ({}) has an empty safety mode",
                    index, case.route
                )));
            }
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ReplayError::config(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Safety mode table with configured overrides applied
    pub fn mode_table(&self) -> SafetyModeTable {
        SafetyModeTable::builtin().with_overrides(
            self.safety_modes
                .iter()
                .map(|(name, code)| (name.clone(), *code)),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Partial configuration coming from the environment or the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    /// Replaces the configured cases when non-empty
    pub cases: Vec<TestCase>,
    pub fail_fast: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let mut config = ReplayConfig::default();
        config.validate().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cases.len(), 1);
        assert!(!config.fail_fast);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_validate_appends_trailing_slash() {
        let mut config = ReplayConfig {
            base_url: "http://127.0.0.1:8080/ci".to_string(),
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/ci/");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ReplayConfig {
            base_url: "ftp://example.com/".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = ReplayConfig {
            cases: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = ReplayConfig {
            cases: vec![TestCase::new(" ", "TOYOTA", "1")],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = ReplayConfig {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = ReplayConfig::default();
        config.apply(ConfigOverrides {
            base_url: Some("http://localhost/".to_string()),
            cases: vec![TestCase::new("routeX", "SUBARU", "0")],
            fail_fast: Some(true),
            log_level: Some("debug".to_string()),
            log_format: Some(LogFormat::Json),
            ..Default::default()
        });
        assert_eq!(config.base_url, "http://localhost/");
        assert_eq!(config.cases, vec![TestCase::new("routeX", "SUBARU", "0")]);
        assert!(config.fail_fast);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_empty_override_cases_keep_configured_cases() {
        let mut config = ReplayConfig::default();
        config.apply(ConfigOverrides::default());
        assert_eq!(config.cases, default_cases());
    }

    #[test]
    fn test_mode_table_overrides() {
        let mut config = ReplayConfig::default();
        config.safety_modes.insert("TOYOTA".to_string(), 100);
        let table = config.mode_table();
        assert_eq!(table.lookup("TOYOTA"), Some(100));
        assert_eq!(table.lookup("SUBARU"), Some(10));
    }
}
