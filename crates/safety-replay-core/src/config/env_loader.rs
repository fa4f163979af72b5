//! Environment variable-based configuration loading

use crate::config::logging_config::LogFormat;
use crate::config::model::ConfigOverrides;
use crate::error::{ReplayError, ReplayResult};
use std::env;
use std::path::PathBuf;

/// Load overrides from `REPLAY_*` environment variables
pub fn load_overrides_from_env() -> ReplayResult<ConfigOverrides> {
    overrides_from_vars(|key| env::var(key).ok())
}

/// Build overrides from an arbitrary variable lookup
pub fn overrides_from_vars<F>(get: F) -> ReplayResult<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = ConfigOverrides::default();

    if let Some(base_url) = get("REPLAY_BASE_URL") {
        overrides.base_url = Some(base_url);
    }

    if let Some(data_dir) = get("REPLAY_DATA_DIR") {
        overrides.data_dir = Some(PathBuf::from(data_dir));
    }

    if let Some(fail_fast) = get("REPLAY_FAIL_FAST") {
        let fail_fast = match fail_fast.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => return Err(ReplayError::config("Invalid REPLAY_FAIL_FAST value")),
        };
        overrides.fail_fast = Some(fail_fast);
    }

    if let Some(timeout) = get("REPLAY_TIMEOUT_SECS") {
        let timeout: u64 = timeout
            .parse()
            .map_err(|_| ReplayError::config("Invalid REPLAY_TIMEOUT_SECS value"))?;
        overrides.request_timeout_secs = Some(timeout);
    }

    if let Some(level) = get("REPLAY_LOG_LEVEL") {
        overrides.log_level = Some(level);
    }

    if let Some(format) = get("REPLAY_LOG_FORMAT") {
        let format: LogFormat = format.parse().map_err(|e: String| {
            ReplayError::config(format!("Invalid REPLAY_LOG_FORMAT: {}", e))
        })?;
        overrides.log_format = Some(format);
    }

    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_overrides_from_vars() {
        let overrides = overrides_from_vars(lookup(&[
            ("REPLAY_BASE_URL", "http://localhost/"),
            ("REPLAY_DATA_DIR", "/data"),
            ("REPLAY_FAIL_FAST", "yes"),
            ("REPLAY_TIMEOUT_SECS", "15"),
            ("REPLAY_LOG_FORMAT", "Compact"),
        ]))
        .unwrap();

        assert_eq!(overrides.base_url.as_deref(), Some("http://localhost/"));
        assert_eq!(overrides.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(overrides.fail_fast, Some(true));
        assert_eq!(overrides.request_timeout_secs, Some(15));
        assert_eq!(overrides.log_level, None);
        assert_eq!(overrides.log_format, Some(LogFormat::Compact));
    }

    #[test]
    fn test_no_vars_no_overrides() {
        let overrides = overrides_from_vars(lookup(&[])).unwrap();
        assert_eq!(overrides, ConfigOverrides::default());
    }

    #[test]
    fn test_invalid_values() {
        assert!(overrides_from_vars(lookup(&[("REPLAY_FAIL_FAST", "maybe")])).is_err());
        assert!(overrides_from_vars(lookup(&[("REPLAY_TIMEOUT_SECS", "soon")])).is_err());
        assert!(overrides_from_vars(lookup(&[("REPLAY_LOG_FORMAT", "xml")])).is_err());
    }
}
