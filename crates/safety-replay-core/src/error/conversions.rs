//! From trait implementations for ReplayError conversions

use super::types::ReplayError;

impl From<serde_json::Error> for ReplayError {
    fn from(error: serde_json::Error) -> Self {
        Self::config(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for ReplayError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        let url = error.url().map(|u| u.to_string());
        Self::Http {
            message: error.to_string(),
            url,
            status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ReplayError = json_err.into();
        assert!(matches!(err, ReplayError::Config { .. }));
    }

    #[test]
    fn test_reqwest_error_conversion() {
        let request_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err: ReplayError = request_err.into();
        assert!(matches!(
            err,
            ReplayError::Http {
                status_code: None,
                ..
            }
        ));
    }
}
