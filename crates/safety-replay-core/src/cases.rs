//! Replay test cases
//!
//! A test case names a route file, the safety mode it should be replayed
//! under, and the integer parameter handed to the safety hooks. The parameter
//! stays a string until replay time so that a malformed value is reported
//! against its route instead of aborting config loading.

use crate::error::{ReplayError, ReplayResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Route of the drive replayed by default
pub const DEFAULT_ROUTE: &str = "2e07163a1ba9a780|2019-06-06--09-36-50.bz2";

/// One (route, safety mode, parameter) entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Route identifier, used both as a file name and as a URL suffix
    pub route: String,
    /// Human-readable safety mode name
    pub mode: String,
    /// Safety parameter, parsed as an integer at replay time
    pub param: String,
}

impl TestCase {
    pub fn new(
        route: impl Into<String>,
        mode: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            route: route.into(),
            mode: mode.into(),
            param: param.into(),
        }
    }

    /// Parse a `route,mode,param` triple as given on the command line
    pub fn parse_spec(spec: &str) -> ReplayResult<Self> {
        let fields: Vec<&str> = spec.split(',').map(str::trim).collect();
        match fields.as_slice() {
            [route, mode, param]
                if !route.is_empty() && !mode.is_empty() && !param.is_empty() =>
            {
                Ok(Self::new(*route, *mode, *param))
            }
            _ => Err(ReplayError::invalid_field(
                format!("expected ROUTE,MODE,PARAM but got '{}'", spec),
                "case",
            )),
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.route, self.mode, self.param)
    }
}

/// The drive table replayed when no cases are configured
pub fn default_cases() -> Vec<TestCase> {
    vec![TestCase::new(DEFAULT_ROUTE, "TOYOTA", "100")]
}
