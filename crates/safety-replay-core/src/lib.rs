//! Safety Replay Core Library
//!
//! Downloads recorded driving logs, replays them through CAN safety models
//! and reports, per route, whether the safety model ever blocked a frame
//! openpilot sent while controls were allowed.

pub mod cases;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logs;
pub mod modes;
pub mod replay;
pub mod runner;
pub mod safety;

// Re-export commonly used types
pub use cases::{TestCase, default_cases};
pub use config::{ConfigLoader, ReplayConfig};
pub use error::{ReplayError, ReplayResult};
pub use fetch::{FetchOutcome, HttpFetcher, RouteFetcher};
pub use logs::{CanFrame, JsonLogReader, LogEvent, LogHandle, LogReader};
pub use modes::{ModeArg, SafetyModeTable};
pub use replay::{ReplayEngine, ReplayStats, ReplayVerdict, SafetyReplay};
pub use runner::{CaseStatus, RouteOutcome, RunEvent, RunReport, Runner};
