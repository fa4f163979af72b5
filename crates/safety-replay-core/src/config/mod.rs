//! Configuration for replay runs
//!
//! Configuration is assembled from layered sources (defaults, a JSON or TOML
//! file, `REPLAY_*` environment variables, command-line overrides) by
//! [`ConfigLoader`], then validated once.

pub mod env_loader;
pub mod file_loader;
pub mod loader;
pub mod logging_config;
pub mod model;

pub use env_loader::{load_overrides_from_env, overrides_from_vars};
pub use file_loader::load_from_file;
pub use loader::{ConfigLoader, ConfigSource};
pub use logging_config::{LogFormat, LoggingConfig};
pub use model::{ConfigOverrides, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, ReplayConfig};
