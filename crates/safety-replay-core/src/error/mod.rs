//! Error types for Safety Replay
//!
//! Every fallible operation in the core crate returns [`ReplayResult`]. The
//! variants carry enough structure (paths, URLs, status codes, field names)
//! for the runner to turn them into per-route outcomes and for the CLI to
//! print something useful.

mod constructors;
mod conversions;
mod types;

pub use types::{ReplayError, ReplayResult};
