//! Command implementations

pub mod config;
pub mod fetch;
pub mod modes;
pub mod run;
