//! Safety Replay CLI
//!
//! Replays recorded drives through CAN safety models and fails when a model
//! blocks a frame openpilot sent while controls were allowed.
//!
//! # Usage
//!
//! ```bash
//! safety-replay                                  # download, then replay the configured drives
//! safety-replay --case "route.jsonl,SUBARU,0"    # replay an ad-hoc case
//! safety-replay fetch                            # only download missing routes
//! safety-replay modes                            # list known safety modes
//! safety-replay config init                      # write a starter config file
//! ```
//!
//! Set RUST_LOG=debug for verbose logging.

mod args;
mod commands;
mod console;
mod logging;
mod router;

use clap::Parser;
use safety_replay_core::ReplayResult;

use args::Cli;

#[tokio::main]
async fn main() -> ReplayResult<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
