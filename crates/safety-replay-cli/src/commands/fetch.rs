//! Download pass without replay

use crate::args::GlobalOptions;
use crate::commands::run::print_event;
use crate::console::CliConsole;
use safety_replay_core::error::{ReplayError, ReplayResult};
use safety_replay_core::{ReplayConfig, RunEvent, Runner};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Make every configured route available locally
///
/// Fails when any route could not be downloaded, including routes the
/// server answered with a non-success status.
pub async fn execute(config: ReplayConfig, options: &GlobalOptions) -> ReplayResult<()> {
    let console = CliConsole::new(options.verbose);
    console.print_header("Fetching routes");

    let unavailable = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&unavailable);
    let runner = Runner::from_config(config)?.with_observer(move |event| {
        let missing = match event {
            RunEvent::Fetched { outcome, .. } => !outcome.is_available(),
            RunEvent::FetchFailed { .. } => true,
            _ => false,
        };
        if missing {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        print_event(&console, event);
    });

    let results = runner.download_pass().await;
    let missing = unavailable.load(Ordering::Relaxed);
    if missing > 0 {
        return Err(ReplayError::other(format!(
            "{} of {} route(s) unavailable",
            missing,
            results.len()
        )));
    }

    console.success(&format!("{} route(s) available", results.len()));
    Ok(())
}
