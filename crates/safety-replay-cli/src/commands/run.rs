//! Download-then-replay command

use crate::args::GlobalOptions;
use crate::console::CliConsole;
use safety_replay_core::error::ReplayResult;
use safety_replay_core::{FetchOutcome, ReplayConfig, RunEvent, RunReport, Runner};

/// Run both passes over every configured case
pub async fn execute(config: ReplayConfig, options: &GlobalOptions) -> ReplayResult<()> {
    let console = CliConsole::new(options.verbose);
    let json = options.json;

    if !json {
        console.print_header("Safety Replay");
        console.info(&format!("Base URL: {}", config.base_url));
        console.info(&format!("Data directory: {}", config.data_dir.display()));
        console.info(&format!("Cases: {}", config.cases.len()));
    }

    let runner = Runner::from_config(config)?.with_observer(move |event| {
        if !json {
            print_event(&console, event);
        }
    });
    let report = runner.run().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&console, &report);
    }

    report.into_result().map(|_| ())
}

pub(crate) fn print_event(console: &CliConsole, event: &RunEvent) {
    match event {
        RunEvent::Fetched { route, outcome } => match outcome {
            FetchOutcome::Present => console.info(&format!("{} already present", route)),
            FetchOutcome::Downloaded { bytes } => {
                console.info(&format!("downloaded {} ({} bytes)", route, bytes))
            }
            FetchOutcome::HttpStatus(status) => {
                console.warn(&format!("server answered {} for {}", status, route))
            }
        },
        RunEvent::FetchFailed { route, error } => {
            console.error(&format!("fetching {} failed: {}", route, error))
        }
        RunEvent::Replaying { route, mode, param } => console.status(&format!(
            "replaying {} with safety mode {} and param {}",
            route, mode, param
        )),
        RunEvent::Finished(outcome) => {
            if outcome.is_success() {
                console.success(&outcome.message());
            } else if outcome.is_failure() {
                console.error(&outcome.message());
            } else {
                console.warn(&outcome.message());
            }
        }
    }
}

fn print_summary(console: &CliConsole, report: &RunReport) {
    console.print_header("Summary");
    let total = report.outcomes.len();
    let failed = report.failures().len();
    let line = format!(
        "{} passed, {} failed, {} skipped ({} total)",
        report.passed(),
        failed,
        report.skipped(),
        total
    );
    if failed == 0 {
        console.success(&line);
    } else {
        console.error(&line);
    }
}
