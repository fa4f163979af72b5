//! Two-pass replay test runner
//!
//! The runner first makes every route file available (download pass), then
//! replays each test case in table order (replay pass). Every collaborator
//! is injected so tests can substitute fixtures for the network, the log
//! format and the replay engine.

mod report;

pub use report::{CaseStatus, RouteOutcome, RunReport};

use crate::cases::TestCase;
use crate::config::ReplayConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::fetch::{FetchOutcome, HttpFetcher, RouteFetcher, route_path};
use crate::logs::{JsonLogReader, LogReader};
use crate::modes::{ModeArg, SafetyModeTable};
use crate::replay::{ReplayEngine, SafetyReplay};
use tracing::{error, info, warn};

/// Progress notifications emitted while running
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Fetched {
        route: String,
        outcome: FetchOutcome,
    },
    FetchFailed {
        route: String,
        error: String,
    },
    Replaying {
        route: String,
        mode: ModeArg,
        param: String,
    },
    Finished(RouteOutcome),
}

type Observer = Box<dyn Fn(&RunEvent) + Send + Sync>;

pub struct Runner {
    config: ReplayConfig,
    modes: SafetyModeTable,
    fetcher: Box<dyn RouteFetcher>,
    reader: Box<dyn LogReader>,
    engine: Box<dyn ReplayEngine>,
    observer: Option<Observer>,
}

impl Runner {
    pub fn new(
        config: ReplayConfig,
        fetcher: Box<dyn RouteFetcher>,
        reader: Box<dyn LogReader>,
        engine: Box<dyn ReplayEngine>,
    ) -> Self {
        let modes = config.mode_table();
        Self {
            config,
            modes,
            fetcher,
            reader,
            engine,
            observer: None,
        }
    }

    /// Runner with the HTTP fetcher, JSON log reader and safety replay engine
    pub fn from_config(config: ReplayConfig) -> ReplayResult<Self> {
        let fetcher = HttpFetcher::new(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::new(
            config,
            Box::new(fetcher),
            Box::new(JsonLogReader::new()),
            Box::new(SafetyReplay::new()),
        ))
    }

    /// Replace the safety mode table derived from the configuration
    pub fn with_modes(mut self, modes: SafetyModeTable) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RunEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    fn emit(&self, event: RunEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Make sure one route file exists in the data directory
    pub async fn ensure_fetched(&self, route: &str) -> ReplayResult<FetchOutcome> {
        self.fetcher
            .ensure_fetched(route, &self.config.data_dir)
            .await
    }

    /// Download pass: one result per case, in table order
    ///
    /// With fail-fast enabled the pass stops at the first error and the
    /// returned list is shorter than the case table.
    pub async fn download_pass(&self) -> Vec<ReplayResult<FetchOutcome>> {
        let mut results = Vec::with_capacity(self.config.cases.len());
        for case in &self.config.cases {
            let result = self.ensure_fetched(&case.route).await;
            match &result {
                Ok(outcome) => self.emit(RunEvent::Fetched {
                    route: case.route.clone(),
                    outcome: outcome.clone(),
                }),
                Err(e) => {
                    error!("Fetching {} failed: {}", case.route, e);
                    self.emit(RunEvent::FetchFailed {
                        route: case.route.clone(),
                        error: e.to_string(),
                    });
                }
            }
            let stop = result.is_err() && self.config.fail_fast;
            results.push(result);
            if stop {
                break;
            }
        }
        results
    }

    /// Replay one case and judge the result
    pub fn run_replay(&self, case: &TestCase) -> RouteOutcome {
        let status = self.replay_status(case);
        let outcome = self.finish(case, status);
        if outcome.is_success() {
            info!("{}", outcome.message());
        } else {
            warn!("{}", outcome.message());
        }
        outcome
    }

    fn replay_status(&self, case: &TestCase) -> CaseStatus {
        let path = route_path(&self.config.data_dir, &case.route);
        let log = match self.reader.read(&path) {
            Ok(log) => log,
            Err(e) => return CaseStatus::LogFailed(e.to_string()),
        };

        let mode = self.modes.resolve(&case.mode);
        info!(
            "replaying {} with safety mode {} and param {}",
            case.route, mode, case.param
        );
        self.emit(RunEvent::Replaying {
            route: case.route.clone(),
            mode: mode.clone(),
            param: case.param.clone(),
        });

        let param = match parse_param(&case.param) {
            Ok(param) => param,
            Err(e) => return CaseStatus::InvalidParam(e.to_string()),
        };

        match self.engine.replay(&log, &mode, param) {
            Ok(verdict) if verdict.passed => CaseStatus::Passed(verdict.stats),
            Ok(verdict) => CaseStatus::Failed(verdict.stats),
            Err(e) => CaseStatus::ReplayError(e.to_string()),
        }
    }

    /// Download pass followed by the replay pass
    ///
    /// Observers get exactly one `Finished` event per case, skipped ones
    /// included.
    pub async fn run(&self) -> RunReport {
        let cases = &self.config.cases;
        let fetches = self.download_pass().await;
        let mut outcomes = Vec::with_capacity(cases.len());

        // a failed download under fail-fast ends the run before any replay
        if self.config.fail_fast && fetches.iter().any(Result::is_err) {
            for (index, case) in cases.iter().enumerate() {
                let status = match fetches.get(index) {
                    Some(Err(e)) => CaseStatus::FetchFailed(e.to_string()),
                    _ => CaseStatus::Skipped,
                };
                outcomes.push(self.finish(case, status));
            }
            return RunReport::new(outcomes);
        }

        let mut failed = false;
        for (case, fetch) in cases.iter().zip(fetches) {
            let outcome = match fetch {
                _ if failed => self.finish(case, CaseStatus::Skipped),
                Err(e) => self.finish(case, CaseStatus::FetchFailed(e.to_string())),
                Ok(_) => self.run_replay(case),
            };
            failed = failed || (self.config.fail_fast && outcome.is_failure());
            outcomes.push(outcome);
        }
        RunReport::new(outcomes)
    }

    fn finish(&self, case: &TestCase, status: CaseStatus) -> RouteOutcome {
        let outcome = RouteOutcome::new(case.clone(), status);
        self.emit(RunEvent::Finished(outcome.clone()));
        outcome
    }
}

/// Parse a safety parameter, tolerating surrounding whitespace
pub fn parse_param(raw: &str) -> ReplayResult<i16> {
    raw.trim().parse::<i16>().map_err(|e| {
        ReplayError::invalid_field(format!("'{}' is not a 16-bit integer: {}", raw, e), "param")
    })
}
