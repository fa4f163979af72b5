//! Per-route outcomes of a run

use crate::cases::TestCase;
use crate::error::{ReplayError, ReplayResult};
use crate::replay::ReplayStats;
use serde::Serialize;

/// What happened to one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed(ReplayStats),
    /// The engine ran and reported a falsy result
    Failed(ReplayStats),
    /// Transport or local I/O error while downloading
    FetchFailed(String),
    /// The log could not be read or parsed
    LogFailed(String),
    /// The parameter is not an integer
    InvalidParam(String),
    /// The engine itself returned an error
    ReplayError(String),
    /// Not attempted because an earlier case failed with fail-fast enabled
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteOutcome {
    pub case: TestCase,
    #[serde(flatten)]
    pub status: CaseStatus,
}

impl RouteOutcome {
    pub fn new(case: TestCase, status: CaseStatus) -> Self {
        Self { case, status }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, CaseStatus::Passed(_))
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self.status, CaseStatus::Passed(_) | CaseStatus::Skipped)
    }

    /// One-line description of the outcome
    pub fn message(&self) -> String {
        let route = &self.case.route;
        match &self.status {
            CaseStatus::Passed(_) => format!("replay passed on {}", route),
            CaseStatus::Failed(_) => format!("replay failed on {}", route),
            CaseStatus::FetchFailed(e) => format!("fetch failed on {}: {}", route, e),
            CaseStatus::LogFailed(e) => format!("log unreadable on {}: {}", route, e),
            CaseStatus::InvalidParam(e) => format!("invalid param on {}: {}", route, e),
            CaseStatus::ReplayError(e) => format!("replay error on {}: {}", route, e),
            CaseStatus::Skipped => format!("skipped {}", route),
        }
    }
}

/// Outcomes of every case, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<RouteOutcome>,
}

impl RunReport {
    pub fn new(outcomes: Vec<RouteOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RouteOutcome::is_success)
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> Vec<&RouteOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure()).collect()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == CaseStatus::Skipped)
            .count()
    }

    /// Turn a report with failures into an error listing all of them
    pub fn into_result(self) -> ReplayResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let failures = self.failures();
        let summary = failures
            .iter()
            .map(|o| o.message())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ReplayError::CasesFailed {
            failed: failures.len(),
            total: self.outcomes.len(),
            summary,
        })
    }
}
