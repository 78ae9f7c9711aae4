use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::domain::{JobPosting, SessionToken};

use super::{ExtractionOrchestrator, FetchError, Reporter, RunPermit, SessionFetcher};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Inputs were unusable; nothing was launched.
    Rejected { reason: String },
    AuthFailure { landed_on: String },
    Completed { records: Vec<JobPosting> },
    Errored { detail: String },
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Rejected { .. } => "rejected",
            RunOutcome::AuthFailure { .. } => "auth_failure",
            RunOutcome::Completed { .. } => "completed",
            RunOutcome::Errored { .. } => "errored",
        }
    }

    pub fn records(&self) -> &[JobPosting] {
        match self {
            RunOutcome::Completed { records } => records,
            _ => &[],
        }
    }
}

/// Fetch, then extract. One call is one run.
pub struct Pipeline {
    fetcher: SessionFetcher,
    orchestrator: ExtractionOrchestrator,
}

impl Pipeline {
    pub fn new(fetcher: SessionFetcher, orchestrator: ExtractionOrchestrator) -> Self {
        Pipeline {
            fetcher,
            orchestrator,
        }
    }

    pub async fn run(&self, cookie: &str, target: &str, reporter: &dyn Reporter) -> RunOutcome {
        let token = match SessionToken::parse(cookie) {
            Ok(token) => token,
            Err(e) => {
                reporter.error("Please enter your 'li_at' cookie.");
                return RunOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        };
        let target = match parse_target(target) {
            Ok(target) => target,
            Err(reason) => {
                reporter.error(&format!("Please enter a valid LinkedIn URL: {}", reason));
                return RunOutcome::Rejected { reason };
            }
        };

        reporter.status("Initializing...");
        let fragment = match self.fetcher.fetch(&token, &target, reporter).await {
            Ok(fragment) => fragment,
            Err(FetchError::AuthFailure { landed_on }) => {
                return RunOutcome::AuthFailure { landed_on };
            }
            Err(e) => {
                log::error!("Run against {} failed: {:?}", target, e);
                reporter.error(&format!("An error occurred: {}", e));
                return RunOutcome::Errored {
                    detail: e.to_string(),
                };
            }
        };

        let records = self.orchestrator.extract(&fragment, reporter).await;
        reporter.success("Extraction Complete!");
        if records.is_empty() {
            reporter.error("No data was extracted. Check the messages above for details.");
        }

        RunOutcome::Completed { records }
    }
}

/// Runs the pipeline on its own task so a panic inside a run is reported as
/// an errored run instead of tearing down the caller. The permit is released
/// when the task ends, even if the caller has gone away.
pub async fn run_isolated(
    pipeline: Arc<Pipeline>,
    cookie: String,
    target: String,
    reporter: Arc<dyn Reporter>,
    permit: RunPermit,
) -> RunOutcome {
    let task_reporter = reporter.clone();
    let handle = tokio::spawn(async move {
        let _permit = permit;
        pipeline.run(&cookie, &target, task_reporter.as_ref()).await
    });

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Extraction run aborted: {}", e);
            reporter.error(&format!("An error occurred: {}", e));
            RunOutcome::Errored {
                detail: e.to_string(),
            }
        }
    }
}

fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme `{}`", other)),
    }
}
