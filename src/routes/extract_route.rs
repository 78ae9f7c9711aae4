use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use askama::Template;
use serde::{Deserialize, Serialize};

use crate::{
    configuration::ApplicationSettings,
    domain::{FieldView, JobPosting},
    services::{run_isolated, Pipeline, ReportEntry, RunGate, RunJournal, RunOutcome},
};

const BUSY_MESSAGE: &str = "An extraction is already running. Try again when it has finished.";

#[derive(Deserialize)]
struct ExtractInput {
    li_at: String,
    #[serde(default)]
    url: Option<String>,
}

struct RunReport {
    outcome: RunOutcome,
    messages: Vec<ReportEntry>,
}

async fn execute(
    pipeline: web::Data<Pipeline>,
    gate: &RunGate,
    application: &ApplicationSettings,
    input: ExtractInput,
) -> Option<RunReport> {
    let permit = gate.try_enter()?;

    let target = input
        .url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| application.default_target.clone());
    let journal = Arc::new(RunJournal::new());
    let outcome = run_isolated(
        pipeline.into_inner(),
        input.li_at,
        target,
        journal.clone(),
        permit,
    )
    .await;

    Some(RunReport {
        outcome,
        messages: journal.entries(),
    })
}

struct PostView {
    number: usize,
    left: Vec<FieldView>,
    right: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "results.html")]
struct ResultsTemplate {
    headline: String,
    state: &'static str,
    messages: Vec<ReportEntry>,
    raw_json: Option<String>,
    posts: Vec<PostView>,
}

impl ResultsTemplate {
    fn busy() -> Self {
        ResultsTemplate {
            headline: BUSY_MESSAGE.to_string(),
            state: "busy",
            messages: vec![],
            raw_json: None,
            posts: vec![],
        }
    }

    fn from_report(report: RunReport) -> Self {
        let headline = match &report.outcome {
            RunOutcome::Completed { records } if !records.is_empty() => "Extraction Complete!",
            RunOutcome::Completed { .. } => "Extraction finished without results",
            RunOutcome::AuthFailure { .. } => "Cookie rejected by LinkedIn",
            RunOutcome::Rejected { .. } => "Missing or invalid input",
            RunOutcome::Errored { .. } => "An error occurred",
        };
        let records = report.outcome.records();

        ResultsTemplate {
            headline: headline.to_string(),
            state: report.outcome.label(),
            raw_json: render_raw(records),
            posts: records
                .iter()
                .enumerate()
                .map(|(i, post)| PostView {
                    number: i + 1,
                    left: post.left_column(),
                    right: post.right_column(),
                })
                .collect(),
            messages: report.messages,
        }
    }
}

fn render_raw(records: &[JobPosting]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    match serde_json::to_string_pretty(records) {
        Ok(raw) => Some(raw),
        Err(e) => {
            log::error!("Failed to render records as JSON: {}", e);
            None
        }
    }
}

#[post("/extract")]
pub async fn extract_page(
    form: web::Form<ExtractInput>,
    pipeline: web::Data<Pipeline>,
    gate: web::Data<RunGate>,
    application: web::Data<ApplicationSettings>,
) -> HttpResponse {
    let page = match execute(pipeline, &gate, &application, form.into_inner()).await {
        Some(report) => ResultsTemplate::from_report(report),
        None => ResultsTemplate::busy(),
    };

    match page.render() {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(e) => {
            log::error!("Failed to render results page: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Serialize)]
struct ExtractResponse {
    #[serde(flatten)]
    outcome: RunOutcome,
    messages: Vec<ReportEntry>,
}

#[post("/api/extract")]
pub async fn extract_json(
    body: web::Json<ExtractInput>,
    pipeline: web::Data<Pipeline>,
    gate: web::Data<RunGate>,
    application: web::Data<ApplicationSettings>,
) -> HttpResponse {
    let Some(report) = execute(pipeline, &gate, &application, body.into_inner()).await else {
        return HttpResponse::Conflict()
            .json(serde_json::json!({ "status": "busy", "detail": BUSY_MESSAGE }));
    };

    let mut response = match &report.outcome {
        RunOutcome::Completed { .. } => HttpResponse::Ok(),
        RunOutcome::Rejected { .. } => HttpResponse::BadRequest(),
        RunOutcome::AuthFailure { .. } => HttpResponse::Unauthorized(),
        RunOutcome::Errored { .. } => HttpResponse::BadGateway(),
    };

    response.json(ExtractResponse {
        outcome: report.outcome,
        messages: report.messages,
    })
}
