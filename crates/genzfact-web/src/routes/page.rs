//! HTMX-driven analysis page handlers.
//!
//! `POST /analyze` returns an HTML fragment for HTMX swaps, or the full page
//! when the browser submitted the form without JavaScript.

use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use genzfact_core::{query::ACCEPTED_EXTENSIONS, AnalysisOutcome, Query, Upload};
use tracing::{debug, warn};

use crate::state::AppState;

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    accept: String,
    prompt: String,
    outcome_html: Option<String>,
}

#[derive(Template)]
#[template(path = "partials/outcome.html")]
struct OutcomeTemplate {
    kind: &'static str,
    message: String,
    report_html: String,
    verdict: String,
}

impl OutcomeTemplate {
    fn from_outcome(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Rendered(report) => Self {
                kind: "report",
                message: String::new(),
                verdict: report
                    .verdict()
                    .map(|b| b.label().to_string())
                    .unwrap_or_default(),
                report_html: report.html,
            },
            AnalysisOutcome::Warning(message) => Self {
                kind: "warning",
                message,
                report_html: String::new(),
                verdict: String::new(),
            },
            AnalysisOutcome::Failed(message) => Self {
                kind: "error",
                message,
                report_html: String::new(),
                verdict: String::new(),
            },
        }
    }
}

/// Fields read from the multipart form.
#[derive(Debug, Default)]
struct FormInput {
    prompt: Option<String>,
    upload: Option<Upload>,
}

// ============================================================
// HANDLERS
// ============================================================

/// GET / - Render the analysis page.
pub async fn index() -> Response {
    render_page(String::new(), None)
}

/// POST /analyze - Run one analysis from the submitted form.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let is_htmx = headers.contains_key("hx-request");

    let input = match read_form(multipart).await {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "Malformed analysis form");
            let outcome = AnalysisOutcome::Warning(format!("Could not read the submitted form: {}", e.body_text()));
            return respond(is_htmx, String::new(), outcome);
        }
    };

    let prompt = input.prompt.clone().unwrap_or_default();
    let query = Query::new(input.prompt, input.upload);
    let outcome = state.analyzer.run(&query).await;

    respond(is_htmx, prompt, outcome)
}

// ============================================================
// HELPERS
// ============================================================

async fn read_form(mut multipart: Multipart) -> Result<FormInput, MultipartError> {
    let mut input = FormInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("prompt") => {
                input.prompt = Some(field.text().await?);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                debug!(file_name = %file_name, size = bytes.len(), "Received upload");
                input.upload = Some(Upload::new(file_name, declared.as_deref(), bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(input)
}

fn respond(is_htmx: bool, prompt: String, outcome: AnalysisOutcome) -> Response {
    let fragment = match OutcomeTemplate::from_outcome(outcome).render() {
        Ok(html) => html,
        Err(e) => return template_error(e),
    };

    if is_htmx {
        Html(fragment).into_response()
    } else {
        render_page(prompt, Some(fragment))
    }
}

fn render_page(prompt: String, outcome_html: Option<String>) -> Response {
    let accept = ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let template = IndexTemplate {
        accept,
        prompt,
        outcome_html,
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => template_error(e),
    }
}

fn template_error(e: askama::Error) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Template error: {}", e))).into_response()
}
