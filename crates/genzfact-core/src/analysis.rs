//! The analysis pipeline: validate, build parts, call the model, format, render.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::badge::{Badge, BadgeFormatter};
use crate::config::GenzConfig;
use crate::error::{GenzError, GenzResult};
use crate::model::ModelClient;
use crate::query::Query;
use crate::render::render_report;
use crate::request::build_parts;

/// Prefix of every user-visible failure message.
pub const FAILURE_PREFIX: &str = "An error occurred during analysis";

/// A finished analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Model output as received (trimmed).
    pub raw_text: String,
    /// Container-wrapped HTML with badge spans.
    pub html: String,
    /// Badges in order of appearance.
    pub badges: Vec<Badge>,
    pub elapsed_ms: u64,
}

impl AnalysisReport {
    pub fn verdict(&self) -> Option<Badge> {
        self.badges.first().copied()
    }
}

/// What a user interface shows after one "Analyze" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Rendered(AnalysisReport),
    /// Input problem; no model call was made.
    Warning(String),
    /// Model call failed; nothing is rendered.
    Failed(String),
}

impl AnalysisOutcome {
    pub fn from_result(result: GenzResult<AnalysisReport>) -> Self {
        match result {
            Ok(report) => Self::Rendered(report),
            Err(e) if e.is_input_error() => Self::Warning(e.to_string()),
            Err(e) => Self::Failed(failure_message(&e)),
        }
    }
}

/// User-visible text for a failed analysis.
pub fn failure_message(err: &GenzError) -> String {
    format!("{}: {}", FAILURE_PREFIX, err)
}

/// Runs analyses against one model with one immutable configuration.
pub struct Analyzer {
    client: Arc<dyn ModelClient>,
    formatter: BadgeFormatter,
    config: Arc<GenzConfig>,
}

impl Analyzer {
    pub fn new(client: Arc<dyn ModelClient>, config: Arc<GenzConfig>) -> Self {
        let formatter = BadgeFormatter::new(config.palette.clone());
        Self {
            client,
            formatter,
            config,
        }
    }

    pub fn config(&self) -> &GenzConfig {
        &self.config
    }

    pub fn formatter(&self) -> &BadgeFormatter {
        &self.formatter
    }

    /// Analyze one query. Makes exactly one model call for a valid query and
    /// none for an invalid one.
    pub async fn analyze(&self, query: &Query) -> GenzResult<AnalysisReport> {
        query.validate(self.config.max_upload_bytes)?;

        let parts = build_parts(query);
        info!(
            model = self.client.name(),
            parts = parts.len(),
            has_file = query.upload.is_some(),
            file_bytes = query.upload.as_ref().map(|u| u.len()).unwrap_or(0),
            mime_type = query.upload.as_ref().map(|u| u.mime_type.as_str()).unwrap_or("-"),
            "Starting analysis"
        );

        let started = Instant::now();
        let raw_text = self
            .client
            .generate(&self.config.system_instruction, &parts)
            .await?;
        let raw_text = raw_text.trim().to_string();

        let rendered = render_report(&raw_text, &self.formatter);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if rendered.badges.is_empty() {
            warn!("Model response has no Badge line");
        }
        info!(
            elapsed_ms,
            badges = rendered.badges.len(),
            verdict = rendered.badges.first().map(Badge::label).unwrap_or("-"),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            raw_text,
            html: rendered.html,
            badges: rendered.badges,
            elapsed_ms,
        })
    }

    /// Analyze and fold the result into what the user should see.
    pub async fn run(&self, query: &Query) -> AnalysisOutcome {
        let result = self.analyze(query).await;
        if let Err(e) = &result {
            if e.is_input_error() {
                info!(error = %e, "Rejected submission");
            } else {
                warn!(error = %e, "Analysis failed");
            }
        }
        AnalysisOutcome::from_result(result)
    }
}
