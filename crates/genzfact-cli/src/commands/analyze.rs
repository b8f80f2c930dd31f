//! One-shot terminal analysis.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use genzfact_core::{AnalysisOutcome, Analyzer, BadgeFormatter, GenzConfig, Query, Upload, VertexClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Claim or question to analyze
    pub text: Option<String>,

    /// Document, image or audio file to analyze
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print the model's text without badge colouring
    #[arg(long)]
    pub raw: bool,
}

pub async fn execute(args: AnalyzeArgs, config: GenzConfig) -> Result<()> {
    let upload = match &args.file {
        Some(path) => Some(
            Upload::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    let query = Query::new(args.text, upload);
    debug!(
        has_text = query.text.is_some(),
        file = ?args.file,
        "Running one-shot analysis"
    );

    let config = Arc::new(config);
    let client = Arc::new(VertexClient::new(&config));
    let analyzer = Analyzer::new(client, config);

    let spinner = if query.is_empty() { None } else { Some(spinner()) };
    let outcome = analyzer.run(&query).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    present(outcome, args.raw, analyzer.formatter())
}

/// Print the outcome. A warning exits successfully; a failed analysis does not.
fn present(outcome: AnalysisOutcome, raw: bool, formatter: &BadgeFormatter) -> Result<()> {
    match outcome {
        AnalysisOutcome::Rendered(report) => {
            if raw {
                println!("{}", report.raw_text);
            } else {
                output::print_report(&report, formatter);
            }
            Ok(())
        }
        AnalysisOutcome::Warning(message) => {
            println!("{} {}", "!".yellow().bold(), message.yellow());
            Ok(())
        }
        AnalysisOutcome::Failed(message) => {
            eprintln!("{} {}", "✗".red().bold(), message.red());
            bail!("analysis failed")
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("GenzFact is analyzing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzfact_core::{AnalysisReport, Badge};

    fn report() -> AnalysisReport {
        AnalysisReport {
            raw_text: "- Badge: false".to_string(),
            html: String::new(),
            badges: vec![Badge::False],
            elapsed_ms: 12,
        }
    }

    #[test]
    fn test_rendered_report_succeeds() {
        let formatter = BadgeFormatter::default();
        assert!(present(AnalysisOutcome::Rendered(report()), false, &formatter).is_ok());
        assert!(present(AnalysisOutcome::Rendered(report()), true, &formatter).is_ok());
    }

    #[test]
    fn test_warning_succeeds() {
        let outcome = AnalysisOutcome::Warning("Please provide some text or upload a file to analyze.".to_string());
        assert!(present(outcome, false, &BadgeFormatter::default()).is_ok());
    }

    #[test]
    fn test_failure_is_an_error() {
        let outcome = AnalysisOutcome::Failed("An error occurred during analysis: HTTP 503".to_string());
        let err = present(outcome, false, &BadgeFormatter::default()).unwrap_err();
        assert_eq!(err.to_string(), "analysis failed");
    }

    #[tokio::test]
    async fn test_empty_submission_warns_without_network() {
        let config = GenzConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..GenzConfig::default()
        };
        let args = AnalyzeArgs {
            text: Some("   ".to_string()),
            file: None,
            raw: false,
        };
        assert!(execute(args, config).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_model_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = GenzConfig {
            endpoint: Some(format!("http://{}", addr)),
            ..GenzConfig::default()
        };
        let args = AnalyzeArgs {
            text: Some("Is this true?".to_string()),
            file: None,
            raw: false,
        };
        assert!(execute(args, config).await.is_err());
    }
}
