//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use genzfact_core::{Analyzer, GenzConfig, VertexClient};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8501")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (used with --log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, config: GenzConfig) -> Result<()> {
    let config = Arc::new(config);
    let client = Arc::new(VertexClient::new(&config));
    let analyzer = Analyzer::new(client, config.clone());
    let state = genzfact_web::AppState::new(analyzer);

    println!();
    println!("  {} {}", "GenzFact".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}      http://{}:{}", "Page".green(), args.host, args.port);
    println!("  {}       http://{}:{}/api/analyze", "API".green(), args.host, args.port);
    println!(
        "  {}     {} ({} / {})",
        "Model".green(),
        config.model,
        config.project_id,
        config.location
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    genzfact_web::run_server(state, &args.host, args.port).await?;

    Ok(())
}
