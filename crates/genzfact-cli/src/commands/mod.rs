//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use genzfact_core::{ConfigOverrides, GenzConfig};
use std::path::PathBuf;

pub mod analyze;
pub mod config;
pub mod serve;

/// GenzFact - Misinformation Analysis
#[derive(Parser)]
#[command(name = "genzfact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that select the model endpoint. They win over the config file and
/// the environment.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Path to a TOML config file (defaults to ./genzfact.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Cloud project hosting the model
    #[arg(long, global = true)]
    pub project_id: Option<String>,

    /// Region of the model endpoint
    #[arg(long, global = true)]
    pub location: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override the prediction service base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

impl SettingsArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            project_id: self.project_id.clone(),
            location: self.location.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    /// Resolve the effective configuration.
    pub fn load(&self) -> Result<GenzConfig> {
        GenzConfig::load(self.config.as_deref(), &self.overrides())
            .context("Failed to load configuration")
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web interface
    Serve(serve::ServeArgs),

    /// Analyze text and/or a file from the terminal
    Analyze(analyze::AnalyzeArgs),

    /// Show the effective configuration
    Config,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.settings.load()?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Analyze(args) => analyze::execute(args, config).await,
            Commands::Config => config::execute(&config),
        }
    }
}
