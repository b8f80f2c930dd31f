//! Configuration display command.

use anyhow::{Context, Result};
use colored::Colorize;
use genzfact_core::{Badge, Credentials, GenzConfig};

use crate::output::badge_label;

pub fn execute(config: &GenzConfig) -> Result<()> {
    println!("{}", "Effective configuration".cyan().bold());
    println!();
    println!("  {}: {}", "Endpoint".bold(), config.generate_url());
    println!(
        "  {}: {}",
        "Credentials".bold(),
        Credentials::from_config(config).kind()
    );
    println!("  {}: {}", "Access token".bold(), config.masked_token());
    println!(
        "  {}: {}",
        "Request timeout".bold(),
        match config.request_timeout_secs {
            0 => "none".to_string(),
            secs => format!("{}s", secs),
        }
    );

    print!("  {}:", "Badges".bold());
    for badge in Badge::ALL {
        print!(" {}", badge_label(badge, config.palette.color(badge)));
    }
    println!();
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", rendered);
    Ok(())
}
