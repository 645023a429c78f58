//! Config command - Manage CLI configuration

use crate::config::SettingsManager;
use anyhow::{Context, Result};
use colored::Colorize;
use tgdash_core::DashboardConfig;

/// Set the dashboard server URL
pub async fn set_server(url: &str) -> Result<()> {
    let mut settings = SettingsManager::load_file().context("Failed to load settings")?;

    // Validate URL format
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!(
            "Invalid URL: {}. URL must start with http:// or https://",
            url
        );
    }

    settings.server_url = url.to_string();
    SettingsManager::save(&settings).context("Failed to save settings")?;

    println!("{} Server URL set to: {}", "✓".green(), url.cyan());
    println!(
        "  Event channel: {}",
        tgdash_types::socketio::socket_url(url).dimmed()
    );

    Ok(())
}

/// Show current configuration
pub async fn show(server: Option<String>) -> Result<()> {
    let mut settings = SettingsManager::load().context("Failed to load settings")?;
    let overridden = server.is_some();
    if let Some(server) = server {
        settings.server_url = server;
    }

    println!("{}", "tgdash Configuration".bold().underline());
    println!();

    println!("{}", "Server Settings:".cyan().bold());
    print!("  Server URL:      {}", settings.server_url);
    if overridden {
        print!(" {}", "(from --server)".dimmed());
    }
    println!();
    println!("  Request timeout: {}s", settings.request_timeout_secs);
    println!("  Reconnect delay: {}ms", settings.reconnect_delay_ms);
    println!("  Close delay:     {}ms", settings.close_delay_ms);
    if let Err(e) = settings.validate() {
        println!("  {}", e.to_string().red());
    }
    println!();

    println!("{}", "Config Files:".cyan().bold());
    println!(
        "  Settings: {}",
        SettingsManager::settings_path()?
            .display()
            .to_string()
            .dimmed()
    );
    println!(
        "{}",
        "  TGDASH_* environment variables override the file.".dimmed()
    );

    Ok(())
}

/// Reset configuration to defaults
pub async fn reset() -> Result<()> {
    use dialoguer::Confirm;

    let confirm = Confirm::new()
        .with_prompt("Are you sure you want to reset all configuration?")
        .default(false)
        .interact()?;

    if !confirm {
        println!("{}", "Reset cancelled.".yellow());
        return Ok(());
    }

    SettingsManager::save(&DashboardConfig::default())
        .context("Failed to save default settings")?;

    println!("{} Configuration reset to defaults.", "✓".green());

    Ok(())
}
