//! Status command - Show connection, account and settings

use super::synced_runner;
use anyhow::Result;
use colored::Colorize;
use tgdash_core::DashboardConfig;

pub async fn run(config: DashboardConfig) -> Result<()> {
    let runner = synced_runner(config, false).await?;
    let state = runner.controller().state();
    let connection = state.connection();

    println!("{}", "Telegram Dashboard".bold().underline());
    println!();

    println!("{}", "Connection:".cyan().bold());
    let status = if connection.connected {
        connection.status_text().green()
    } else {
        connection.status_text().red()
    };
    println!("  Status:  {}", status);
    if let Some(label) = &connection.user_label {
        println!("  User:    {}", label);
    }
    println!("  Session: {}", state.sessions().current_label());
    println!("  Server:  {}", runner.server_url().dimmed());
    println!();

    let auto_clear = state.auto_clear();
    println!("{}", "Automatic log clearing:".cyan().bold());
    println!(
        "  Enabled:  {}",
        if auto_clear.enabled {
            "Yes".green()
        } else {
            "No".yellow()
        }
    );
    println!("  Interval: {} minutes", auto_clear.interval_minutes);

    if connection.connected {
        println!();
        println!("{}", "TheReconquestMap group:".cyan().bold());
        println!("  Id: {}", state.group().display());
    }

    Ok(())
}
