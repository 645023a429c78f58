//! Session commands - List, connect with and remove stored sessions

use super::synced_runner;
use crate::runner::Runner;
use anyhow::{bail, Result};
use colored::Colorize;
use tgdash_core::{DashboardConfig, Input, SessionEntry};

/// List stored sessions
pub async fn list(config: DashboardConfig) -> Result<()> {
    let runner = synced_runner(config, false).await?;
    let entries = runner.controller().state().session_entries();

    println!("{}", "Stored sessions:".cyan().bold());
    if entries.is_empty() {
        println!("  {}", "No sessions found".dimmed());
        return Ok(());
    }

    for entry in entries {
        let current = if entry.is_current {
            " (current)".green()
        } else {
            "".normal()
        };
        println!("  {}{}", entry.name.cyan(), current);
    }

    Ok(())
}

/// Connect with a stored session
pub async fn use_session(config: DashboardConfig, name: String) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;

    let entry = find_entry(&runner, &name)?;
    if !entry.can_connect {
        bail!("Already connected with session '{}'", name);
    }

    runner.act(Input::ConnectExisting { session: name }).await?;
    println!(
        "{}",
        "  Run `tgdash status` or `tgdash watch` to follow the login.".dimmed()
    );
    Ok(())
}

/// Delete a stored session after confirmation
pub async fn remove(config: DashboardConfig, name: String, yes: bool) -> Result<()> {
    let mut runner = synced_runner(config, yes).await?;

    let entry = find_entry(&runner, &name)?;
    if !entry.can_remove {
        bail!("Session '{}' is in use and cannot be removed", name);
    }

    runner.act(Input::RequestRemove { session: name }).await
}

fn find_entry(runner: &Runner, name: &str) -> Result<SessionEntry> {
    match runner
        .controller()
        .state()
        .session_entries()
        .into_iter()
        .find(|entry| entry.name == name)
    {
        Some(entry) => Ok(entry),
        None => bail!(
            "Unknown session '{}'. Run `tgdash sessions` to list stored sessions.",
            name
        ),
    }
}
