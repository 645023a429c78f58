//! Log commands - Print, follow and clear the backend activity log

use super::{synced_runner, watch};
use anyhow::Result;
use colored::Colorize;
use tgdash_core::{DashboardConfig, Input};

/// Print the activity log, optionally following it
pub async fn show(config: DashboardConfig, follow: bool) -> Result<()> {
    if follow {
        return watch::follow(config, false).await;
    }

    let mut runner = synced_runner(config, false).await?;
    if runner.controller().state().activity().is_empty() {
        println!("{}", "No log entries".dimmed());
    }
    runner.print_new_entries();
    Ok(())
}

/// Ask the backend to clear its log
pub async fn clear(config: DashboardConfig) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;
    runner.act(Input::ClearLogs).await
}
