//! Watch command - Follow the dashboard until Ctrl-C

use super::CHANNEL_TIMEOUT;
use crate::runner::{Runner, RunnerOptions};
use anyhow::Result;
use colored::Colorize;
use std::io::IsTerminal;
use tgdash_core::DashboardConfig;
use tracing::warn;

pub async fn run(config: DashboardConfig) -> Result<()> {
    follow(config, true).await
}

/// Print activity as it arrives. With `prompts`, login code and password
/// requests from the backend are answered on the terminal.
pub async fn follow(config: DashboardConfig, prompts: bool) -> Result<()> {
    let options = RunnerOptions {
        interactive: prompts && std::io::stdin().is_terminal(),
        assume_yes: false,
        echo: true,
    };
    let mut runner = Runner::new(config, options)?;

    runner.open_channel();
    if !runner
        .wait_until(|c| c.state().channel_connected(), CHANNEL_TIMEOUT)
        .await?
    {
        warn!("Event channel is not connected yet; showing the current log");
        runner.sync().await?;
    }

    println!("{}", "Press Ctrl-C to stop.".dimmed());
    runner.run_forever().await
}
