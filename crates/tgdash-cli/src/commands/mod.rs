//! Subcommand implementations

pub mod account;
pub mod auto_clear;
pub mod chats;
pub mod config;
pub mod logs;
pub mod sessions;
pub mod status;
pub mod watch;

use crate::runner::{Runner, RunnerOptions};
use anyhow::Result;
use std::io::IsTerminal;
use tgdash_core::DashboardConfig;

/// Runner synchronized with the backend, ready for one action
pub(crate) async fn synced_runner(config: DashboardConfig, assume_yes: bool) -> Result<Runner> {
    let options = RunnerOptions {
        interactive: std::io::stdin().is_terminal(),
        assume_yes,
        echo: false,
    };
    let mut runner = Runner::new(config, options)?;
    runner.sync().await?;
    Ok(runner)
}

/// How long to wait for the event channel to join
pub(crate) const CHANNEL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
