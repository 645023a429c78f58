//! Auto-clear commands - Configure automatic log clearing

use super::synced_runner;
use anyhow::Result;
use tgdash_core::{DashboardConfig, Input};

pub async fn toggle(config: DashboardConfig, enabled: bool) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;
    runner.act(Input::SetAutoClear { enabled }).await
}

/// `minutes` is parsed and clamped by the controller
pub async fn interval(config: DashboardConfig, minutes: String) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;
    runner.act(Input::SetClearInterval { raw: minutes }).await
}
