//! Chat commands - TheReconquestMap group id and outgoing messages

use super::synced_runner;
use anyhow::{bail, Result};
use colored::Colorize;
use tgdash_core::{DashboardConfig, Input};

/// Refresh recent chats; the result line carries the group id
pub async fn refresh(config: DashboardConfig) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;
    runner.act(Input::RefreshChats).await
}

pub async fn copy_group_id(config: DashboardConfig) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;

    let Some(id) = runner.controller().state().group().id.clone() else {
        bail!("No group id available. Connect an account and run `tgdash chats` first.");
    };

    runner.act(Input::CopyGroupId).await?;
    println!("  {}", id.cyan());
    Ok(())
}

/// Send `message`, by default to the cached group
pub async fn send(config: DashboardConfig, message: String, chat: Option<String>) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;
    runner
        .act(Input::SendMessage {
            chat_id: chat,
            text: message,
        })
        .await
}
