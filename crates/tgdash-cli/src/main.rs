//! tgdash CLI
//!
//! Terminal front end for the Telegram account dashboard: the same
//! controller as the browser page, driven by HTTP calls, the Socket.IO event
//! channel and terminal prompts.

mod api;
mod channel;
mod commands;
mod config;
mod runner;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::SettingsManager;
use tgdash_core::DashboardConfig;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "tgdash")]
#[command(author, version, about = "tgdash - Telegram account dashboard client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dashboard server URL (overrides settings)
    #[arg(short, long, global = true, env = "TGDASH_SERVER")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show connection, account and auto-clear status
    Status,

    /// List stored sessions
    Sessions,

    /// Print the backend activity log
    Logs {
        /// Keep printing new entries as they arrive
        #[arg(short, long)]
        follow: bool,
    },

    /// Log in a new account (prompts for the code and password)
    Connect {
        /// Session name to store the login under
        name: String,

        /// Phone number in international format
        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Connect with a stored session
    Use {
        /// Session name
        name: String,
    },

    /// Disconnect the current account
    Disconnect,

    /// Delete a stored session
    Remove {
        /// Session name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask the backend to clear its log
    #[command(name = "clear-logs")]
    ClearLogs,

    /// Configure automatic log clearing
    #[command(name = "auto-clear")]
    AutoClear {
        #[command(subcommand)]
        action: AutoClearAction,
    },

    /// Refresh recent chats and show the TheReconquestMap group id
    Chats,

    /// Copy the TheReconquestMap group id to the clipboard
    #[command(name = "copy-group-id")]
    CopyGroupId,

    /// Send a message to a chat (defaults to the TheReconquestMap group)
    Send {
        /// Message text
        message: String,

        /// Target chat id
        #[arg(short, long)]
        chat: Option<String>,
    },

    /// Follow status changes and activity until Ctrl-C
    Watch,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AutoClearAction {
    /// Enable automatic clearing
    On,
    /// Disable automatic clearing
    Off,
    /// Set the clearing interval
    Interval {
        /// Minutes (1-60)
        minutes: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the dashboard server URL
    SetServer {
        /// Server URL (e.g., http://127.0.0.1:8080)
        url: String,
    },
    /// Show current configuration
    Show,
    /// Reset to default configuration
    Reset,
}

/// Settings, environment and `--server`, validated
fn resolve_config(server: Option<String>) -> Result<DashboardConfig> {
    let mut config = SettingsManager::load().context("Failed to load settings")?;
    if let Some(server) = server {
        config.server_url = server;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "tgdash=debug,tgdash_core=debug"
        } else {
            "tgdash=info,tgdash_core=warn"
        })
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    debug!("Starting tgdash CLI");

    let result = run(cli.command, cli.server).await;

    if let Err(ref e) = result {
        error!("Command failed: {:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}

async fn run(command: Commands, server: Option<String>) -> Result<()> {
    match command {
        Commands::Status => commands::status::run(resolve_config(server)?).await,
        Commands::Sessions => commands::sessions::list(resolve_config(server)?).await,
        Commands::Logs { follow } => commands::logs::show(resolve_config(server)?, follow).await,
        Commands::Connect { name, phone } => {
            commands::account::connect(resolve_config(server)?, name, phone).await
        }
        Commands::Use { name } => commands::sessions::use_session(resolve_config(server)?, name).await,
        Commands::Disconnect => commands::account::disconnect(resolve_config(server)?).await,
        Commands::Remove { name, yes } => {
            commands::sessions::remove(resolve_config(server)?, name, yes).await
        }
        Commands::ClearLogs => commands::logs::clear(resolve_config(server)?).await,
        Commands::AutoClear { action } => {
            let config = resolve_config(server)?;
            match action {
                AutoClearAction::On => commands::auto_clear::toggle(config, true).await,
                AutoClearAction::Off => commands::auto_clear::toggle(config, false).await,
                AutoClearAction::Interval { minutes } => {
                    commands::auto_clear::interval(config, minutes).await
                }
            }
        }
        Commands::Chats => commands::chats::refresh(resolve_config(server)?).await,
        Commands::CopyGroupId => commands::chats::copy_group_id(resolve_config(server)?).await,
        Commands::Send { message, chat } => {
            commands::chats::send(resolve_config(server)?, message, chat).await
        }
        Commands::Watch => commands::watch::run(resolve_config(server)?).await,
        // Settings commands work on the file even when it does not validate
        Commands::Config { action } => match action {
            ConfigAction::SetServer { url } => commands::config::set_server(&url).await,
            ConfigAction::Show => commands::config::show(server).await,
            ConfigAction::Reset => commands::config::reset().await,
        },
    }
}
