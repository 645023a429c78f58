//! Account commands - Log in a new account and disconnect

use super::{synced_runner, CHANNEL_TIMEOUT};
use crate::runner::{Runner, RunnerOptions};
use anyhow::{bail, Result};
use colored::Colorize;
use std::io::IsTerminal;
use std::time::Duration;
use tgdash_core::{DashboardConfig, FormField, HandshakeStage, Input, StatusKind, UiState};

/// Upper bound for the whole login, prompts included
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Run the login handshake, prompting for the code and password
pub async fn connect(config: DashboardConfig, name: String, phone: Option<String>) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let options = RunnerOptions {
        interactive,
        assume_yes: false,
        echo: false,
    };
    let mut runner = Runner::new(config, options)?;

    // Codes and passwords travel over the event channel
    runner.open_channel();
    if !runner
        .wait_until(|c| c.state().channel_connected(), CHANNEL_TIMEOUT)
        .await?
    {
        bail!("Could not open the event channel at {}", runner.server_url());
    }
    // Joining the channel starts a sync
    runner.settle().await?;

    let connection = runner.controller().state().connection();
    if connection.connected {
        println!("{} Already connected. {}", "!".yellow(), connection.user_text());
        return Ok(());
    }

    runner.skip_printed();
    runner.set_echo(true);
    runner.dispatch(Input::OpenConnectForm { on_top: false });
    runner.dispatch(Input::EditField {
        field: FormField::SessionName,
        value: name,
    });
    if let Some(phone) = phone {
        runner.dispatch(Input::EditField {
            field: FormField::Phone,
            value: phone,
        });
    }
    runner.dispatch(Input::SubmitConnect);

    let finished = runner
        .wait_until(
            |c| {
                let stage = c.state().handshake().stage();
                !stage.is_pending()
                    || (needs_answer(stage) && (!interactive || answer_failed(c.state())))
            },
            LOGIN_TIMEOUT,
        )
        .await?;
    if !finished {
        bail!("Timed out waiting for the login to finish");
    }

    let state = runner.controller().state();
    match state.handshake().stage() {
        HandshakeStage::Connected => {
            println!(
                "{} Logged in. {}",
                "✓".green(),
                state.connection().user_text()
            );
            Ok(())
        }
        _ if answer_failed(state) => match &state.handshake().form().status {
            Some(status) => bail!("{}", status.text),
            None => bail!("Login did not complete"),
        },
        stage if needs_answer(stage) => {
            bail!("The backend is waiting for a login code or password; run `tgdash connect` from a terminal")
        }
        _ => match &state.handshake().form().status {
            Some(status) => bail!("{}", status.text),
            None => bail!("Login did not complete"),
        },
    }
}

fn needs_answer(stage: HandshakeStage) -> bool {
    matches!(
        stage,
        HandshakeStage::AwaitingCode { sent: false } | HandshakeStage::AwaitingPassword { sent: false }
    )
}

/// The code or password never reached the backend
fn answer_failed(state: &UiState) -> bool {
    needs_answer(state.handshake().stage())
        && state
            .handshake()
            .form()
            .status
            .as_ref()
            .is_some_and(|status| status.kind == StatusKind::Error)
}

/// Disconnect the current account
pub async fn disconnect(config: DashboardConfig) -> Result<()> {
    let mut runner = synced_runner(config, false).await?;

    if !runner.controller().state().connection().disconnect_enabled() {
        bail!("Not connected");
    }

    runner.act(Input::Disconnect).await
}
