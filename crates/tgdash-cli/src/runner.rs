//! Drives the dashboard controller from the terminal
//!
//! Every input (HTTP replies, channel pushes, timers) arrives on one queue
//! and is applied in order. Effects run as tokio tasks, dialoguer prompts
//! and clipboard writes; whatever they produce goes back into the queue.

use crate::api::ApiClient;
use crate::channel::ChannelHandle;
use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input as TextPrompt, Password};
use std::collections::VecDeque;
use std::time::Duration;
use tgdash_core::{
    ActivityEntry, Controller, DashboardConfig, Effect, FormField, Input, StatusKind,
    StatusMessage,
};
use tgdash_types::Severity;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Extra wait on top of the HTTP timeout before giving up on a reply
const REPLY_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerOptions {
    /// Prompt on the terminal for codes, passwords and confirmations
    pub interactive: bool,
    /// Answer yes to confirmations without asking
    pub assume_yes: bool,
    /// Print activity entries and form status as they appear
    pub echo: bool,
}

pub struct Runner {
    controller: Controller,
    api: ApiClient,
    tx: mpsc::UnboundedSender<Input>,
    rx: mpsc::UnboundedReceiver<Input>,
    channel: Option<ChannelHandle>,
    options: RunnerOptions,
    /// HTTP effects whose reply has not come back yet
    inflight: usize,
    /// Activity pushes already shown
    printed: u64,
    last_status: Option<StatusMessage>,
    last_connected: Option<bool>,
    /// Transport failures seen while syncing
    failures: Vec<String>,
}

impl Runner {
    pub fn new(config: DashboardConfig, options: RunnerOptions) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            controller: Controller::new(config),
            api,
            tx,
            rx,
            channel: None,
            options,
            inflight: 0,
            printed: 0,
            last_status: None,
            last_connected: None,
            failures: Vec::new(),
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn server_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.options.echo = echo;
    }

    /// Start the event channel task; its pushes join the input queue
    pub fn open_channel(&mut self) {
        if self.channel.is_none() {
            let handle = ChannelHandle::spawn(self.controller.config(), self.tx.clone());
            self.channel = Some(handle);
        }
    }

    /// Apply one input and everything that follows from it synchronously
    pub fn dispatch(&mut self, input: Input) {
        let mut queue = VecDeque::from([input]);

        while let Some(input) = queue.pop_front() {
            if let Input::Response { result, .. } = &input {
                self.inflight = self.inflight.saturating_sub(1);
                if let Err(e) = result {
                    self.failures.push(e.to_string());
                }
            }

            for effect in self.controller.handle(input) {
                queue.extend(self.perform(effect));
            }
        }

        if self.options.echo {
            self.print_new_entries();
            self.print_connection();
            self.print_form_status();
        }
    }

    fn perform(&mut self, effect: Effect) -> Vec<Input> {
        match effect {
            Effect::Http { id, request } => {
                self.inflight += 1;
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.execute(&request).await;
                    let _ = tx.send(Input::Response { id, result });
                });
                Vec::new()
            }
            Effect::Emit(event) => {
                let sent = match &self.channel {
                    Some(channel) => channel.emit(&event).map_err(|e| e.to_string()),
                    None => Err("event channel is not open".to_string()),
                };
                match sent {
                    Ok(()) => Vec::new(),
                    Err(reason) => {
                        error!("Failed to send {}: {}", event.name(), reason);
                        vec![Input::EmitFailed { reason }]
                    }
                }
            }
            Effect::ScheduleClose { attempt, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Input::CloseTimerFired { attempt });
                });
                Vec::new()
            }
            Effect::ConfirmRemove { session, prompt } => {
                if self.confirm(&prompt) {
                    vec![Input::RemoveConfirmed { session }]
                } else {
                    println!("{}", "Removal cancelled.".yellow());
                    Vec::new()
                }
            }
            Effect::CopyToClipboard(text) => vec![Input::CopyFinished {
                result: copy_to_clipboard(&text),
            }],
            Effect::Focus(field) => self.prompt(field),
            Effect::ConsoleWarn(message) => {
                warn!("{}", message);
                Vec::new()
            }
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.options.assume_yes {
            return true;
        }
        if !self.options.interactive {
            return false;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    /// Ask for the handshake secret the backend is waiting for
    fn prompt(&mut self, field: FormField) -> Vec<Input> {
        if !self.options.interactive {
            return Vec::new();
        }
        self.print_form_status();

        let (answer, submit) = match field {
            FormField::Code => (
                TextPrompt::<String>::new()
                    .with_prompt("Login code")
                    .interact_text(),
                Input::SubmitCode,
            ),
            FormField::Password => (
                Password::new()
                    .with_prompt("Two-factor password")
                    .interact(),
                Input::SubmitPassword,
            ),
            // Given on the command line
            FormField::SessionName | FormField::Phone => return Vec::new(),
        };

        match answer {
            Ok(value) => vec![Input::EditField { field, value }, submit],
            Err(e) => {
                warn!("Prompt failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Process queued inputs until every HTTP effect has its reply
    pub async fn settle(&mut self) -> Result<()> {
        let limit = self.controller.config().request_timeout() + REPLY_GRACE;

        while self.inflight > 0 {
            match tokio::time::timeout(limit, self.rx.recv()).await {
                Ok(Some(input)) => self.dispatch(input),
                Ok(None) => break,
                Err(_) => bail!("Timed out waiting for the server at {}", self.server_url()),
            }
        }
        Ok(())
    }

    /// Process inputs until `done` holds. Returns false on timeout.
    pub async fn wait_until<F>(&mut self, done: F, limit: Duration) -> Result<bool>
    where
        F: Fn(&Controller) -> bool,
    {
        let deadline = tokio::time::Instant::now() + limit;

        while !done(&self.controller) {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(input)) => self.dispatch(input),
                Ok(None) => bail!("Input queue closed"),
                Err(_) => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Status, sessions and logs, as on page load. Fails when the server
    /// could not be reached.
    pub async fn sync(&mut self) -> Result<()> {
        self.failures.clear();
        self.dispatch(Input::Start);
        self.settle().await?;

        if let Some(failure) = self.failures.first() {
            bail!(
                "Failed to reach dashboard at {}: {}",
                self.server_url(),
                failure
            );
        }
        Ok(())
    }

    /// Mark everything logged so far as shown
    pub fn skip_printed(&mut self) {
        self.printed = self.controller.state().activity().total_pushed();
    }

    /// Apply an action and wait for its replies. New entries are printed;
    /// an error entry fails the command.
    pub async fn act(&mut self, input: Input) -> Result<()> {
        self.skip_printed();
        self.dispatch(input);
        self.settle().await?;

        let activity = self.controller.state().activity();
        let new: Vec<ActivityEntry> = activity.since(self.printed).to_vec();
        self.printed = activity.total_pushed();

        let mut failure = None;
        for entry in new {
            if entry.severity == Severity::Error {
                failure = Some(entry.text);
            } else if !self.options.echo {
                print_entry(&entry);
            }
        }
        match failure {
            Some(text) => bail!("{}", text),
            None => Ok(()),
        }
    }

    /// Keep applying inputs until Ctrl-C
    pub async fn run_forever(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    debug!("interrupted");
                    return Ok(());
                }
                input = self.rx.recv() => match input {
                    Some(input) => self.dispatch(input),
                    None => return Ok(()),
                },
            }
        }
    }

    pub fn print_new_entries(&mut self) {
        let activity = self.controller.state().activity();
        for entry in activity.since(self.printed) {
            print_entry(entry);
        }
        self.printed = activity.total_pushed();
    }

    fn print_connection(&mut self) {
        let connection = self.controller.state().connection();
        if self.last_connected == Some(connection.connected) {
            return;
        }
        self.last_connected = Some(connection.connected);

        let marker = if connection.connected {
            "●".green()
        } else {
            "●".red()
        };
        println!("{} {}", marker, connection.user_text());
    }

    fn print_form_status(&mut self) {
        let form = self.controller.state().handshake().form();
        if !form.visible || form.status == self.last_status {
            return;
        }
        self.last_status = form.status.clone();

        if let Some(status) = &form.status {
            match status.kind {
                StatusKind::Info => println!("  {}", status.text.cyan()),
                StatusKind::Error => println!("  {}", status.text.red()),
            }
        }
    }
}

fn print_entry(entry: &ActivityEntry) {
    let text = match entry.severity {
        Severity::Error | Severity::Critical => entry.text.red(),
        Severity::Warning => entry.text.yellow(),
        Severity::System => entry.text.cyan(),
        Severity::Debug => entry.text.dimmed(),
        _ => entry.text.normal(),
    };
    println!("{}", text);
}

fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tgdash_core::HandshakeStage;
    use tgdash_types::ServerEvent;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_sync(server: &MockServer, connected: bool) {
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connected": connected,
                "current_session": if connected { json!("main") } else { json!(null) },
                "auto_clear_logs": false,
                "auto_clear_interval": 900
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "sessions": ["main", "old"] })),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                "started",
                { "message": "flood wait", "type": "error" }
            ])))
            .mount(server)
            .await;
    }

    fn runner(server: &MockServer, options: RunnerOptions) -> Runner {
        let config = DashboardConfig::default().with_server_url(server.uri());
        Runner::new(config, options).unwrap()
    }

    #[tokio::test]
    async fn sync_loads_status_sessions_and_logs() {
        let server = MockServer::start().await;
        mount_sync(&server, false).await;

        let mut runner = runner(&server, RunnerOptions::default());
        assert_ok!(runner.sync().await);

        let state = runner.controller().state();
        assert!(!state.connection().connected);
        assert_eq!(state.sessions().known, vec!["main", "old"]);
        assert!(!state.auto_clear().enabled);
        assert_eq!(state.auto_clear().interval_minutes, 15);
        assert_eq!(state.activity().len(), 2);
        assert_eq!(state.activity().entries()[1].severity, Severity::Error);
    }

    #[tokio::test]
    async fn sync_fails_when_server_is_down() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let config = DashboardConfig::default().with_server_url(uri);
        let mut runner = Runner::new(config, RunnerOptions::default()).unwrap();
        assert_err!(runner.sync().await);
    }

    #[tokio::test]
    async fn confirmed_removal_posts_and_refreshes() {
        let server = MockServer::start().await;
        mount_sync(&server, false).await;
        Mock::given(method("POST"))
            .and(path("/api/remove-session"))
            .and(body_json(json!({ "session_name": "old" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "Session old removed."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = RunnerOptions {
            assume_yes: true,
            ..RunnerOptions::default()
        };
        let mut runner = runner(&server, options);
        runner.sync().await.unwrap();
        runner
            .act(Input::RequestRemove {
                session: "old".into(),
            })
            .await
            .unwrap();

        let last = runner.controller().state().activity().last().cloned();
        assert_eq!(last.map(|e| e.text), Some("Session old removed.".to_string()));
    }

    #[tokio::test]
    async fn unconfirmed_removal_sends_nothing() {
        let server = MockServer::start().await;
        mount_sync(&server, false).await;
        Mock::given(method("POST"))
            .and(path("/api/remove-session"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut runner = runner(&server, RunnerOptions::default());
        runner.sync().await.unwrap();
        runner
            .act(Input::RequestRemove {
                session: "old".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unsendable_code_is_handed_back() {
        let server = MockServer::start().await;
        mount_sync(&server, false).await;

        let mut runner = runner(&server, RunnerOptions::default());
        runner.sync().await.unwrap();

        // Joined earlier, but the channel task is gone by the time the code is sent
        runner.dispatch(Input::ChannelConnected);
        runner.dispatch(Input::Push(ServerEvent::AskCode));
        runner.dispatch(Input::EditField {
            field: FormField::Code,
            value: "24680".into(),
        });
        runner.dispatch(Input::SubmitCode);

        let handshake = runner.controller().state().handshake();
        assert_eq!(handshake.stage(), HandshakeStage::AwaitingCode { sent: false });
        assert!(handshake.form().code_enabled);
        let last = runner.controller().state().activity().last().cloned();
        assert_eq!(
            last.map(|e| (e.text, e.severity)),
            Some((
                "Error sending to server: event channel is not open".to_string(),
                Severity::Error
            ))
        );
        runner.settle().await.unwrap();
    }

    #[tokio::test]
    async fn rejected_action_fails_the_command() {
        let server = MockServer::start().await;
        mount_sync(&server, false).await;
        Mock::given(method("POST"))
            .and(path("/api/clear-logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "message": "not allowed"
            })))
            .mount(&server)
            .await;

        let mut runner = runner(&server, RunnerOptions::default());
        runner.sync().await.unwrap();

        let err = runner.act(Input::ClearLogs).await.unwrap_err();
        assert_eq!(err.to_string(), "Error requesting log clearing: not allowed");
    }

    #[tokio::test]
    async fn group_refresh_runs_when_connected() {
        let server = MockServer::start().await;
        mount_sync(&server, true).await;
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "chats": [],
                "reconquest_map_id": -1001234567890_i64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut runner = runner(&server, RunnerOptions::default());
        runner.sync().await.unwrap();

        let group = runner.controller().state().group();
        assert!(group.fetched);
        assert_eq!(group.id.as_deref(), Some("-1001234567890"));
    }
}
