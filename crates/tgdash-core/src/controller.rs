//! Dashboard controller: every user action, server push and HTTP reply
//! enters through [`Controller::handle`] and comes back out as effects.

use crate::activity::ActivityLog;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::handshake::{FormField, Handshake};
use crate::request::{ApiReply, ApiRequest, PendingRequests, ReplyContext, RequestId, RequestSlot};
use crate::state::{
    AutoClearSettings, ConnectionState, GroupReference, SessionEntry, SessionRegistry, Transition,
};
use std::time::Duration;
use tgdash_types::{
    ActionStatus, AutoClearRequest, ChannelSignal, ClientEvent, ConnectRequest, LogLine,
    RemoveSessionRequest, SendMessageRequest, ServerEvent, Severity, StatusUpdate, UserInfo,
};

/// Everything the front ends render
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub(crate) connection: ConnectionState,
    pub(crate) sessions: SessionRegistry,
    pub(crate) auto_clear: AutoClearSettings,
    pub(crate) handshake: Handshake,
    pub(crate) group: GroupReference,
    pub(crate) activity: ActivityLog,
    pub(crate) manage_sessions_visible: bool,
    pub(crate) channel_connected: bool,
}

impl UiState {
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Rows of the manage-sessions list
    pub fn session_entries(&self) -> Vec<SessionEntry> {
        self.sessions.entries(self.connection.connected)
    }

    pub fn auto_clear(&self) -> &AutoClearSettings {
        &self.auto_clear
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn group(&self) -> &GroupReference {
        &self.group
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn manage_sessions_visible(&self) -> bool {
        self.manage_sessions_visible
    }

    pub fn channel_connected(&self) -> bool {
        self.channel_connected
    }
}

/// Something that happened
#[derive(Debug, Clone)]
pub enum Input {
    /// Page load or process start
    Start,
    ChannelConnected,
    ChannelDisconnected { reason: String },
    Push(ServerEvent),
    /// A push that could not be decoded
    MalformedPush(String),
    Response {
        id: RequestId,
        result: Result<ApiReply, DashboardError>,
    },
    OpenConnectForm { on_top: bool },
    CloseOverlays,
    EditField { field: FormField, value: String },
    SubmitConnect,
    SubmitCode,
    SubmitPassword,
    /// An [`Effect::Emit`] could not be handed to the event channel
    EmitFailed { reason: String },
    CloseTimerFired { attempt: u64 },
    OpenManageSessions,
    RefreshSessions,
    ConnectExisting { session: String },
    RequestRemove { session: String },
    RemoveConfirmed { session: String },
    Disconnect,
    ClearLogs,
    SetAutoClear { enabled: bool },
    SetClearInterval { raw: String },
    RefreshChats,
    CopyGroupId,
    CopyFinished { result: Result<(), String> },
    /// `chat_id` falls back to the cached group id
    SendMessage {
        chat_id: Option<String>,
        text: String,
    },
}

impl From<ChannelSignal> for Input {
    fn from(signal: ChannelSignal) -> Self {
        match signal {
            ChannelSignal::Connected => Input::ChannelConnected,
            ChannelSignal::Disconnected { reason } => Input::ChannelDisconnected { reason },
            ChannelSignal::Event(Ok(event)) => Input::Push(event),
            ChannelSignal::Event(Err(e)) => Input::MalformedPush(e.to_string()),
        }
    }
}

/// Work for the front end to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Http { id: RequestId, request: ApiRequest },
    Emit(ClientEvent),
    ScheduleClose { attempt: u64, after: Duration },
    /// Ask the user; a yes comes back as [`Input::RemoveConfirmed`]
    ConfirmRemove { session: String, prompt: String },
    CopyToClipboard(String),
    Focus(FormField),
    ConsoleWarn(String),
}

/// Owns the UI state and applies inputs to it
#[derive(Debug, Clone, Default)]
pub struct Controller {
    config: DashboardConfig,
    state: UiState,
    requests: PendingRequests,
}

impl Controller {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            state: UiState::default(),
            requests: PendingRequests::new(),
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn pending_requests(&self) -> &PendingRequests {
        &self.requests
    }

    /// Text for the busy overlay while the session list loads
    pub fn busy_message(&self) -> Option<&'static str> {
        self.requests
            .slot_pending(RequestSlot::Sessions)
            .then_some("Fetching sessions...")
    }

    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let mut effects = Vec::new();

        match input {
            Input::Start => self.start_sync(&mut effects),
            Input::ChannelConnected => {
                self.state.channel_connected = true;
                self.log("Connected to server event channel.", Severity::System);
                self.start_sync(&mut effects);
            }
            Input::ChannelDisconnected { reason } => {
                tracing::debug!("event channel closed: {}", reason);
                self.state.channel_connected = false;
                self.log("Disconnected from server event channel.", Severity::Error);
                self.apply_connection(false, None, &mut effects);
            }
            Input::Push(event) => self.on_push(event, &mut effects),
            Input::MalformedPush(reason) => {
                effects.push(Effect::ConsoleWarn(format!(
                    "Unexpected event payload received: {}",
                    reason
                )));
            }
            Input::Response { id, result } => match self.requests.resolve(id) {
                Some(context) => self.on_reply(context, result, &mut effects),
                None => tracing::debug!("discarding stale reply {}", id),
            },
            Input::OpenConnectForm { on_top } => {
                self.state.handshake.open(on_top);
                effects.push(Effect::Focus(FormField::SessionName));
            }
            Input::CloseOverlays => {
                self.state.handshake.close();
                self.state.manage_sessions_visible = false;
            }
            Input::EditField { field, value } => self.state.handshake.edit(field, value),
            Input::SubmitConnect => {
                if let Ok(request) = self.state.handshake.submit() {
                    let attempt = self.state.handshake.attempt();
                    self.request(
                        ReplyContext::HandshakeConnect { attempt },
                        ApiRequest::Connect(request),
                        &mut effects,
                    );
                }
            }
            Input::SubmitCode => self.submit_challenge(Handshake::submit_code, &mut effects),
            Input::SubmitPassword => {
                self.submit_challenge(Handshake::submit_password, &mut effects)
            }
            Input::EmitFailed { reason } => {
                let message = format!("Error sending to server: {}", reason);
                self.state.handshake.send_failed(message.clone());
                self.log(message, Severity::Error);
            }
            Input::CloseTimerFired { attempt } => {
                if self.state.handshake.close_timer_fired(attempt) {
                    self.state.manage_sessions_visible = false;
                }
            }
            Input::OpenManageSessions => self.refresh_sessions(true, &mut effects),
            Input::RefreshSessions => self.refresh_sessions(false, &mut effects),
            Input::ConnectExisting { session } => self.connect_existing(session, &mut effects),
            Input::RequestRemove { session } => {
                let prompt = format!("Are you sure you want to remove the session \"{}\"?", session);
                effects.push(Effect::ConfirmRemove { session, prompt });
            }
            Input::RemoveConfirmed { session } => {
                let request = ApiRequest::RemoveSession(RemoveSessionRequest {
                    session_name: session.clone(),
                });
                self.request(ReplyContext::RemoveSession { session }, request, &mut effects);
            }
            Input::Disconnect => self.disconnect(&mut effects),
            Input::ClearLogs => {
                self.request(ReplyContext::ClearLogs, ApiRequest::ClearLogs, &mut effects)
            }
            Input::SetAutoClear { enabled } => {
                self.state.auto_clear.enabled = enabled;
                self.request(
                    ReplyContext::AutoClearToggle { enabled },
                    ApiRequest::ToggleAutoClear(AutoClearRequest::toggle(enabled)),
                    &mut effects,
                );
            }
            Input::SetClearInterval { raw } => {
                let minutes = AutoClearSettings::parse_interval(&raw);
                self.state.auto_clear.interval_minutes = minutes;
                self.request(
                    ReplyContext::AutoClearInterval { minutes },
                    ApiRequest::ToggleAutoClear(AutoClearRequest::interval(minutes)),
                    &mut effects,
                );
            }
            Input::RefreshChats => self.refresh_chats(&mut effects),
            Input::CopyGroupId => {
                if let Some(id) = self.state.group.id.clone() {
                    effects.push(Effect::CopyToClipboard(id));
                }
            }
            Input::CopyFinished { result } => match result {
                Ok(()) => self.log("Group id copied to clipboard.", Severity::Info),
                Err(e) => self.log(format!("Error copying group id: {}", e), Severity::Error),
            },
            Input::SendMessage { chat_id, text } => self.send_message(chat_id, text, &mut effects),
        }

        effects
    }

    fn log(&mut self, text: impl Into<String>, severity: Severity) {
        self.state.activity.push(text, severity);
    }

    fn request(&mut self, context: ReplyContext, request: ApiRequest, effects: &mut Vec<Effect>) {
        let id = self.requests.issue(context);
        tracing::debug!("request {} {} {}", id, request.method().as_str(), request.path());
        effects.push(Effect::Http { id, request });
    }

    /// First step of the status, sessions, logs sequence
    fn start_sync(&mut self, effects: &mut Vec<Effect>) {
        self.request(
            ReplyContext::Status { sync: true },
            ApiRequest::FetchStatus,
            effects,
        );
    }

    fn refresh_sessions(&mut self, show_manage: bool, effects: &mut Vec<Effect>) {
        self.request(
            ReplyContext::Sessions {
                sync: false,
                show_manage,
            },
            ApiRequest::FetchSessions,
            effects,
        );
    }

    fn apply_connection(
        &mut self,
        connected: bool,
        user: Option<&UserInfo>,
        effects: &mut Vec<Effect>,
    ) {
        match self.state.connection.apply(connected, user) {
            Transition::Connected => self.refresh_chats(effects),
            Transition::Disconnected => {
                self.state.connection.disconnect_pending = false;
                self.state.group.clear();
            }
            Transition::Unchanged => {}
        }
    }

    fn on_push(&mut self, event: ServerEvent, effects: &mut Vec<Effect>) {
        match event {
            ServerEvent::Log(line) => self.state.activity.push_line(line),
            ServerEvent::StatusUpdate(update) => self.on_status_update(update, effects),
            ServerEvent::LogsCleared { message } => {
                self.state.activity.clear();
                let message = message.unwrap_or_else(|| "Logs cleared by server.".to_string());
                self.log(message, Severity::System);
            }
            ServerEvent::AskCode => {
                self.state.handshake.ask_code();
                effects.push(Effect::Focus(FormField::Code));
            }
            ServerEvent::AskPassword => {
                self.state.handshake.ask_password();
                effects.push(Effect::Focus(FormField::Password));
            }
        }
    }

    fn on_status_update(&mut self, update: StatusUpdate, effects: &mut Vec<Effect>) {
        self.apply_connection(update.connected, update.user_info.as_ref(), effects);

        if let Some(session) = update.session {
            if self.state.sessions.set_current(session) {
                self.refresh_sessions(false, effects);
            }
        }

        if update.connected {
            match self.state.handshake.connected() {
                Some(attempt) => effects.push(Effect::ScheduleClose {
                    attempt,
                    after: self.config.close_delay(),
                }),
                None => self.state.manage_sessions_visible = false,
            }
        } else if let Some(error) = update.error {
            if !self.state.handshake.server_error(&error) {
                self.log(format!("Connection/status error: {}", error), Severity::Error);
            }
        }
    }

    fn submit_challenge(
        &mut self,
        submit: fn(&mut Handshake) -> crate::error::Result<ClientEvent>,
        effects: &mut Vec<Effect>,
    ) {
        if !self.state.channel_connected {
            self.state
                .handshake
                .send_failed("Not connected to the server event channel.".to_string());
            return;
        }
        if let Ok(event) = submit(&mut self.state.handshake) {
            tracing::debug!("sending {}", event.name());
            effects.push(Effect::Emit(event));
        }
    }

    fn connect_existing(&mut self, session: String, effects: &mut Vec<Effect>) {
        self.state.manage_sessions_visible = false;
        self.log(
            format!("Trying to connect with existing session: {}...", session),
            Severity::Info,
        );
        let request = ApiRequest::Connect(ConnectRequest {
            session_name: session.clone(),
            phone: None,
        });
        self.request(ReplyContext::ConnectExisting { session }, request, effects);
    }

    fn disconnect(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.connection.disconnect_enabled() {
            return;
        }
        self.state.connection.disconnect_pending = true;
        self.log("Trying to disconnect...", Severity::System);
        self.request(ReplyContext::Disconnect, ApiRequest::Disconnect, effects);
    }

    fn refresh_chats(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.connection.connected {
            self.log("Connect first to refresh chats.", Severity::Error);
            return;
        }
        self.log("Refreshing recent chats (last 7 days)...", Severity::Info);
        self.state.group.refresh_pending = true;
        self.request(ReplyContext::Chats, ApiRequest::FetchChats, effects);
    }

    fn send_message(&mut self, chat_id: Option<String>, text: String, effects: &mut Vec<Effect>) {
        let target = chat_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| self.state.group.id.clone());

        let Some(chat_id) = target else {
            self.log(
                "No target chat: refresh chats or pass a chat id.",
                Severity::Error,
            );
            return;
        };
        if text.trim().is_empty() {
            self.log("Message text is empty.", Severity::Error);
            return;
        }
        if !self.state.connection.connected {
            self.log("Connect first to send messages.", Severity::Error);
            return;
        }

        self.log(format!("Sending message to {}...", chat_id), Severity::Info);
        let request = ApiRequest::SendMessage(SendMessageRequest {
            chat_id,
            message: text,
        });
        self.request(ReplyContext::SendMessage, request, effects);
    }

    fn on_reply(
        &mut self,
        context: ReplyContext,
        result: Result<ApiReply, DashboardError>,
        effects: &mut Vec<Effect>,
    ) {
        match context {
            ReplyContext::Status { sync } => {
                match result.and_then(|reply| match reply {
                    ApiReply::Status(status) => Ok(status),
                    other => Err(unexpected(other)),
                }) {
                    Ok(status) => {
                        self.apply_connection(status.connected, status.user_info.as_ref(), effects);
                        self.state.sessions.set_current(status.current_session);
                        self.state
                            .auto_clear
                            .apply_server(status.auto_clear_logs, status.auto_clear_interval);
                    }
                    Err(e) => self.log(format!("Error fetching status: {}", e), Severity::Error),
                }
                if sync {
                    self.request(
                        ReplyContext::Sessions {
                            sync: true,
                            show_manage: false,
                        },
                        ApiRequest::FetchSessions,
                        effects,
                    );
                }
            }
            ReplyContext::Sessions { sync, show_manage } => {
                match result.and_then(|reply| match reply {
                    ApiReply::Sessions(sessions) => Ok(sessions),
                    other => Err(unexpected(other)),
                }) {
                    Ok(sessions) => self
                        .state
                        .sessions
                        .replace_known(sessions.sessions, sessions.current_session),
                    Err(e) => self.log(format!("Error fetching sessions: {}", e), Severity::Error),
                }
                if show_manage {
                    self.state.manage_sessions_visible = true;
                }
                if sync {
                    self.request(ReplyContext::Logs { sync: true }, ApiRequest::FetchLogs, effects);
                }
            }
            ReplyContext::Logs { .. } => {
                match result.and_then(|reply| match reply {
                    ApiReply::Logs(entries) => Ok(entries),
                    other => Err(unexpected(other)),
                }) {
                    Ok(entries) => {
                        self.state.activity.clear();
                        for entry in entries {
                            match LogLine::from_value(&entry) {
                                Ok(line) => self.state.activity.push_line(line),
                                Err(e) => effects.push(Effect::ConsoleWarn(format!(
                                    "Skipping log entry: {}",
                                    e
                                ))),
                            }
                        }
                    }
                    Err(e) => self.log(format!("Error fetching logs: {}", e), Severity::Error),
                }
            }
            ReplyContext::HandshakeConnect { attempt } => {
                match result.and_then(|reply| match reply {
                    ApiReply::Connect(connect) => Ok(connect),
                    other => Err(unexpected(other)),
                }) {
                    Ok(connect) if connect.success => {
                        self.state.handshake.connect_accepted(attempt);
                    }
                    Ok(connect) => {
                        let message = format!(
                            "Error starting connection: {}",
                            connect.message.as_deref().unwrap_or("unknown error")
                        );
                        self.state.handshake.connect_failed(attempt, message);
                    }
                    Err(e) => {
                        let message = format!("Network error starting connection: {}", e);
                        self.state.handshake.connect_failed(attempt, message);
                    }
                }
            }
            ReplyContext::ConnectExisting { session } => {
                match result.and_then(|reply| match reply {
                    ApiReply::Connect(connect) => Ok(connect),
                    other => Err(unexpected(other)),
                }) {
                    Ok(connect) if connect.success => {
                        self.log(format!("Connection with {} started.", session), Severity::Info)
                    }
                    Ok(connect) => self.log(
                        format!(
                            "Error connecting with {}: {}",
                            session,
                            connect.message.as_deref().unwrap_or("unknown error")
                        ),
                        Severity::Error,
                    ),
                    Err(e) => self.log(
                        format!("Network error connecting with {}: {}", session, e),
                        Severity::Error,
                    ),
                }
            }
            ReplyContext::Disconnect => {
                self.state.connection.disconnect_pending = false;
                match result.and_then(|reply| match reply {
                    ApiReply::Disconnect(action) => Ok(action),
                    other => Err(unexpected(other)),
                }) {
                    Ok(action) if action.is_error() => self.log(
                        format!("Error disconnecting: {}", action.message_or("unknown error")),
                        Severity::Error,
                    ),
                    Ok(action) => self.log(
                        format!("Disconnect request sent: {}", action.message_or("")),
                        Severity::System,
                    ),
                    Err(e) => {
                        self.log(format!("Network error disconnecting: {}", e), Severity::Error)
                    }
                }
            }
            ReplyContext::RemoveSession { session } => {
                match result.and_then(|reply| match reply {
                    ApiReply::RemoveSession(action) => Ok(action),
                    other => Err(unexpected(other)),
                }) {
                    Ok(action) if action.is_success() => {
                        self.log(action.message_or("Session removed."), Severity::System);
                        self.refresh_sessions(false, effects);
                        if self.state.sessions.current.as_deref() == Some(session.as_str()) {
                            self.state.sessions.set_current(None);
                            self.apply_connection(false, None, effects);
                        }
                    }
                    Ok(action) => self.log(
                        format!("Error removing session: {}", action.message_or("unknown error")),
                        Severity::Error,
                    ),
                    Err(e) => {
                        self.log(format!("Network error removing session: {}", e), Severity::Error)
                    }
                }
            }
            ReplyContext::ClearLogs => {
                match result.and_then(|reply| match reply {
                    ApiReply::ClearLogs(action) => Ok(action),
                    other => Err(unexpected(other)),
                }) {
                    Ok(action) if action.is_success() => {
                        self.log("Request to clear logs sent.", Severity::System)
                    }
                    Ok(action) => self.log(
                        format!(
                            "Error requesting log clearing: {}",
                            action.message_or("unknown error")
                        ),
                        Severity::Error,
                    ),
                    Err(e) => self.log(format!("Network error clearing logs: {}", e), Severity::Error),
                }
            }
            ReplyContext::AutoClearToggle { enabled } => match result {
                Ok(_) => self.log(
                    format!(
                        "Automatic log clearing {}",
                        if enabled { "enabled" } else { "disabled" }
                    ),
                    Severity::System,
                ),
                Err(e) => self.log(
                    format!("Error toggling automatic log clearing: {}", e),
                    Severity::Error,
                ),
            },
            ReplyContext::AutoClearInterval { minutes } => match result {
                Ok(_) => self.log(
                    format!("Automatic log clearing interval set to {} minutes", minutes),
                    Severity::System,
                ),
                Err(e) => self.log(format!("Error updating interval: {}", e), Severity::Error),
            },
            ReplyContext::Chats => {
                self.state.group.refresh_pending = false;
                self.state.group.fetched = true;
                match result.and_then(|reply| match reply {
                    ApiReply::Chats(chats) => Ok(chats),
                    other => Err(unexpected(other)),
                }) {
                    Ok(chats) if chats.status == ActionStatus::Success => {
                        self.state.group.id = chats.reconquest_map_id;
                        let message = format!(
                            "Recent chats refreshed. Group id: {}.",
                            self.state.group.display()
                        );
                        self.log(message, Severity::Info);
                    }
                    Ok(chats) => self.log(
                        format!(
                            "Error refreshing chats: {}",
                            chats.message.as_deref().unwrap_or("unknown error")
                        ),
                        Severity::Error,
                    ),
                    Err(e) => self.log(format!("Network error fetching chats: {}", e), Severity::Error),
                }
            }
            ReplyContext::SendMessage => {
                match result.and_then(|reply| match reply {
                    ApiReply::SendMessage(sent) => Ok(sent),
                    other => Err(unexpected(other)),
                }) {
                    Ok(sent) if sent.status == ActionStatus::Success => self.log(
                        format!(
                            "Message sent (id {}).",
                            sent.message_id.as_deref().unwrap_or("?")
                        ),
                        Severity::Info,
                    ),
                    Ok(sent) => self.log(
                        format!(
                            "Error sending message: {}",
                            sent.message.as_deref().unwrap_or("unknown error")
                        ),
                        Severity::Error,
                    ),
                    Err(e) => {
                        self.log(format!("Network error sending message: {}", e), Severity::Error)
                    }
                }
            }
        }
    }
}

fn unexpected(reply: ApiReply) -> DashboardError {
    DashboardError::Malformed(format!("reply does not match its request: {:?}", reply))
}
