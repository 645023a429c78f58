//! Dashboard page
//!
//! Owns the controller, renders its state and carries out the effects it
//! returns: HTTP calls, event channel frames, timers, prompts and focus.

use gloo_timers::callback::Timeout;
use tgdash_core::{Controller, DashboardConfig, Effect, FormField, Input};
use tgdash_types::{ChannelSignal, SocketIoSession};
use web_sys::{HtmlElement, WebSocket};
use yew::prelude::*;

use crate::api;
use crate::channel;
use crate::components::{
    ActivityLogView, ConnectModal, FormRefs, GroupPanel, SessionList, SettingsPanel,
};
use crate::utils::clipboard;

pub enum DashboardMsg {
    Input(Input),
    WsFrame(String),
    WsClosed(String),
    WsReconnect,
}

pub struct Dashboard {
    controller: Controller,
    ws: Option<WebSocket>,
    socket: SocketIoSession,
    form_refs: FormRefs,
    pending_focus: Option<FormField>,
}

impl Dashboard {
    fn connect_websocket(&mut self, ctx: &Context<Self>) {
        let on_frame = ctx.link().callback(DashboardMsg::WsFrame);
        let on_close = ctx.link().callback(DashboardMsg::WsClosed);

        self.socket = SocketIoSession::new();
        match channel::connect(self.controller.config().base_url(), on_frame, on_close) {
            Ok(ws) => self.ws = Some(ws),
            Err(e) => {
                log::error!("Failed to create WebSocket: {:?}", e);
                self.schedule_reconnect(ctx);
            }
        }
    }

    fn schedule_reconnect(&self, ctx: &Context<Self>) {
        let link = ctx.link().clone();
        let delay = self.controller.config().reconnect_delay_ms;
        Timeout::new(u32::try_from(delay).unwrap_or(u32::MAX), move || {
            link.send_message(DashboardMsg::WsReconnect);
        })
        .forget();
    }

    fn dispatch(&mut self, ctx: &Context<Self>, input: Input) {
        let effects = self.controller.handle(input);
        for effect in effects {
            self.perform(ctx, effect);
        }
    }

    fn perform(&mut self, ctx: &Context<Self>, effect: Effect) {
        match effect {
            Effect::Http { id, request } => {
                let base_url = self.controller.config().base_url().to_string();
                let timeout_ms =
                    u32::try_from(self.controller.config().request_timeout().as_millis())
                        .unwrap_or(u32::MAX);
                ctx.link().send_future(async move {
                    let result = api::execute(&base_url, &request, timeout_ms).await;
                    DashboardMsg::Input(Input::Response { id, result })
                });
            }
            Effect::Emit(event) => {
                let frame = SocketIoSession::encode_event(&event);
                let sent = match &self.ws {
                    Some(ws) => channel::send(ws, &frame),
                    None => Err("event channel is not open".to_string()),
                };
                if let Err(reason) = sent {
                    log::error!("Failed to send {}: {}", event.name(), reason);
                    ctx.link()
                        .send_message(DashboardMsg::Input(Input::EmitFailed { reason }));
                }
            }
            Effect::ScheduleClose { attempt, after } => {
                let link = ctx.link().clone();
                let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
                Timeout::new(millis, move || {
                    link.send_message(DashboardMsg::Input(Input::CloseTimerFired { attempt }));
                })
                .forget();
            }
            Effect::ConfirmRemove { session, prompt } => {
                let confirmed = web_sys::window()
                    .and_then(|window| window.confirm_with_message(&prompt).ok())
                    .unwrap_or(false);
                if confirmed {
                    ctx.link()
                        .send_message(DashboardMsg::Input(Input::RemoveConfirmed { session }));
                }
            }
            Effect::CopyToClipboard(text) => {
                let result = clipboard::copy_text(&text);
                if let Err(e) = &result {
                    log::error!("Failed to copy group id: {}", e);
                }
                ctx.link()
                    .send_message(DashboardMsg::Input(Input::CopyFinished { result }));
            }
            Effect::Focus(field) => self.pending_focus = Some(field),
            Effect::ConsoleWarn(message) => log::warn!("{}", message),
        }
    }

    fn handle_frame(&mut self, ctx: &Context<Self>, frame: String) {
        let incoming = match self.socket.receive(&frame) {
            Ok(incoming) => incoming,
            Err(e) => {
                log::warn!("Ignoring event channel frame {:?}: {}", frame, e);
                return;
            }
        };

        if let Some(ws) = &self.ws {
            for reply in &incoming.replies {
                if let Err(e) = channel::send(ws, reply) {
                    log::error!("{}", e);
                }
            }
        }

        for signal in incoming.signals {
            if let ChannelSignal::Disconnected { .. } = &signal {
                // Server dropped the namespace; closing triggers a reconnect
                if let Some(ws) = &self.ws {
                    if let Err(e) = ws.close() {
                        log::warn!("Failed to close event channel: {:?}", e);
                    }
                }
            }
            let input = Input::from(signal);
            self.dispatch(ctx, input);
        }
    }
}

impl Component for Dashboard {
    type Message = DashboardMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = match api::page_origin() {
            Some(origin) => DashboardConfig::default().with_server_url(origin),
            None => DashboardConfig::default(),
        };

        let mut dashboard = Self {
            controller: Controller::new(config),
            ws: None,
            socket: SocketIoSession::new(),
            form_refs: FormRefs::default(),
            pending_focus: None,
        };

        dashboard.dispatch(ctx, Input::Start);
        dashboard.connect_websocket(ctx);
        dashboard
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            DashboardMsg::Input(input) => {
                self.dispatch(ctx, input);
                true
            }
            DashboardMsg::WsFrame(frame) => {
                self.handle_frame(ctx, frame);
                true
            }
            DashboardMsg::WsClosed(reason) => {
                self.ws = None;
                if self.controller.state().channel_connected() {
                    self.dispatch(ctx, Input::ChannelDisconnected { reason });
                }
                // Attempt to reconnect after the configured delay
                self.schedule_reconnect(ctx);
                true
            }
            DashboardMsg::WsReconnect => {
                log::info!("Attempting to reconnect event channel...");
                self.connect_websocket(ctx);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let state = self.controller.state();
        let connection = state.connection();
        let input =
            |make: fn() -> Input| link.callback(move |_: MouseEvent| DashboardMsg::Input(make()));

        let on_edit = link.callback(|(field, value): (FormField, String)| {
            DashboardMsg::Input(Input::EditField { field, value })
        });
        let on_connect_existing = link.callback(|session: String| {
            DashboardMsg::Input(Input::ConnectExisting { session })
        });
        let on_remove =
            link.callback(|session: String| DashboardMsg::Input(Input::RequestRemove { session }));
        let on_toggle =
            link.callback(|enabled: bool| DashboardMsg::Input(Input::SetAutoClear { enabled }));
        let on_interval =
            link.callback(|raw: String| DashboardMsg::Input(Input::SetClearInterval { raw }));

        let overlay_visible = state.handshake().is_visible() || state.manage_sessions_visible();

        html! {
            <div class="container">
                <header class="dashboard-header">
                    <h1>{ "Telegram Dashboard" }</h1>
                    <div class="connection-info">
                        <span class={classes!(
                            "connection-status",
                            if connection.connected { "connected" } else { "disconnected" }
                        )}>
                            { connection.status_text() }
                        </span>
                        <span class="user-info">{ connection.user_text() }</span>
                        <span class="current-session">
                            { format!("Session: {}", state.sessions().current_label()) }
                        </span>
                    </div>
                    <div class="header-actions">
                        <button
                            class="btn btn-primary"
                            disabled={!connection.connect_enabled()}
                            onclick={link.callback(|_| DashboardMsg::Input(Input::OpenConnectForm { on_top: false }))}
                        >
                            { "Connect" }
                        </button>
                        <button
                            class="btn btn-danger"
                            disabled={!connection.disconnect_enabled()}
                            onclick={input(|| Input::Disconnect)}
                        >
                            { "Disconnect" }
                        </button>
                        <button class="btn btn-secondary" onclick={input(|| Input::OpenManageSessions)}>
                            { "Manage sessions" }
                        </button>
                    </div>
                </header>

                <SettingsPanel
                    settings={state.auto_clear().clone()}
                    {on_toggle}
                    {on_interval}
                />

                <GroupPanel
                    group={state.group().clone()}
                    on_refresh={link.callback(|_| DashboardMsg::Input(Input::RefreshChats))}
                    on_copy={link.callback(|_| DashboardMsg::Input(Input::CopyGroupId))}
                />

                <ActivityLogView
                    entries={state.activity().entries().to_vec()}
                    on_clear={link.callback(|_| DashboardMsg::Input(Input::ClearLogs))}
                />

                if overlay_visible {
                    <div class="modal-overlay" onclick={input(|| Input::CloseOverlays)} />
                }

                <SessionList
                    visible={state.manage_sessions_visible()}
                    sessions={state.session_entries()}
                    on_connect={on_connect_existing}
                    {on_remove}
                    on_new_session={link.callback(|_| DashboardMsg::Input(Input::OpenConnectForm { on_top: true }))}
                    on_close={link.callback(|_| DashboardMsg::Input(Input::CloseOverlays))}
                />

                <ConnectModal
                    form={state.handshake().form().clone()}
                    refs={self.form_refs.clone()}
                    {on_edit}
                    on_connect={link.callback(|_| DashboardMsg::Input(Input::SubmitConnect))}
                    on_submit_code={link.callback(|_| DashboardMsg::Input(Input::SubmitCode))}
                    on_submit_password={link.callback(|_| DashboardMsg::Input(Input::SubmitPassword))}
                    on_close={link.callback(|_| DashboardMsg::Input(Input::CloseOverlays))}
                />

                if let Some(message) = self.controller.busy_message() {
                    <div class="loading-indicator">
                        <div class="spinner"></div>
                        <p>{ message }</p>
                    </div>
                }
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        if let Some(field) = self.pending_focus.take() {
            if let Some(element) = self.form_refs.get(field).cast::<HtmlElement>() {
                let _ = element.focus();
            }
        }
    }
}
