//! Manage-sessions modal

use tgdash_core::SessionEntry;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SessionListProps {
    pub visible: bool,
    pub sessions: Vec<SessionEntry>,
    pub on_connect: Callback<String>,
    pub on_remove: Callback<String>,
    pub on_new_session: Callback<()>,
    pub on_close: Callback<()>,
}

#[function_component(SessionList)]
pub fn session_list(props: &SessionListProps) -> Html {
    if !props.visible {
        return html! {};
    }

    let on_new_session = {
        let on_new_session = props.on_new_session.clone();
        Callback::from(move |_| on_new_session.emit(()))
    };
    let on_close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };

    html! {
        <div class="modal manage-sessions-modal">
            <div class="modal-header">
                <h2>{ "Manage sessions" }</h2>
                <button class="modal-close" onclick={on_close}>{ "✕" }</button>
            </div>
            <div class="session-list">
                if props.sessions.is_empty() {
                    <div class="no-sessions">{ "No sessions found" }</div>
                } else {
                    { for props.sessions.iter().map(|session| {
                        let on_connect = {
                            let on_connect = props.on_connect.clone();
                            let name = session.name.clone();
                            Callback::from(move |_| on_connect.emit(name.clone()))
                        };
                        let on_remove = {
                            let on_remove = props.on_remove.clone();
                            let name = session.name.clone();
                            Callback::from(move |_| on_remove.emit(name.clone()))
                        };

                        html! {
                            <div class="session-item" key={session.name.clone()}>
                                <div class="session-item-name">
                                    { &session.name }
                                    if session.is_current {
                                        { " (current)" }
                                    }
                                </div>
                                <div class="session-item-actions">
                                    if session.can_connect {
                                        <button class="btn btn-sm btn-primary" onclick={on_connect}>
                                            { "Connect" }
                                        </button>
                                    }
                                    if session.can_remove {
                                        <button class="btn btn-sm btn-danger" onclick={on_remove}>
                                            { "Remove" }
                                        </button>
                                    }
                                </div>
                            </div>
                        }
                    }) }
                }
            </div>
            <button class="btn btn-secondary" onclick={on_new_session}>{ "New account" }</button>
        </div>
    }
}
