//! Connect form: session name and phone, then code or 2FA password

use tgdash_core::{FieldGroup, FormField, HandshakeForm, StatusKind};
use yew::prelude::*;

/// Input elements the dashboard focuses on request
#[derive(Clone, Default, PartialEq)]
pub struct FormRefs {
    pub session_name: NodeRef,
    pub phone: NodeRef,
    pub code: NodeRef,
    pub password: NodeRef,
}

impl FormRefs {
    pub fn get(&self, field: FormField) -> &NodeRef {
        match field {
            FormField::SessionName => &self.session_name,
            FormField::Phone => &self.phone,
            FormField::Code => &self.code,
            FormField::Password => &self.password,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ConnectModalProps {
    pub form: HandshakeForm,
    pub refs: FormRefs,
    pub on_edit: Callback<(FormField, String)>,
    pub on_connect: Callback<()>,
    pub on_submit_code: Callback<()>,
    pub on_submit_password: Callback<()>,
    pub on_close: Callback<()>,
}

fn text_input(
    props: &ConnectModalProps,
    field: FormField,
    input_type: &'static str,
    label: &'static str,
    value: &str,
) -> Html {
    let on_edit = props.on_edit.clone();
    let oninput = Callback::from(move |e: InputEvent| {
        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
        on_edit.emit((field, input.value()));
    });

    html! {
        <div class="form-field">
            <label>{ label }</label>
            <input
                type={input_type}
                ref={props.refs.get(field).clone()}
                value={value.to_string()}
                disabled={!props.form.is_enabled(field)}
                {oninput}
            />
        </div>
    }
}

#[function_component(ConnectModal)]
pub fn connect_modal(props: &ConnectModalProps) -> Html {
    let form = &props.form;
    if !form.visible {
        return html! {};
    }

    let emit = |callback: &Callback<()>| {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| callback.emit(()))
    };

    let class = classes!("modal", "connect-modal", form.on_top.then_some("on-top"));

    html! {
        <div {class}>
            <div class="modal-header">
                <h2>{ "Connect account" }</h2>
                <button class="modal-close" onclick={emit(&props.on_close)}>{ "✕" }</button>
            </div>

            { text_input(props, FormField::SessionName, "text", "Session name", &form.session_name) }

            if form.is_visible(FieldGroup::Phone) {
                <div class="phone-group">
                    { text_input(props, FormField::Phone, "tel", "Phone number (new sessions only)", &form.phone) }
                    <button
                        class="btn btn-primary"
                        disabled={!form.connect_enabled}
                        onclick={emit(&props.on_connect)}
                    >
                        { "Connect" }
                    </button>
                </div>
            }

            if form.is_visible(FieldGroup::Code) {
                <div class="code-group">
                    { text_input(props, FormField::Code, "text", "Login code", &form.code) }
                    <button
                        class="btn btn-primary"
                        disabled={!form.code_enabled}
                        onclick={emit(&props.on_submit_code)}
                    >
                        { "Send code" }
                    </button>
                </div>
            }

            if form.is_visible(FieldGroup::Password) {
                <div class="password-group">
                    { text_input(props, FormField::Password, "password", "2FA password", &form.password) }
                    <button
                        class="btn btn-primary"
                        disabled={!form.password_enabled}
                        onclick={emit(&props.on_submit_password)}
                    >
                        { "Send password" }
                    </button>
                </div>
            }

            if let Some(status) = &form.status {
                <div class={classes!(
                    "connect-status-message",
                    match status.kind {
                        StatusKind::Info => "info",
                        StatusKind::Error => "error",
                    }
                )}>
                    { &status.text }
                </div>
            }
        </div>
    }
}
