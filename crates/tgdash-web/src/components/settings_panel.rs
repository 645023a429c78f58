//! Automatic log clearing controls

use tgdash_core::AutoClearSettings;
use tgdash_core::{MAX_CLEAR_INTERVAL, MIN_CLEAR_INTERVAL};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SettingsPanelProps {
    pub settings: AutoClearSettings,
    pub on_toggle: Callback<bool>,
    /// Raw input text; parsing and clamping happen in the controller
    pub on_interval: Callback<String>,
}

#[function_component(SettingsPanel)]
pub fn settings_panel(props: &SettingsPanelProps) -> Html {
    let on_toggle = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            on_toggle.emit(input.checked());
        })
    };
    let on_interval = {
        let on_interval = props.on_interval.clone();
        Callback::from(move |e: Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            on_interval.emit(input.value());
        })
    };

    html! {
        <div class="settings-panel">
            <label class="toggle">
                <input
                    type="checkbox"
                    checked={props.settings.enabled}
                    onchange={on_toggle}
                />
                { " Clear logs automatically" }
            </label>
            <label class="interval">
                { "Every " }
                <input
                    type="number"
                    min={MIN_CLEAR_INTERVAL.to_string()}
                    max={MAX_CLEAR_INTERVAL.to_string()}
                    value={props.settings.interval_minutes.to_string()}
                    onchange={on_interval}
                />
                { " minutes" }
            </label>
        </div>
    }
}
