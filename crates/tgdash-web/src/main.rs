//! tgdash Web Frontend
//!
//! A Yew-based dashboard for a Telegram account backend: connection status,
//! stored sessions, the login handshake and the live activity log.

use yew::prelude::*;

mod api;
mod channel;
mod components;
mod pages;
mod utils;

use pages::Dashboard;

#[function_component(App)]
fn app() -> Html {
    html! {
        <Dashboard />
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
