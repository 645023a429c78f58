//! WebSocket carrying the Socket.IO event channel

use tgdash_types::socketio;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};
use yew::Callback;

/// Open the socket and route its text frames and close reason to callbacks.
/// The Engine.IO handshake itself is driven by the caller.
pub fn connect(
    server_url: &str,
    on_frame: Callback<String>,
    on_close: Callback<String>,
) -> Result<WebSocket, JsValue> {
    let url = socketio::socket_url(server_url);
    log::info!("Connecting to event channel: {}", url);

    let ws = WebSocket::new(&url)?;

    let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
        if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
            on_frame.emit(String::from(text));
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onerror = Closure::wrap(Box::new(move |_e: ErrorEvent| {
        log::error!("Event channel error");
    }) as Box<dyn FnMut(_)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
        let reason = if e.reason().is_empty() {
            format!("closed with code {}", e.code())
        } else {
            e.reason()
        };
        log::info!("Event channel closed: {}", reason);
        on_close.emit(reason);
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(ws)
}

/// Send a text frame when the socket is open
pub fn send(ws: &WebSocket, frame: &str) -> Result<(), String> {
    if ws.ready_state() != WebSocket::OPEN {
        return Err("event channel is not open".to_string());
    }
    ws.send_with_str(frame)
        .map_err(|e| format!("Failed to send frame: {:?}", e))
}
