//! Backend HTTP calls over XmlHttpRequest

use std::cell::RefCell;
use std::rc::Rc;
use futures::channel::oneshot;
use tgdash_core::{ApiReply, ApiRequest, DashboardError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::XmlHttpRequest;

/// How an XHR finished
enum Outcome {
    Loaded,
    Failed(&'static str),
}

/// Base URL of the page that served the dashboard
pub fn page_origin() -> Option<String> {
    let location = web_sys::window()?.location();
    let protocol = location.protocol().ok()?;
    let host = location.host().ok()?;
    Some(format!("{}//{}", protocol, host))
}

/// Run one request. Failure statuses with a JSON body still come back as
/// replies, the same way `fetch` followed by `response.json()` behaves.
pub async fn execute(
    base_url: &str,
    request: &ApiRequest,
    timeout_ms: u32,
) -> Result<ApiReply, DashboardError> {
    let transport = |e: wasm_bindgen::JsValue| DashboardError::Transport(format!("{:?}", e));
    let url = format!("{}{}", base_url, request.path());

    let xhr = XmlHttpRequest::new().map_err(transport)?;
    xhr.open(request.method().as_str(), &url).map_err(transport)?;
    xhr.set_timeout(timeout_ms);

    let body = request.body()?;
    if body.is_some() {
        xhr.set_request_header("Content-Type", "application/json")
            .map_err(transport)?;
    }

    let (sender, receiver) = oneshot::channel();
    let sender = Rc::new(RefCell::new(Some(sender)));
    let finish = move |outcome: Outcome| {
        if let Some(sender) = sender.borrow_mut().take() {
            let _ = sender.send(outcome);
        }
    };

    let on_load = {
        let finish = finish.clone();
        Closure::once_into_js(move || finish(Outcome::Loaded))
    };
    let on_error = {
        let finish = finish.clone();
        Closure::once_into_js(move || finish(Outcome::Failed("network error")))
    };
    let on_timeout = Closure::once_into_js(move || finish(Outcome::Failed("request timed out")));

    xhr.set_onload(Some(on_load.unchecked_ref()));
    xhr.set_onerror(Some(on_error.unchecked_ref()));
    xhr.set_ontimeout(Some(on_timeout.unchecked_ref()));

    xhr.send_with_opt_str(body.as_deref()).map_err(transport)?;

    let outcome = receiver
        .await
        .map_err(|_| DashboardError::Transport("request was dropped".to_string()))?;
    if let Outcome::Failed(reason) = outcome {
        return Err(DashboardError::Transport(reason.to_string()));
    }

    let status = xhr.status().map_err(transport)?;
    let text = xhr.response_text().map_err(transport)?.unwrap_or_default();
    log::debug!("{} {} -> {}", request.method().as_str(), request.path(), status);

    request.interpret(status, &text)
}
