//! Event binding.
//!
//! Wires the stats-panel buttons to the session. Async handlers run via
//! `wasm_bindgen_futures::spawn_local`.

use mint_session::WalletSession;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::Elements;

/// Attach an async click handler that receives a clone of the session.
macro_rules! on_click_async {
    ($el:expr, $session:expr, $handler:expr) => {{
        if let Some(el) = &$el {
            let session = $session.clone();
            let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
                let session = session.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    $handler(session).await;
                });
            }) as Box<dyn FnMut(_)>);
            listen(el, &cb);
            cb.forget();
        }
    }};
}

fn listen(el: &HtmlElement, cb: &Closure<dyn FnMut(web_sys::MouseEvent)>) {
    if let Err(err) = el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref()) {
        tracing::warn!(?err, "could not attach click listener");
    }
}

async fn on_mint(session: WalletSession) {
    // failures are already alerted by the session
    let _ = session.mint().await;
}

async fn on_refresh(session: WalletSession) {
    session.refresh_info().await;
}

/// Bind all button listeners. Call once after start-up.
pub fn bind_events(els: &Elements, session: &WalletSession) {
    on_click_async!(els.mint_btn, session, on_mint);
    on_click_async!(els.refresh_btn, session, on_refresh);
    if let Some(el) = &els.disconnect_btn {
        let session = session.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            session.disconnect();
        }) as Box<dyn FnMut(_)>);
        listen(el, &cb);
        cb.forget();
    }
}
