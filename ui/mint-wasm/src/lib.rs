//! IrysMint WASM frontend.
//!
//! Hosts the wallet session on the landing page: injected-wallet probes,
//! DOM rendering, browser timers, button listeners and the `window` hooks
//! the page's inline handlers call.

pub mod config;
pub mod dom;
pub mod events;
pub mod hooks;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod surface;

use mint_contract::Erc721Factory;
use mint_session::WalletSession;
use mint_types::MintConfig;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let (config, rejected) = match config::parse(config::page_config_source().as_deref()) {
        Ok(found) => (found.unwrap_or_default(), None),
        Err(err) => (MintConfig::default(), Some(err)),
    };
    logging::init(&config.log_filter);
    if let Some(err) = rejected {
        warn!("ignoring page config, using defaults: {err:#}");
    }

    let els = dom::Elements::bind()?;
    let runtime = Rc::new(runtime::BrowserRuntime);
    let contracts = Erc721Factory::new(&config, runtime.clone())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let surface = Rc::new(surface::DomSurface::new(
        config.network.native_currency.symbol.clone(),
    ));
    let session = WalletSession::new(
        config,
        provider::browser_detector(),
        Rc::new(contracts),
        surface,
        runtime,
    );

    events::bind_events(&els, &session);
    hooks::install(&session)?;
    info!("mint frontend ready");

    // Pick up a wallet that already authorised this site.
    session.start().await;

    Ok(())
}
