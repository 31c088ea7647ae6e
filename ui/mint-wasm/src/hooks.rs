//! Window functions the landing page calls from inline `onclick` handlers.

use js_sys::Reflect;
use mint_session::WalletSession;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Install `fn_name` on `window`. The closure is leaked on purpose: the
/// page keeps calling it for its whole lifetime.
fn expose(
    window: &web_sys::Window,
    fn_name: &str,
    f: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let cb = Closure::<dyn FnMut()>::new(f);
    Reflect::set(window, &JsValue::from_str(fn_name), cb.as_ref())?;
    cb.forget();
    Ok(())
}

/// Install `connectWallet`, `mintNFT`, `refreshInfo`, `hideNFTDisplay`,
/// `closeSuccessModal`, `disconnectWallet` and `onMainPageLoaded`.
pub fn install(session: &WalletSession) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let s = session.clone();
    expose(&window, "connectWallet", move || {
        let s = s.clone();
        spawn_local(async move {
            let _ = s.connect().await;
        });
    })?;

    let s = session.clone();
    expose(&window, "mintNFT", move || {
        let s = s.clone();
        spawn_local(async move {
            let _ = s.mint().await;
        });
    })?;

    let s = session.clone();
    expose(&window, "refreshInfo", move || {
        let s = s.clone();
        spawn_local(async move { s.refresh_info().await });
    })?;

    let s = session.clone();
    expose(&window, "hideNFTDisplay", move || s.hide_nft_display())?;

    let s = session.clone();
    expose(&window, "closeSuccessModal", move || s.close_success_modal())?;

    let s = session.clone();
    expose(&window, "disconnectWallet", move || s.disconnect())?;

    let s = session.clone();
    expose(&window, "onMainPageLoaded", move || s.on_main_page_loaded())?;

    Ok(())
}
