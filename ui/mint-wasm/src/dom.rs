//! DOM element bindings.
//!
//! The minting page is optional furniture on a larger landing page, so
//! every element is looked up leniently: a missing id just means that part
//! of the UI is not rendered.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

// ── Helpers ──

pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(nl) = document().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    let mut v = Vec::new();
    for i in 0..nl.length() {
        if let Some(e) = nl.item(i) {
            if let Ok(el) = e.dyn_into::<Element>() {
                v.push(el);
            }
        }
    }
    v
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_text_by_id(id: &str, text: &str) {
    if let Some(el) = by_id(id) {
        set_text(&el, text);
    }
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

pub fn remove_style(el: &HtmlElement, property: &str) {
    let _ = el.style().remove_property(property);
}

pub fn set_display(el: &HtmlElement, value: &str) {
    set_style(el, "display", value);
}

/// `display: none` on the element with `id`, if the page has one.
pub fn hide_by_id(id: &str) {
    if let Some(el) = by_id_typed::<HtmlElement>(id) {
        set_display(&el, "none");
    }
}

pub fn as_html(el: Element) -> Option<HtmlElement> {
    el.dyn_into::<HtmlElement>().ok()
}

// ── Element ids ──

pub const MINT_SECTION: &str = "nft-mint-section";
pub const WALLET_SECTION: &str = "wallet-connected-section";
pub const WALLET_ADDRESS: &str = "wallet-address-display";
pub const NETWORK_INFO: &str = "network-info";
pub const NFT_DISPLAY: &str = "nftDisplaySection";
pub const MINT_PROGRESS: &str = "mintProgress";
pub const SUCCESS_MODAL: &str = "successModal";
pub const MINT_BUTTON: &str = "mint-nft-btn";
pub const REFRESH_BUTTON: &str = "refresh-info-btn";
pub const DISCONNECT_BUTTON: &str = "disconnect-wallet-btn";
pub const CONFIG_SCRIPT: &str = "mint-config";
pub const CONTRACT_NAME: &str = "contract-name";
pub const MINTED_SO_FAR: &str = "current-token-id";
pub const MAX_SUPPLY: &str = "max-supply";
pub const MINT_PRICE: &str = "mint-price";
pub const MAX_MINT_PER_ADDRESS: &str = "max-mint-per-address";
pub const MINT_ACTIVE: &str = "mint-active";
pub const USER_BALANCE: &str = "user-balance";
pub const USER_MINTED_COUNT: &str = "user-minted-count";

/// Every button that starts a mint.
pub const MINT_BUTTONS: &str = "#mint-nft-btn, #displayMintBtn, #mintBtn";
/// Landing-page buttons wired to the `connectWallet()` hook.
pub const CONNECT_BUTTONS: &str = ".download-btn[onclick=\"connectWallet()\"]";

// ── Elements struct ──

/// Buttons the frontend attaches listeners to. Resolved once at start-up.
#[derive(Clone)]
pub struct Elements {
    pub mint_btn: Option<HtmlElement>,
    pub refresh_btn: Option<HtmlElement>,
    pub disconnect_btn: Option<HtmlElement>,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        document().ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            mint_btn: by_id_typed(MINT_BUTTON),
            refresh_btn: by_id_typed(REFRESH_BUTTON),
            disconnect_btn: by_id_typed(DISCONNECT_BUTTON),
        })
    }
}
