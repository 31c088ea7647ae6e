//! DOM rendering of session state.

use gloo_timers::future::sleep;
use mint_session::MintSurface;
use mint_types::{ContractStats, UserStats, WalletAddress};
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlButtonElement, HtmlElement};

use crate::dom;

const MINT_LABEL: &str = "MINT NFT NOW";
const MINTING_LABEL: &str = "Minting...";
const CONNECT_LABEL: &str = "Connect Wallet";
const CONNECTED_LABEL: &str = "Connected";
const CONNECTED_BACKGROUND: &str = "linear-gradient(45deg, #4ecdc4, #44a08d)";

const FADE_IN: Duration = Duration::from_millis(10);
const FADE_OUT: Duration = Duration::from_millis(300);

pub struct DomSurface {
    currency: String,
}

impl DomSurface {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

fn buttons(selector: &str) -> Vec<HtmlElement> {
    dom::query_all(selector)
        .into_iter()
        .filter_map(dom::as_html)
        .collect()
}

fn set_mint_buttons(busy: bool) {
    for btn in buttons(dom::MINT_BUTTONS) {
        if let Some(button) = btn.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(busy);
        }
        btn.set_text_content(Some(if busy { MINTING_LABEL } else { MINT_LABEL }));
        dom::set_style(&btn, "opacity", if busy { "0.6" } else { "1" });
        dom::set_style(&btn, "cursor", if busy { "not-allowed" } else { "pointer" });
    }
}

fn set_connect_buttons(connected: bool) {
    for btn in buttons(dom::CONNECT_BUTTONS) {
        if connected {
            btn.set_text_content(Some(CONNECTED_LABEL));
            dom::set_style(&btn, "background", CONNECTED_BACKGROUND);
        } else {
            btn.set_text_content(Some(CONNECT_LABEL));
            dom::remove_style(&btn, "background");
        }
    }
}

impl MintSurface for DomSurface {
    fn alert(&self, message: &str) {
        match dom::window() {
            Some(window) => {
                let _ = window.alert_with_message(message);
            }
            None => warn!(message, "no window to alert on"),
        }
    }

    fn show_connected(&self, account: &WalletAddress, network: &str) {
        dom::hide_by_id(dom::MINT_SECTION);
        if let Some(section) = dom::by_id_typed::<HtmlElement>(dom::WALLET_SECTION) {
            dom::set_display(&section, "block");
        }
        set_connect_buttons(true);

        if let Some(el) = dom::by_id(dom::WALLET_ADDRESS) {
            dom::set_text(&el, &account.short());
            let _ = el.set_attribute("title", &account.0);
        }
        dom::set_text_by_id(dom::NETWORK_INFO, network);
    }

    fn show_disconnected(&self) {
        for id in [
            dom::MINT_SECTION,
            dom::WALLET_SECTION,
            dom::NFT_DISPLAY,
            dom::MINT_PROGRESS,
            dom::SUCCESS_MODAL,
        ] {
            dom::hide_by_id(id);
        }
        set_connect_buttons(false);
    }

    fn show_nft_display(&self) {
        let Some(section) = dom::by_id_typed::<HtmlElement>(dom::NFT_DISPLAY) else {
            return;
        };
        dom::set_display(&section, "flex");
        dom::set_style(&section, "opacity", "0");
        dom::set_style(&section, "transform", "scale(0.9)");
        spawn_local(async move {
            sleep(FADE_IN).await;
            dom::set_style(&section, "transition", "all 0.3s ease-out");
            dom::set_style(&section, "opacity", "1");
            dom::set_style(&section, "transform", "scale(1)");
        });
    }

    fn hide_nft_display(&self) {
        let Some(section) = dom::by_id_typed::<HtmlElement>(dom::NFT_DISPLAY) else {
            return;
        };
        dom::set_style(&section, "transition", "all 0.3s ease-in");
        dom::set_style(&section, "opacity", "0");
        dom::set_style(&section, "transform", "scale(0.9)");
        spawn_local(async move {
            sleep(FADE_OUT).await;
            dom::set_display(&section, "none");
        });
    }

    fn show_mint_progress(&self) {
        if let Some(progress) = dom::by_id_typed::<HtmlElement>(dom::MINT_PROGRESS) {
            dom::set_display(&progress, "block");
        }
        set_mint_buttons(true);
    }

    fn hide_mint_progress(&self) {
        dom::hide_by_id(dom::MINT_PROGRESS);
        set_mint_buttons(false);
    }

    fn show_success(&self) {
        if let Some(modal) = dom::by_id_typed::<HtmlElement>(dom::SUCCESS_MODAL) {
            dom::set_display(&modal, "flex");
        }
    }

    fn hide_success(&self) {
        dom::hide_by_id(dom::SUCCESS_MODAL);
    }

    fn render_contract_stats(&self, stats: &ContractStats) {
        dom::set_text_by_id(dom::CONTRACT_NAME, &stats.name);
        dom::set_text_by_id(dom::MINTED_SO_FAR, &stats.minted_so_far().to_string());
        dom::set_text_by_id(dom::MAX_SUPPLY, &stats.max_supply.to_string());
        dom::set_text_by_id(dom::MINT_PRICE, &stats.mint_price_label(&self.currency));
        dom::set_text_by_id(
            dom::MAX_MINT_PER_ADDRESS,
            &stats.max_mint_per_address.to_string(),
        );
        dom::set_text_by_id(dom::MINT_ACTIVE, stats.mint_active_label());
    }

    fn render_user_stats(&self, stats: &UserStats) {
        dom::set_text_by_id(dom::USER_BALANCE, &stats.balance.to_string());
        dom::set_text_by_id(dom::USER_MINTED_COUNT, &stats.minted_count.to_string());
    }

    fn reload(&self) {
        if let Some(window) = dom::window() {
            let _ = window.location().reload();
        }
    }
}
