//! Injected wallet providers.
//!
//! Wraps whatever EIP-1193 object the wallet extension put on `window` and
//! exposes it as a [`WalletProvider`]. The three probes are registered in
//! priority order: OKX first, then `window.ethereum`, then the legacy
//! `web3.currentProvider`.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use mint_provider::{
    EventHandler, ProviderDetector, ProviderError, ProviderEvent, ProviderKind, ProviderProbe,
    Subscription, UNKNOWN_ERROR, WalletProvider,
};
use mint_types::WalletAddress;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const ACCOUNTS_CHANGED: &str = "accountsChanged";
const CHAIN_CHANGED: &str = "chainChanged";

pub struct InjectedProvider {
    kind: ProviderKind,
    inner: JsValue,
}

impl InjectedProvider {
    pub fn new(kind: ProviderKind, inner: JsValue) -> Self {
        Self { kind, inner }
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.inner, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = self
            .method("request")
            .ok_or_else(|| ProviderError::new(UNKNOWN_ERROR, "wallet does not support request()"))?;

        let args = Object::new();
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::new(UNKNOWN_ERROR, e.to_string()))?;
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(rejection)?;
        Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(rejection)?;

        let promise: Promise = request
            .call1(&self.inner, &args)
            .map_err(rejection)?
            .dyn_into()
            .map_err(|_| ProviderError::malformed(method, "request() did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(rejection)?;

        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::malformed(method, e))
    }

    fn subscribe(&self, handler: EventHandler) -> Subscription {
        let Some(on) = self.method("on") else {
            warn!(wallet = self.kind.label(), "wallet has no on(), events unavailable");
            return Subscription::detached();
        };

        let accounts_handler = handler.clone();
        let accounts = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let accounts: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
            accounts_handler(ProviderEvent::AccountsChanged(
                accounts.into_iter().map(WalletAddress).collect(),
            ));
        });
        let chain = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            handler(ProviderEvent::ChainChanged(value.as_string().unwrap_or_default()));
        });

        let _ = on.call2(&self.inner, &JsValue::from_str(ACCOUNTS_CHANGED), accounts.as_ref());
        let _ = on.call2(&self.inner, &JsValue::from_str(CHAIN_CHANGED), chain.as_ref());

        let remove = self.method("removeListener");
        let target = self.inner.clone();
        Subscription::new(move || {
            if let Some(remove) = remove {
                let accounts_event = JsValue::from_str(ACCOUNTS_CHANGED);
                let chain_event = JsValue::from_str(CHAIN_CHANGED);
                let _ = remove.call2(&target, &accounts_event, accounts.as_ref());
                let _ = remove.call2(&target, &chain_event, chain.as_ref());
            }
            drop(accounts);
            drop(chain);
        })
    }
}

/// Turn a rejected wallet promise (`{ code, message }`) into a [`ProviderError`].
fn rejection(err: JsValue) -> ProviderError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();
    let code = field("code")
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(UNKNOWN_ERROR);
    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown wallet error".to_owned());
    ProviderError::new(code, message)
}

/// `window.a.b...`, or `None` as soon as a link is missing.
fn global(path: &[&str]) -> Option<JsValue> {
    let mut value: JsValue = web_sys::window()?.into();
    for key in path {
        value = Reflect::get(&value, &JsValue::from_str(key)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
    }
    Some(value)
}

struct InjectedProbe {
    kind: ProviderKind,
    path: &'static [&'static str],
    /// Skip this probe when another wallet owns the page.
    shadowed_by: Option<&'static str>,
}

impl ProviderProbe for InjectedProbe {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn probe(&self) -> Option<Rc<dyn WalletProvider>> {
        if self.shadowed_by.is_some_and(|key| global(&[key]).is_some()) {
            return None;
        }
        let inner = global(self.path)?;
        Some(Rc::new(InjectedProvider::new(self.kind, inner)))
    }
}

/// Detector over the wallets a browser page can carry.
pub fn browser_detector() -> ProviderDetector {
    ProviderDetector::default()
        .with_probe(InjectedProbe {
            kind: ProviderKind::Okx,
            path: &["okxwallet", "ethereum"],
            shadowed_by: None,
        })
        .with_probe(InjectedProbe {
            kind: ProviderKind::Injected,
            path: &["ethereum"],
            shadowed_by: Some("okxwallet"),
        })
        .with_probe(InjectedProbe {
            kind: ProviderKind::LegacyWeb3,
            path: &["web3", "currentProvider"],
            shadowed_by: None,
        })
}
