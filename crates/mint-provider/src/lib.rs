use async_trait::async_trait;
use mint_types::{WalletAddress, parse_chain_id};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, info};

/// EIP-1193 code: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// EIP-3326 code: the chain has not been added to the wallet.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// JSON-RPC code some wallets use while a permission prompt is already open.
pub const REQUEST_PENDING: i64 = -32002;
/// Used when a rejection carries no numeric code at all.
pub const UNKNOWN_ERROR: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(method: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(UNKNOWN_ERROR, format!("malformed {method} response: {detail}"))
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN
    }

    pub fn is_request_pending(&self) -> bool {
        self.code == REQUEST_PENDING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OKX browser extension (`window.okxwallet.ethereum`).
    Okx,
    /// Any EIP-1193 `window.ethereum`, MetaMask in practice.
    Injected,
    /// Pre-1193 `window.web3.currentProvider`.
    LegacyWeb3,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Okx => "OKX Wallet",
            ProviderKind::Injected => "MetaMask",
            ProviderKind::LegacyWeb3 => "Web3 wallet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<WalletAddress>),
    ChainChanged(String),
}

pub type EventHandler = Rc<dyn Fn(ProviderEvent)>;

/// Live event registration. Dropping it unregisters the listeners.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { teardown: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

#[async_trait(?Send)]
pub trait WalletProvider {
    fn kind(&self) -> ProviderKind;
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
    fn subscribe(&self, handler: EventHandler) -> Subscription;
}

/// One ranked probe for an injected wallet.
pub trait ProviderProbe {
    fn kind(&self) -> ProviderKind;
    fn probe(&self) -> Option<Rc<dyn WalletProvider>>;
}

/// Ordered probe list; the first probe that finds a wallet wins.
#[derive(Default)]
pub struct ProviderDetector {
    probes: Vec<Box<dyn ProviderProbe>>,
}

impl ProviderDetector {
    pub fn register(&mut self, probe: Box<dyn ProviderProbe>) {
        self.probes.push(probe);
    }

    pub fn with_probe(mut self, probe: impl ProviderProbe + 'static) -> Self {
        self.register(Box::new(probe));
        self
    }

    pub fn detect(&self) -> Option<Rc<dyn WalletProvider>> {
        for probe in &self.probes {
            if let Some(provider) = probe.probe() {
                info!("detected {} provider", probe.kind().label());
                return Some(provider);
            }
        }
        debug!("no injected wallet provider detected");
        None
    }
}

/// Transaction-authorising capability: a provider bound to one account.
#[derive(Clone)]
pub struct Signer {
    provider: Rc<dyn WalletProvider>,
    account: WalletAddress,
}

impl Signer {
    pub fn new(provider: Rc<dyn WalletProvider>, account: WalletAddress) -> Self {
        Self { provider, account }
    }

    pub fn provider(&self) -> &Rc<dyn WalletProvider> {
        &self.provider
    }

    pub fn account(&self) -> &WalletAddress {
        &self.account
    }
}

/// `eth_accounts` / `eth_requestAccounts`.
pub async fn request_accounts(
    provider: &dyn WalletProvider,
    method: &str,
) -> Result<Vec<WalletAddress>, ProviderError> {
    let value = provider.request(method, Value::Array(Vec::new())).await?;
    let Value::Array(items) = value else {
        return Err(ProviderError::malformed(method, "expected an array"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(addr) => Ok(WalletAddress(addr)),
            other => Err(ProviderError::malformed(method, other)),
        })
        .collect()
}

/// `eth_chainId`, parsed to a number.
pub async fn chain_id(provider: &dyn WalletProvider) -> Result<u64, ProviderError> {
    let value = provider.request("eth_chainId", Value::Array(Vec::new())).await?;
    let parsed = match &value {
        Value::String(raw) => parse_chain_id(raw),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.ok_or_else(|| ProviderError::malformed("eth_chainId", value))
}
