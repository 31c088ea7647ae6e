//! Test doubles for the session: a scripted wallet, an in-memory contract,
//! a recording surface and a scheduler the test drives by hand.

use async_trait::async_trait;
use ethers_core::types::{H256, U256};
use mint_contract::{ContractError, ContractFactory, MintReceipt, NftContract, TxHash};
use mint_provider::{
    EventHandler, ProviderDetector, ProviderError, ProviderEvent, ProviderKind, ProviderProbe,
    Signer, Subscription, WalletProvider,
};
use mint_types::{ContractStats, MintConfig, UserStats, WalletAddress, parse_chain_id};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use crate::{MintSurface, Scheduler, WalletSession};

pub const ACCOUNT: &str = "0x1234567890123456789012345678901234567890";
pub const OTHER_ACCOUNT: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

pub fn account() -> WalletAddress {
    WalletAddress(ACCOUNT.to_owned())
}

// ── Wallet ──

pub struct MockProvider {
    calls: RefCell<Vec<(String, Value)>>,
    failures: RefCell<Vec<(String, ProviderError)>>,
    handler: RefCell<Option<EventHandler>>,
    pub accounts: RefCell<Vec<WalletAddress>>,
    pub authorised: Cell<bool>,
    pub chain_id: Cell<u64>,
    pub knows_target: Cell<bool>,
    pub ignores_switch: Cell<bool>,
    pub unsubscribed: Rc<Cell<bool>>,
}

impl MockProvider {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            calls: RefCell::default(),
            failures: RefCell::default(),
            handler: RefCell::default(),
            accounts: RefCell::new(vec![account()]),
            authorised: Cell::new(false),
            chain_id: Cell::new(chain_id),
            knows_target: Cell::new(true),
            ignores_switch: Cell::new(false),
            unsubscribed: Rc::default(),
        }
    }

    /// Make the next `method` request fail with `code`.
    pub fn fail_next(&self, method: &str, code: i64, message: &str) {
        self.failures
            .borrow_mut()
            .push((method.to_owned(), ProviderError::new(code, message)));
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn params_of(&self, method: &str) -> Value {
        self.calls
            .borrow()
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .unwrap_or(Value::Null)
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn emit(&self, event: ProviderEvent) {
        let handler = self.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }

    fn target_of(params: &Value) -> Option<u64> {
        params[0]["chainId"].as_str().and_then(parse_chain_id)
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Injected
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .borrow_mut()
            .push((method.to_owned(), params.clone()));
        tokio::task::yield_now().await;

        let failure = {
            let mut failures = self.failures.borrow_mut();
            failures
                .iter()
                .position(|(m, _)| m == method)
                .map(|i| failures.remove(i).1)
        };
        if let Some(err) = failure {
            return Err(err);
        }

        match method {
            "eth_requestAccounts" => {
                self.authorised.set(true);
                Ok(serde_json::to_value(&*self.accounts.borrow()).unwrap())
            }
            "eth_accounts" if self.authorised.get() => {
                Ok(serde_json::to_value(&*self.accounts.borrow()).unwrap())
            }
            "eth_accounts" => Ok(json!([])),
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id.get()))),
            "wallet_switchEthereumChain" if !self.knows_target.get() => Err(ProviderError::new(
                4902,
                "Unrecognized chain ID. Try adding the chain using wallet_addEthereumChain first.",
            )),
            "wallet_switchEthereumChain" | "wallet_addEthereumChain" => {
                self.knows_target.set(true);
                if !self.ignores_switch.get() {
                    if let Some(target) = Self::target_of(&params) {
                        self.chain_id.set(target);
                    }
                }
                Ok(Value::Null)
            }
            other => Err(ProviderError::new(-32601, format!("method {other} not supported"))),
        }
    }

    fn subscribe(&self, handler: EventHandler) -> Subscription {
        *self.handler.borrow_mut() = Some(handler);
        let flag = self.unsubscribed.clone();
        Subscription::new(move || flag.set(true))
    }
}

pub struct MockProbe {
    provider: Option<Rc<MockProvider>>,
}

impl ProviderProbe for MockProbe {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Injected
    }

    fn probe(&self) -> Option<Rc<dyn WalletProvider>> {
        let provider: Rc<dyn WalletProvider> = self.provider.clone()?;
        Some(provider)
    }
}

// ── Contract ──

pub struct MockContract {
    pub mint_active: Cell<bool>,
    pub minted: Cell<u64>,
    pub cap: Cell<u64>,
    pub price: Cell<u64>,
    pub native_balance: Cell<u64>,
    pub fail_reads: Cell<bool>,
    pub reject_mint: Cell<bool>,
    pub reads: RefCell<Vec<&'static str>>,
    pub submissions: RefCell<Vec<(WalletAddress, String)>>,
}

impl Default for MockContract {
    fn default() -> Self {
        Self {
            mint_active: Cell::new(true),
            minted: Cell::new(0),
            cap: Cell::new(3),
            price: Cell::new(0),
            native_balance: Cell::new(1_000_000_000_000_000_000),
            fail_reads: Cell::new(false),
            reject_mint: Cell::new(false),
            reads: RefCell::default(),
            submissions: RefCell::default(),
        }
    }
}

impl MockContract {
    async fn read(&self, name: &'static str) -> Result<(), ContractError> {
        self.reads.borrow_mut().push(name);
        tokio::task::yield_now().await;
        if self.fail_reads.get() {
            return Err(ContractError::Provider(ProviderError::new(-32000, "execution reverted")));
        }
        Ok(())
    }

    pub fn read_names(&self) -> Vec<&'static str> {
        self.reads.borrow().clone()
    }
}

#[async_trait(?Send)]
impl NftContract for MockContract {
    async fn name(&self) -> Result<String, ContractError> {
        self.read("name").await?;
        Ok("Valentine NFT".to_owned())
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        self.read("symbol").await?;
        Ok("VAL".to_owned())
    }

    async fn total_supply(&self) -> Result<U256, ContractError> {
        self.read("totalSupply").await?;
        Ok(self.minted.get().into())
    }

    async fn max_supply(&self) -> Result<U256, ContractError> {
        self.read("maxSupply").await?;
        Ok(U256::from(1000u64))
    }

    async fn mint_price(&self) -> Result<U256, ContractError> {
        self.read("mintPrice").await?;
        Ok(self.price.get().into())
    }

    async fn max_mint_per_address(&self) -> Result<U256, ContractError> {
        self.read("maxMintPerAddress").await?;
        Ok(self.cap.get().into())
    }

    async fn mint_active(&self) -> Result<bool, ContractError> {
        self.read("mintActive").await?;
        Ok(self.mint_active.get())
    }

    async fn balance_of(&self, _owner: &WalletAddress) -> Result<U256, ContractError> {
        self.read("balanceOf").await?;
        Ok(self.minted.get().into())
    }

    async fn minted_by_address(&self, _owner: &WalletAddress) -> Result<U256, ContractError> {
        self.read("mintedByAddress").await?;
        Ok(self.minted.get().into())
    }

    async fn current_token_id(&self) -> Result<U256, ContractError> {
        self.read("getCurrentTokenId").await?;
        Ok((self.minted.get() + 1).into())
    }

    async fn remaining_supply(&self) -> Result<U256, ContractError> {
        self.read("getRemainingSupply").await?;
        Ok(U256::from(1000 - self.minted.get()))
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, ContractError> {
        self.read("tokenURI").await?;
        Ok(format!("ipfs://token/{token_id}"))
    }

    async fn owner_of(&self, _token_id: U256) -> Result<WalletAddress, ContractError> {
        self.read("ownerOf").await?;
        Ok(account())
    }

    async fn native_balance(&self, _owner: &WalletAddress) -> Result<U256, ContractError> {
        self.read("nativeBalance").await?;
        Ok(self.native_balance.get().into())
    }

    async fn mint(&self, to: &WalletAddress, uri: &str) -> Result<TxHash, ContractError> {
        tokio::task::yield_now().await;
        if self.reject_mint.get() {
            return Err(ContractError::Provider(ProviderError::new(
                4001,
                "User denied transaction signature.",
            )));
        }
        self.submissions
            .borrow_mut()
            .push((to.clone(), uri.to_owned()));
        self.minted.set(self.minted.get() + 1);
        Ok(H256::from_low_u64_be(self.minted.get()))
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<MintReceipt, ContractError> {
        tokio::task::yield_now().await;
        Ok(MintReceipt {
            tx_hash,
            block_number: Some(1),
        })
    }
}

pub struct MockFactory {
    pub contract: Rc<MockContract>,
    pub bound: RefCell<Vec<WalletAddress>>,
}

impl ContractFactory for MockFactory {
    fn bind(&self, signer: &Signer) -> Result<Rc<dyn NftContract>, ContractError> {
        self.bound.borrow_mut().push(signer.account().clone());
        let contract: Rc<dyn NftContract> = self.contract.clone();
        Ok(contract)
    }
}

// ── Surface ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ui {
    Alert(String),
    Connected(WalletAddress),
    Disconnected,
    ShowNft,
    HideNft,
    Progress(bool),
    Success(bool),
    ContractStats(ContractStats),
    UserStats(UserStats),
    Reload,
}

#[derive(Default)]
pub struct RecordingSurface {
    pub events: RefCell<Vec<Ui>>,
}

impl RecordingSurface {
    fn push(&self, ui: Ui) {
        self.events.borrow_mut().push(ui);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|ui| match ui {
                Ui::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn saw(&self, ui: &Ui) -> bool {
        self.events.borrow().contains(ui)
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl MintSurface for RecordingSurface {
    fn alert(&self, message: &str) {
        self.push(Ui::Alert(message.to_owned()));
    }

    fn show_connected(&self, account: &WalletAddress, _network: &str) {
        self.push(Ui::Connected(account.clone()));
    }

    fn show_disconnected(&self) {
        self.push(Ui::Disconnected);
    }

    fn show_nft_display(&self) {
        self.push(Ui::ShowNft);
    }

    fn hide_nft_display(&self) {
        self.push(Ui::HideNft);
    }

    fn show_mint_progress(&self) {
        self.push(Ui::Progress(true));
    }

    fn hide_mint_progress(&self) {
        self.push(Ui::Progress(false));
    }

    fn show_success(&self) {
        self.push(Ui::Success(true));
    }

    fn hide_success(&self) {
        self.push(Ui::Success(false));
    }

    fn render_contract_stats(&self, stats: &ContractStats) {
        self.push(Ui::ContractStats(stats.clone()));
    }

    fn render_user_stats(&self, stats: &UserStats) {
        self.push(Ui::UserStats(stats.clone()));
    }

    fn reload(&self) {
        self.push(Ui::Reload);
    }
}

// ── Scheduler ──

type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

#[derive(Default)]
pub struct ManualScheduler {
    timers: RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>,
    tasks: RefCell<Vec<LocalTask>>,
}

impl ManualScheduler {
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.timers.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Fire every timer scheduled so far, as if their delays elapsed.
    pub fn fire_timers(&self) {
        let due: Vec<_> = self.timers.borrow_mut().drain(..).collect();
        for (_, task) in due {
            task();
        }
    }

    /// Await every spawned task, including ones spawned along the way.
    pub async fn run_spawned(&self) {
        loop {
            let batch: Vec<_> = self.tasks.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                return;
            }
            for task in batch {
                task.await;
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.timers.borrow_mut().push((delay, task));
    }

    fn spawn(&self, task: LocalTask) {
        self.tasks.borrow_mut().push(task);
    }
}

// ── Harness ──

pub struct Harness {
    pub session: WalletSession,
    pub provider: Rc<MockProvider>,
    pub contract: Rc<MockContract>,
    pub factory: Rc<MockFactory>,
    pub surface: Rc<RecordingSurface>,
    pub scheduler: Rc<ManualScheduler>,
}

impl Harness {
    /// Wallet installed and already on the required chain.
    pub fn new() -> Self {
        Self::build(1270, true)
    }

    pub fn on_chain(chain_id: u64) -> Self {
        Self::build(chain_id, true)
    }

    pub fn without_wallet() -> Self {
        Self::build(1270, false)
    }

    fn build(chain_id: u64, installed: bool) -> Self {
        let provider = Rc::new(MockProvider::on_chain(chain_id));
        let detector = ProviderDetector::default().with_probe(MockProbe {
            provider: installed.then(|| provider.clone()),
        });
        let contract = Rc::new(MockContract::default());
        let factory = Rc::new(MockFactory {
            contract: contract.clone(),
            bound: RefCell::default(),
        });
        let surface = Rc::new(RecordingSurface::default());
        let scheduler = Rc::new(ManualScheduler::default());
        let session = WalletSession::new(
            MintConfig::default(),
            detector,
            factory.clone(),
            surface.clone(),
            scheduler.clone(),
        );
        Self {
            session,
            provider,
            contract,
            factory,
            surface,
            scheduler,
        }
    }

    pub async fn connected() -> Self {
        let harness = Self::new();
        harness.session.connect().await.unwrap();
        harness.surface.clear();
        harness
    }
}
