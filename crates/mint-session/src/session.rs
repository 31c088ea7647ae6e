use mint_contract::{ContractError, ContractFactory, MintReceipt, NftContract};
use mint_provider::{
    EventHandler, ProviderDetector, ProviderEvent, Signer, Subscription, WalletProvider,
    request_accounts,
};
use mint_types::{ContractStats, MintConfig, UserStats, WalletAddress};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chain;
use crate::state::{ConnectionState, MintState, RevealState, SessionState};
use crate::surface::{MintSurface, Scheduler, TimerHandle, schedule_cancellable};
use crate::SessionError;

/// One wallet session per page. Cheap to clone: clones share state, so the
/// same session can be handed to every event handler.
#[derive(Clone)]
pub struct WalletSession {
    inner: Rc<Inner>,
}

struct Inner {
    config: MintConfig,
    detector: ProviderDetector,
    contracts: Rc<dyn ContractFactory>,
    surface: Rc<dyn MintSurface>,
    scheduler: Rc<dyn Scheduler>,
    state: RefCell<SessionState>,
    subscription: RefCell<Option<Subscription>>,
    reveal_timer: RefCell<Option<TimerHandle>>,
    return_timer: RefCell<Option<TimerHandle>>,
}

impl WalletSession {
    pub fn new(
        config: MintConfig,
        detector: ProviderDetector,
        contracts: Rc<dyn ContractFactory>,
        surface: Rc<dyn MintSurface>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                detector,
                contracts,
                surface,
                scheduler,
                state: RefCell::default(),
                subscription: RefCell::default(),
                reveal_timer: RefCell::default(),
                return_timer: RefCell::default(),
            }),
        }
    }

    pub fn config(&self) -> &MintConfig {
        &self.inner.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.state.borrow().connection
    }

    pub fn mint_state(&self) -> MintState {
        self.inner.state.borrow().mint
    }

    pub fn reveal_state(&self) -> RevealState {
        self.inner.state.borrow().reveal
    }

    pub fn user_address(&self) -> Option<WalletAddress> {
        self.inner.state.borrow().user_address.clone()
    }

    pub fn signer(&self) -> Option<Signer> {
        self.inner.state.borrow().signer.clone()
    }

    pub fn has_contract(&self) -> bool {
        self.inner.state.borrow().contract.is_some()
    }

    // ── Provider detection ──

    pub fn detect_provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.inner.detector.detect()
    }

    /// Page start-up: subscribe to wallet events and quietly pick up an
    /// account the wallet has already authorised for this site.
    pub async fn start(&self) {
        let Some(provider) = self.detect_provider() else {
            return;
        };
        self.ensure_subscribed(&provider);
        let Some(generation) = self.begin_connecting() else {
            return;
        };

        let outcome = match request_accounts(provider.as_ref(), "eth_accounts").await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => self.establish(provider, account, generation).await,
                None => Err(SessionError::NotConnected),
            },
            Err(err) => Err(SessionError::ConnectionFailed(err.message)),
        };
        self.finish_connecting(generation, &outcome);
        if let Err(err) = outcome {
            debug!(error = %err, "no session to resume");
        }
    }

    // ── Connection ──

    pub async fn connect(&self) -> Result<(), SessionError> {
        let Some(generation) = self.begin_connecting() else {
            return Ok(());
        };

        let outcome = self.request_connection(generation).await;
        if !self.is_current(generation) {
            debug!("connection attempt superseded by a disconnect");
            self.finish_connecting(generation, &outcome);
            return Err(SessionError::NotConnected);
        }
        if let Err(err) = &outcome {
            warn!(error = %err, "wallet connection failed");
            self.alert(err);
        }
        self.finish_connecting(generation, &outcome);
        outcome
    }

    /// Claim the connect guard. Returns the generation the attempt runs under.
    fn begin_connecting(&self) -> Option<u64> {
        let mut state = self.inner.state.borrow_mut();
        if state.connect_in_flight {
            debug!("wallet connection already in progress");
            return None;
        }
        match state.connection {
            ConnectionState::Disconnected => {
                state.connection = ConnectionState::Connecting;
                state.connect_in_flight = true;
                Some(state.generation)
            }
            ConnectionState::Connecting => {
                debug!("wallet connection already in progress");
                None
            }
            ConnectionState::Connected => {
                debug!("wallet already connected");
                None
            }
        }
    }

    /// Release the connect guard. A stale attempt leaves the state to the
    /// disconnect that superseded it.
    fn finish_connecting(&self, generation: u64, outcome: &Result<(), SessionError>) {
        let mut state = self.inner.state.borrow_mut();
        state.connect_in_flight = false;
        if !state.is_current(generation) {
            return;
        }
        match outcome {
            Ok(()) => state.connection = ConnectionState::Connected,
            Err(_) => {
                state.clear_wallet();
                state.connection = ConnectionState::Disconnected;
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.borrow().is_current(generation)
    }

    fn ensure_current(&self, generation: u64) -> Result<(), SessionError> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    async fn request_connection(&self, generation: u64) -> Result<(), SessionError> {
        let provider = self.detect_provider().ok_or(SessionError::NoWalletFound)?;
        let accounts = request_accounts(provider.as_ref(), "eth_requestAccounts")
            .await
            .map_err(SessionError::from_account_request)?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or(SessionError::UserRejected)?;
        self.establish(provider, account, generation).await
    }

    /// Everything after the wallet handed us an account: signer, chain,
    /// contract binding, UI, first data load.
    async fn establish(
        &self,
        provider: Rc<dyn WalletProvider>,
        account: WalletAddress,
        generation: u64,
    ) -> Result<(), SessionError> {
        self.ensure_current(generation)?;
        self.ensure_subscribed(&provider);
        let signer = Signer::new(provider.clone(), account.clone());
        {
            let mut state = self.inner.state.borrow_mut();
            state.provider = Some(provider.clone());
            state.user_address = Some(account.clone());
            state.signer = Some(signer.clone());
            state.contract = None;
        }

        chain::enforce_chain(provider.as_ref(), &self.inner.config.network).await?;
        self.ensure_current(generation)?;

        let contract = self
            .inner
            .contracts
            .bind(&signer)
            .map_err(|err| SessionError::ConnectionFailed(err.to_string()))?;
        self.inner.state.borrow_mut().contract = Some(contract);

        self.inner
            .surface
            .show_connected(&account, &self.inner.config.network.name);
        self.request_reveal();
        self.refresh_info().await;
        self.ensure_current(generation)?;
        info!(account = %account, "wallet connected");
        Ok(())
    }

    /// Put the wallet on the required chain. Alerts on failure.
    pub async fn enforce_chain(&self) -> Result<(), SessionError> {
        let provider = self.inner.state.borrow().provider.clone();
        let result = match provider.or_else(|| self.detect_provider()) {
            Some(provider) => {
                chain::enforce_chain(provider.as_ref(), &self.inner.config.network).await
            }
            None => Err(SessionError::NoWalletFound),
        };
        if let Err(err) = &result {
            warn!(error = %err, "chain enforcement failed");
            self.alert(err);
        }
        result
    }

    pub fn disconnect(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.generation = state.generation.wrapping_add(1);
            state.clear_wallet();
            state.connection = ConnectionState::Disconnected;
            state.reveal = RevealState::Hidden;
        }
        self.inner.reveal_timer.borrow_mut().take();
        self.inner.return_timer.borrow_mut().take();
        self.inner.surface.show_disconnected();
        info!("wallet disconnected");
    }

    /// Tear down provider subscriptions and pending timers.
    pub fn dispose(&self) {
        self.inner.subscription.borrow_mut().take();
        self.inner.reveal_timer.borrow_mut().take();
        self.inner.return_timer.borrow_mut().take();
    }

    // ── Minting ──

    pub async fn mint(&self) -> Result<(), SessionError> {
        let (bound, generation) = {
            let mut state = self.inner.state.borrow_mut();
            if state.mint == MintState::Minting {
                debug!("mint already in progress");
                return Ok(());
            }
            let bound = state.bound_contract();
            if bound.is_some() {
                state.mint = MintState::Minting;
            }
            (bound, state.generation)
        };
        let Some((contract, account)) = bound else {
            let err = SessionError::NotConnected;
            warn!("mint requested without a connected wallet");
            self.alert(&err);
            return Err(err);
        };

        let outcome = self.run_mint(contract.as_ref(), &account, generation).await;
        match &outcome {
            Ok(receipt) => info!(tx = ?receipt.tx_hash, "mint complete"),
            Err(err) => {
                warn!(error = %err, "mint failed");
                self.alert(err);
            }
        }
        self.inner.state.borrow_mut().mint = MintState::Idle;
        outcome.map(|_| ())
    }

    async fn run_mint(
        &self,
        contract: &dyn NftContract,
        account: &WalletAddress,
        generation: u64,
    ) -> Result<MintReceipt, SessionError> {
        if !contract.mint_active().await.map_err(SessionError::from_contract)? {
            return Err(SessionError::MintingInactive);
        }

        let minted = contract
            .minted_by_address(account)
            .await
            .map_err(SessionError::from_contract)?;
        let cap = contract
            .max_mint_per_address()
            .await
            .map_err(SessionError::from_contract)?;
        if minted >= cap {
            return Err(SessionError::MintCapReached { minted, cap });
        }

        let price = contract
            .mint_price()
            .await
            .map_err(SessionError::from_contract)?;
        let balance = contract
            .native_balance(account)
            .await
            .map_err(SessionError::from_contract)?;
        if balance < price {
            return Err(SessionError::InsufficientFunds { balance, price });
        }

        self.inner.surface.show_mint_progress();
        let uri = &self.inner.config.default_token_uri;
        let confirmed = submit_and_confirm(contract, account, uri).await;
        self.inner.surface.hide_mint_progress();
        let receipt = confirmed.map_err(SessionError::from_contract)?;

        if !self.is_current(generation) {
            info!(tx = ?receipt.tx_hash, "mint confirmed after the wallet disconnected");
            return Ok(receipt);
        }

        self.inner.surface.show_success();
        self.refresh_info().await;
        self.schedule_return_to_idle();
        Ok(receipt)
    }

    fn schedule_return_to_idle(&self) {
        let delay = Duration::from_millis(self.inner.config.auto_return_delay_ms);
        let weak = Rc::downgrade(&self.inner);
        let handle = schedule_cancellable(self.inner.scheduler.as_ref(), delay, move || {
            if let Some(inner) = weak.upgrade() {
                let session = WalletSession { inner };
                session.inner.return_timer.borrow_mut().take();
                session.inner.surface.hide_success();
                session.hide_nft_display();
            }
        });
        *self.inner.return_timer.borrow_mut() = Some(handle);
    }

    /// User closed the success modal before the auto-return fired.
    pub fn close_success_modal(&self) {
        self.inner.return_timer.borrow_mut().take();
        self.inner.surface.hide_success();
        self.hide_nft_display();
    }

    // ── Contract data ──

    /// Reload the stats panel. Best effort: failures are only logged.
    pub async fn refresh_info(&self) {
        let (bound, generation) = {
            let state = self.inner.state.borrow();
            (state.bound_contract(), state.generation)
        };
        let Some((contract, account)) = bound else {
            return;
        };
        match fetch_stats(contract.as_ref(), &account).await {
            Ok(_) if !self.is_current(generation) => {
                debug!("dropping stats fetched before a disconnect");
            }
            Ok((stats, user)) => {
                self.inner.surface.render_contract_stats(&stats);
                self.inner.surface.render_user_stats(&user);
            }
            Err(err) => warn!(error = %err, "failed to refresh contract info"),
        }
    }

    // ── Minted-NFT display ──

    /// One-shot hook the host page calls once its own loading is done.
    pub fn on_main_page_loaded(&self) {
        let start = {
            let mut state = self.inner.state.borrow_mut();
            if state.main_page_loaded {
                return;
            }
            state.main_page_loaded = true;
            state.reveal == RevealState::PendingReveal
        };
        info!("main page loaded");
        if start {
            self.start_reveal_timer();
        }
    }

    pub fn hide_nft_display(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.reveal == RevealState::Revealed {
                state.reveal = RevealState::Hidden;
            }
        }
        self.inner.surface.hide_nft_display();
    }

    fn request_reveal(&self) {
        let start = {
            let mut state = self.inner.state.borrow_mut();
            if state.reveal == RevealState::Hidden {
                state.reveal = RevealState::PendingReveal;
            }
            state.reveal == RevealState::PendingReveal && state.main_page_loaded
        };
        if start {
            self.start_reveal_timer();
        }
    }

    fn start_reveal_timer(&self) {
        if self.inner.reveal_timer.borrow().is_some() {
            return;
        }
        let delay = Duration::from_millis(self.inner.config.reveal_delay_ms);
        debug!(?delay, "mint display reveal scheduled");
        let weak = Rc::downgrade(&self.inner);
        let handle = schedule_cancellable(self.inner.scheduler.as_ref(), delay, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.reveal_timer.borrow_mut().take();
            let reveal = {
                let mut state = inner.state.borrow_mut();
                let ready = state.reveal == RevealState::PendingReveal
                    && state.connection == ConnectionState::Connected;
                if ready {
                    state.reveal = RevealState::Revealed;
                }
                ready
            };
            if reveal {
                inner.surface.show_nft_display();
            }
        });
        *self.inner.reveal_timer.borrow_mut() = Some(handle);
    }

    // ── Wallet events ──

    fn ensure_subscribed(&self, provider: &Rc<dyn WalletProvider>) {
        if self.inner.subscription.borrow().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let handler: EventHandler = Rc::new(move |event: ProviderEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let scheduler = inner.scheduler.clone();
            let session = WalletSession { inner };
            scheduler.spawn(Box::pin(async move {
                session.handle_provider_event(event).await;
            }));
        });
        let subscription = provider.subscribe(handler);
        *self.inner.subscription.borrow_mut() = Some(subscription);
    }

    pub async fn handle_provider_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    info!("wallet reports no accounts");
                    self.disconnect();
                }
                Some(account) => self.switch_account(account).await,
            },
            ProviderEvent::ChainChanged(chain_id) => {
                info!(chain_id = %chain_id, "wallet changed chain, reloading");
                self.inner.surface.reload();
            }
        }
    }

    async fn switch_account(&self, account: WalletAddress) {
        let provider = {
            let state = self.inner.state.borrow();
            if state.connection != ConnectionState::Connected {
                debug!(account = %account, "account change ignored while not connected");
                return;
            }
            state.provider.clone()
        };
        let Some(provider) = provider else {
            return;
        };

        let signer = Signer::new(provider, account.clone());
        match self.inner.contracts.bind(&signer) {
            Ok(contract) => {
                let mut state = self.inner.state.borrow_mut();
                state.user_address = Some(account.clone());
                state.signer = Some(signer);
                state.contract = Some(contract);
            }
            Err(err) => {
                warn!(error = %err, "could not rebind contract to new account");
                self.disconnect();
                return;
            }
        }
        info!(account = %account, "wallet account changed");
        self.inner
            .surface
            .show_connected(&account, &self.inner.config.network.name);
        self.refresh_info().await;
    }

    fn alert(&self, err: &SessionError) {
        let message = match err {
            SessionError::ChainEnforcementFailed(_) => {
                let network = &self.inner.config.network;
                format!(
                    "{err}\n\nPlease switch to {} manually.\nRPC: {}\nChain ID: {}",
                    network.name, network.rpc_url, network.chain_id
                )
            }
            _ => err.to_string(),
        };
        self.inner.surface.alert(&message);
    }
}

async fn submit_and_confirm(
    contract: &dyn NftContract,
    account: &WalletAddress,
    uri: &str,
) -> Result<MintReceipt, ContractError> {
    let tx_hash = contract.mint(account, uri).await?;
    contract.wait_for_confirmation(tx_hash).await
}

async fn fetch_stats(
    contract: &dyn NftContract,
    account: &WalletAddress,
) -> Result<(ContractStats, UserStats), ContractError> {
    let (
        name,
        symbol,
        current_token_id,
        max_supply,
        mint_price,
        max_mint_per_address,
        mint_active,
    ) = futures::try_join!(
        contract.name(),
        contract.symbol(),
        contract.current_token_id(),
        contract.max_supply(),
        contract.mint_price(),
        contract.max_mint_per_address(),
        contract.mint_active(),
    )?;
    let (balance, minted_count) = futures::try_join!(
        contract.balance_of(account),
        contract.minted_by_address(account),
    )?;

    Ok((
        ContractStats {
            name,
            symbol,
            current_token_id,
            max_supply,
            mint_price,
            max_mint_per_address,
            mint_active,
        },
        UserStats {
            balance,
            minted_count,
        },
    ))
}
