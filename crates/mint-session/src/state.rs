use mint_contract::NftContract;
use mint_provider::{Signer, WalletProvider};
use mint_types::WalletAddress;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MintState {
    #[default]
    Idle,
    Minting,
}

/// Minted-NFT display: shown only once the page has loaded and a connection
/// asked for it, after the reveal delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Hidden,
    PendingReveal,
    Revealed,
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub provider: Option<Rc<dyn WalletProvider>>,
    pub signer: Option<Signer>,
    pub contract: Option<Rc<dyn NftContract>>,
    pub user_address: Option<WalletAddress>,
    pub connection: ConnectionState,
    pub mint: MintState,
    pub reveal: RevealState,
    pub main_page_loaded: bool,
    /// Bumped by every disconnect. Work started under an older generation
    /// must not write wallet state or UI once it resumes.
    pub generation: u64,
    /// A connect task is still running, even if a disconnect already moved
    /// `connection` back to Disconnected.
    pub connect_in_flight: bool,
}

impl SessionState {
    pub fn clear_wallet(&mut self) {
        self.provider = None;
        self.signer = None;
        self.contract = None;
        self.user_address = None;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn bound_contract(&self) -> Option<(Rc<dyn NftContract>, WalletAddress)> {
        self.contract.clone().zip(self.user_address.clone())
    }
}
