//! Contract surface of the minting dApp.
//!
//! `NftContract` is what the session talks to; `Erc721Contract` is the
//! binding used in the browser, which ABI-encodes every call and routes it
//! through the signer's wallet provider.

mod erc721;

pub use erc721::{Erc721Contract, Erc721Factory, NFT_ABI};

use async_trait::async_trait;
use ethers_core::types::{H256, U256};
use mint_provider::{ProviderError, Signer};
use mint_types::WalletAddress;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

pub type TxHash = H256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("abi error: {0}")]
    Abi(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("unexpected output from {0}")]
    UnexpectedOutput(String),
    #[error("transaction {0:?} reverted")]
    Reverted(TxHash),
}

impl ContractError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ContractError::Provider(err) if err.is_user_rejection())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[async_trait(?Send)]
pub trait NftContract {
    async fn name(&self) -> Result<String, ContractError>;
    async fn symbol(&self) -> Result<String, ContractError>;
    async fn total_supply(&self) -> Result<U256, ContractError>;
    async fn max_supply(&self) -> Result<U256, ContractError>;
    async fn mint_price(&self) -> Result<U256, ContractError>;
    async fn max_mint_per_address(&self) -> Result<U256, ContractError>;
    async fn mint_active(&self) -> Result<bool, ContractError>;
    async fn balance_of(&self, owner: &WalletAddress) -> Result<U256, ContractError>;
    async fn minted_by_address(&self, owner: &WalletAddress) -> Result<U256, ContractError>;
    async fn current_token_id(&self) -> Result<U256, ContractError>;
    async fn remaining_supply(&self) -> Result<U256, ContractError>;
    async fn token_uri(&self, token_id: U256) -> Result<String, ContractError>;
    async fn owner_of(&self, token_id: U256) -> Result<WalletAddress, ContractError>;

    /// Native-currency balance of `owner`, used for the price pre-flight.
    async fn native_balance(&self, owner: &WalletAddress) -> Result<U256, ContractError>;

    /// Submit `mint(to, uri)`. The function is non-payable; no value is sent.
    async fn mint(&self, to: &WalletAddress, uri: &str) -> Result<TxHash, ContractError>;

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<MintReceipt, ContractError>;
}

/// Binds the fixed contract to whichever signer the session currently holds.
pub trait ContractFactory {
    fn bind(&self, signer: &Signer) -> Result<Rc<dyn NftContract>, ContractError>;
}

/// Timer used between receipt polls.
pub trait Delay {
    fn delay(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()>>>;
}
