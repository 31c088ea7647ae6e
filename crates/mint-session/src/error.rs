use ethers_core::types::U256;
use mint_contract::ContractError;
use mint_provider::ProviderError;

/// Everything `connect`, `enforce_chain` and `mint` can fail with. The
/// `Display` text is what the user sees in the alert.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No wallet found. Please install OKX Wallet or MetaMask.")]
    NoWalletFound,
    #[error("The request was rejected in your wallet.")]
    UserRejected,
    #[error("A wallet request is already pending. Please open your wallet to continue.")]
    RequestInFlight,
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Network switch failed: {0}")]
    ChainEnforcementFailed(String),
    #[error("Please connect your wallet first.")]
    NotConnected,
    #[error("Minting is not active yet.")]
    MintingInactive,
    #[error("You have reached the maximum mint count ({minted}/{cap}).")]
    MintCapReached { minted: U256, cap: U256 },
    #[error("Insufficient funds to cover the mint price.")]
    InsufficientFunds { balance: U256, price: U256 },
    #[error("Mint failed: {0}")]
    TransactionFailed(String),
}

impl SessionError {
    /// Classify a failed `eth_requestAccounts`.
    pub fn from_account_request(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            SessionError::UserRejected
        } else if err.is_request_pending() {
            SessionError::RequestInFlight
        } else {
            SessionError::ConnectionFailed(err.message)
        }
    }

    /// Classify a failed contract read, submission or confirmation.
    pub fn from_contract(err: ContractError) -> Self {
        if err.is_user_rejection() {
            SessionError::UserRejected
        } else {
            SessionError::TransactionFailed(err.to_string())
        }
    }
}
