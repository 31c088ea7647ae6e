use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

pub const IRYS_TESTNET_CHAIN_ID: u64 = 1270;
pub const IRYS_TESTNET_NAME: &str = "IRYS Testnet";
pub const IRYS_TESTNET_RPC_URL: &str = "https://testnet-rpc.irys.xyz/v1/execution-rpc";
pub const IRYS_TESTNET_EXPLORER_URL: &str = "https://explorer.irys.xyz";
pub const NFT_CONTRACT_ADDRESS: &str = "0xEC1bBDe70c5954779226C963C93FcC0D7989a0E3";
pub const DEFAULT_TOKEN_URI: &str = "https://gateway.pinata.cloud/ipfs/QmValentineNFT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// `0x1234...abcd` form used in the header badge.
    pub fn short(&self) -> String {
        let addr = self.0.as_str();
        if addr.len() < 10 {
            return addr.to_owned();
        }
        match (addr.get(..6), addr.get(addr.len() - 4..)) {
            (Some(head), Some(tail)) => format!("{head}...{tail}"),
            _ => addr.to_owned(),
        }
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: IRYS_TESTNET_CHAIN_ID,
            name: IRYS_TESTNET_NAME.to_owned(),
            rpc_url: IRYS_TESTNET_RPC_URL.to_owned(),
            block_explorer_urls: vec![IRYS_TESTNET_EXPLORER_URL.to_owned()],
            native_currency: NativeCurrency {
                name: "IRYS".to_owned(),
                symbol: "IRYS".to_owned(),
                decimals: 18,
            },
        }
    }
}

impl NetworkConfig {
    /// Chain id in the `0x`-prefixed lowercase hex form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn switch_chain_params(&self) -> SwitchEthereumChainParameter {
        SwitchEthereumChainParameter {
            chain_id: self.chain_id_hex(),
        }
    }

    pub fn add_chain_params(&self) -> AddEthereumChainParameter {
        AddEthereumChainParameter {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: self.block_explorer_urls.clone(),
            native_currency: self.native_currency.clone(),
        }
    }
}

/// Payload of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwitchEthereumChainParameter {
    pub chain_id: String,
}

/// Payload of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

/// Parse a chain id as reported by a wallet. Hex with `0x` prefix is the
/// norm; some legacy providers still answer in decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct MintConfig {
    pub contract_address: String,
    pub network: NetworkConfig,
    pub default_token_uri: String,
    pub reveal_delay_ms: u64,
    pub auto_return_delay_ms: u64,
    pub receipt_poll_interval_ms: u64,
    /// `tracing` filter directive for the browser console.
    pub log_filter: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            contract_address: NFT_CONTRACT_ADDRESS.to_owned(),
            network: NetworkConfig::default(),
            default_token_uri: DEFAULT_TOKEN_URI.to_owned(),
            reveal_delay_ms: 3_000,
            auto_return_delay_ms: 3_000,
            receipt_poll_interval_ms: 1_000,
            log_filter: "info".to_owned(),
        }
    }
}

/// Read-only contract fields shown in the stats panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractStats {
    pub name: String,
    pub symbol: String,
    pub current_token_id: U256,
    pub max_supply: U256,
    pub mint_price: U256,
    pub max_mint_per_address: U256,
    pub mint_active: bool,
}

impl ContractStats {
    /// Token ids start at 1, so the counter runs one ahead of the minted count.
    pub fn minted_so_far(&self) -> U256 {
        self.current_token_id.saturating_sub(U256::one())
    }

    pub fn mint_active_label(&self) -> &'static str {
        if self.mint_active { "Active" } else { "Inactive" }
    }

    pub fn mint_price_label(&self, currency: &str) -> String {
        format!("{} {}", format_ether(self.mint_price), currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub balance: U256,
    pub minted_count: U256,
}

/// Wei amount as a decimal ether string with trailing zeros trimmed
/// (`0.0`, `0.25`, `3.0`).
pub fn format_ether(wei: U256) -> String {
    let full = ethers_core::utils::format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => full,
    }
}
