use async_trait::async_trait;
use ethers_core::abi::{Abi, Function, Token, parse_abi};
use ethers_core::types::{Address, Bytes, U64, U256};
use ethers_core::utils::to_checksum;
use mint_provider::{ProviderError, Signer};
use mint_types::{MintConfig, WalletAddress};
use serde::Deserialize;
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{ContractError, ContractFactory, Delay, MintReceipt, NftContract, TxHash};

pub const NFT_ABI: &[&str] = &[
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function totalSupply() view returns (uint256)",
    "function maxSupply() view returns (uint256)",
    "function mintPrice() view returns (uint256)",
    "function maxMintPerAddress() view returns (uint256)",
    "function mintActive() view returns (bool)",
    "function balanceOf(address account) view returns (uint256)",
    "function mintedByAddress(address account) view returns (uint256)",
    "function getCurrentTokenId() view returns (uint256)",
    "function getRemainingSupply() view returns (uint256)",
    "function tokenURI(uint256 tokenId) view returns (string)",
    "function ownerOf(uint256 tokenId) view returns (address)",
    "function mint(address to, string uri)",
];

/// Builds `Erc721Contract` handles for the configured deployment.
pub struct Erc721Factory {
    address: Address,
    abi: Rc<Abi>,
    delay: Rc<dyn Delay>,
    poll_interval: Duration,
}

impl Erc721Factory {
    pub fn new(config: &MintConfig, delay: Rc<dyn Delay>) -> Result<Self, ContractError> {
        let abi = parse_abi(NFT_ABI).map_err(|err| ContractError::Abi(err.to_string()))?;
        Ok(Self {
            address: parse_address(&config.contract_address)?,
            abi: Rc::new(abi),
            delay,
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
        })
    }
}

impl ContractFactory for Erc721Factory {
    fn bind(&self, signer: &Signer) -> Result<Rc<dyn NftContract>, ContractError> {
        let from = parse_address(&signer.account().0)?;
        debug!(contract = ?self.address, from = ?from, "binding contract to signer");
        Ok(Rc::new(Erc721Contract {
            address: self.address,
            abi: self.abi.clone(),
            signer: signer.clone(),
            from,
            delay: self.delay.clone(),
            poll_interval: self.poll_interval,
        }))
    }
}

pub struct Erc721Contract {
    address: Address,
    abi: Rc<Abi>,
    signer: Signer,
    from: Address,
    delay: Rc<dyn Delay>,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
}

impl Erc721Contract {
    fn function(&self, name: &str) -> Result<&Function, ContractError> {
        self.abi
            .function(name)
            .map_err(|err| ContractError::Abi(err.to_string()))
    }

    async fn rpc<T>(&self, method: &str, params: Value) -> Result<T, ContractError>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = self.signer.provider().request(method, params).await?;
        serde_json::from_value(raw).map_err(|err| ProviderError::malformed(method, err).into())
    }

    async fn call(&self, name: &str, args: &[Token]) -> Result<Token, ContractError> {
        let function = self.function(name)?;
        let data = function
            .encode_input(args)
            .map_err(|err| ContractError::Abi(err.to_string()))?;
        let call = json!({
            "from": self.from,
            "to": self.address,
            "data": Bytes::from(data),
        });
        let output: Bytes = self.rpc("eth_call", json!([call, "latest"])).await?;
        function
            .decode_output(&output)
            .map_err(|err| ContractError::Abi(err.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| ContractError::UnexpectedOutput(name.to_owned()))
    }

    async fn call_uint(&self, name: &str, args: &[Token]) -> Result<U256, ContractError> {
        self.call(name, args)
            .await?
            .into_uint()
            .ok_or_else(|| ContractError::UnexpectedOutput(name.to_owned()))
    }

    async fn call_string(&self, name: &str, args: &[Token]) -> Result<String, ContractError> {
        self.call(name, args)
            .await?
            .into_string()
            .ok_or_else(|| ContractError::UnexpectedOutput(name.to_owned()))
    }
}

#[async_trait(?Send)]
impl NftContract for Erc721Contract {
    async fn name(&self) -> Result<String, ContractError> {
        self.call_string("name", &[]).await
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        self.call_string("symbol", &[]).await
    }

    async fn total_supply(&self) -> Result<U256, ContractError> {
        self.call_uint("totalSupply", &[]).await
    }

    async fn max_supply(&self) -> Result<U256, ContractError> {
        self.call_uint("maxSupply", &[]).await
    }

    async fn mint_price(&self) -> Result<U256, ContractError> {
        self.call_uint("mintPrice", &[]).await
    }

    async fn max_mint_per_address(&self) -> Result<U256, ContractError> {
        self.call_uint("maxMintPerAddress", &[]).await
    }

    async fn mint_active(&self) -> Result<bool, ContractError> {
        self.call("mintActive", &[])
            .await?
            .into_bool()
            .ok_or_else(|| ContractError::UnexpectedOutput("mintActive".to_owned()))
    }

    async fn balance_of(&self, owner: &WalletAddress) -> Result<U256, ContractError> {
        let owner = parse_address(&owner.0)?;
        self.call_uint("balanceOf", &[Token::Address(owner)]).await
    }

    async fn minted_by_address(&self, owner: &WalletAddress) -> Result<U256, ContractError> {
        let owner = parse_address(&owner.0)?;
        self.call_uint("mintedByAddress", &[Token::Address(owner)]).await
    }

    async fn current_token_id(&self) -> Result<U256, ContractError> {
        self.call_uint("getCurrentTokenId", &[]).await
    }

    async fn remaining_supply(&self) -> Result<U256, ContractError> {
        self.call_uint("getRemainingSupply", &[]).await
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, ContractError> {
        self.call_string("tokenURI", &[Token::Uint(token_id)]).await
    }

    async fn owner_of(&self, token_id: U256) -> Result<WalletAddress, ContractError> {
        let owner = self
            .call("ownerOf", &[Token::Uint(token_id)])
            .await?
            .into_address()
            .ok_or_else(|| ContractError::UnexpectedOutput("ownerOf".to_owned()))?;
        Ok(WalletAddress(to_checksum(&owner, None)))
    }

    async fn native_balance(&self, owner: &WalletAddress) -> Result<U256, ContractError> {
        let owner = parse_address(&owner.0)?;
        self.rpc("eth_getBalance", json!([owner, "latest"])).await
    }

    async fn mint(&self, to: &WalletAddress, uri: &str) -> Result<TxHash, ContractError> {
        let to = parse_address(&to.0)?;
        let data = self
            .function("mint")?
            .encode_input(&[Token::Address(to), Token::String(uri.to_owned())])
            .map_err(|err| ContractError::Abi(err.to_string()))?;

        let tx = json!({
            "from": self.from,
            "to": self.address,
            "data": Bytes::from(data),
        });

        let hash: TxHash = self.rpc("eth_sendTransaction", json!([tx])).await?;
        info!(tx = ?hash, "mint transaction sent");
        Ok(hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<MintReceipt, ContractError> {
        loop {
            let receipt: Option<ReceiptResponse> = self
                .rpc("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;

            if let Some(receipt) = receipt {
                if receipt.status == Some(U64::zero()) {
                    return Err(ContractError::Reverted(tx_hash));
                }
                let block_number = receipt.block_number.map(|n| n.as_u64());
                info!(tx = ?tx_hash, ?block_number, "mint transaction confirmed");
                return Ok(MintReceipt {
                    tx_hash,
                    block_number,
                });
            }

            self.delay.delay(self.poll_interval).await;
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, ContractError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| ContractError::InvalidAddress(raw.to_owned()))
}
