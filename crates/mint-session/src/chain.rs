use mint_provider::WalletProvider;
use mint_types::NetworkConfig;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::SessionError;

/// Make sure the wallet is on `network`, switching (or adding, when the
/// wallet does not know the chain) if needed.
///
/// Already being on the right chain costs exactly one `eth_chainId` read.
pub async fn enforce_chain(
    provider: &dyn WalletProvider,
    network: &NetworkConfig,
) -> Result<(), SessionError> {
    let target = network.chain_id;
    let current = read_chain_id(provider).await?;
    if current == target {
        debug!(chain_id = current, "wallet already on {}", network.name);
        return Ok(());
    }

    info!(current, target, "switching wallet to {}", network.name);
    let switch = json!([network.switch_chain_params()]);
    match provider.request("wallet_switchEthereumChain", switch).await {
        Ok(_) => debug!("wallet_switchEthereumChain accepted"),
        Err(err) if err.is_unrecognized_chain() => {
            info!("{} unknown to the wallet, adding it", network.name);
            let add = json!([network.add_chain_params()]);
            provider
                .request("wallet_addEthereumChain", add)
                .await
                .map_err(|err| SessionError::ChainEnforcementFailed(err.message))?;
        }
        Err(err) => {
            warn!(code = err.code, "wallet_switchEthereumChain failed");
            return Err(SessionError::ChainEnforcementFailed(err.message));
        }
    }

    let confirmed = read_chain_id(provider).await?;
    if confirmed != target {
        return Err(SessionError::ChainEnforcementFailed(format!(
            "wallet is on chain {confirmed}, expected {target}"
        )));
    }
    Ok(())
}

async fn read_chain_id(provider: &dyn WalletProvider) -> Result<u64, SessionError> {
    mint_provider::chain_id(provider)
        .await
        .map_err(|err| SessionError::ChainEnforcementFailed(err.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[tokio::test]
    async fn on_target_chain_is_a_single_read() {
        let provider = MockProvider::on_chain(1270);
        let network = NetworkConfig::default();

        enforce_chain(&provider, &network).await.unwrap();
        enforce_chain(&provider, &network).await.unwrap();

        assert_eq!(provider.methods(), vec!["eth_chainId", "eth_chainId"]);
    }

    #[tokio::test]
    async fn unknown_chain_is_added_with_network_params() {
        let provider = MockProvider::on_chain(1);
        provider.knows_target.set(false);
        let network = NetworkConfig::default();

        enforce_chain(&provider, &network).await.unwrap();

        assert_eq!(
            provider.methods(),
            vec![
                "eth_chainId",
                "wallet_switchEthereumChain",
                "wallet_addEthereumChain",
                "eth_chainId"
            ]
        );
        let add = provider.params_of("wallet_addEthereumChain");
        assert_eq!(add, json!([network.add_chain_params()]));
    }

    #[tokio::test]
    async fn switch_rejection_fails_enforcement() {
        let provider = MockProvider::on_chain(1);
        provider.fail_next("wallet_switchEthereumChain", 4001, "User rejected the request.");

        let err = enforce_chain(&provider, &NetworkConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::ChainEnforcementFailed(_)));
        assert_eq!(provider.count("wallet_addEthereumChain"), 0);
    }

    #[tokio::test]
    async fn wallet_that_ignores_the_switch_is_caught() {
        let provider = MockProvider::on_chain(1);
        provider.ignores_switch.set(true);

        let err = enforce_chain(&provider, &NetworkConfig::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::ChainEnforcementFailed("wallet is on chain 1, expected 1270".to_owned())
        );
    }
}
