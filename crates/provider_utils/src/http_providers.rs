use anyhow::anyhow;
use ethers::providers::{Http, Middleware, Provider, ProviderError};
use url::Url;

use crate::{
    constants::{DESERIALIZATION_ERROR_MSG, DNS_LOOKUP_ERROR_MSG},
    enums::ENetwork,
    networks::network_config,
};

pub struct HttpProviders;

impl HttpProviders {
    /// An explicit `rpc_override` replaces the network table entirely.
    pub fn get_providers(
        network: &ENetwork,
        rpc_override: Option<&Url>,
    ) -> anyhow::Result<Vec<Provider<Http>>> {
        if let Some(url) = rpc_override {
            return Ok(vec![Provider::new(Http::new(url.clone()))]);
        }

        let network = network_config(network)?;
        let mut providers = Vec::new();
        for url in &network.rpc_urls {
            let provider = Provider::<Http>::try_from(url.as_str())
                .map_err(|err| anyhow!("invalid rpc url {}: {}", url, err))?;
            providers.push(provider);
        }

        Ok(providers)
    }

    pub fn get_first_provider(
        network: &ENetwork,
        rpc_override: Option<&Url>,
    ) -> anyhow::Result<Provider<Http>> {
        Self::get_providers(network, rpc_override)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no rpc url configured for {:?}", network))
    }

    pub async fn get_healthy_provider(
        network: &ENetwork,
        rpc_override: Option<&Url>,
    ) -> anyhow::Result<Provider<Http>> {
        let providers = Self::get_providers(network, rpc_override)?;

        for provider in providers {
            match provider.get_block_number().await {
                Ok(_) => {
                    return Ok(provider);
                }
                Err(err) => {
                    if is_unavailable(&err) {
                        log::info!("Provider {:?} is unavailable !!", provider.url().host());
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }

        Err(anyhow!("All providers failed to retrieve the block number"))
    }
}

pub fn is_unavailable(err: &ProviderError) -> bool {
    let err_string = err.to_string();
    err_string.contains(DNS_LOOKUP_ERROR_MSG) || err_string.contains(DESERIALIZATION_ERROR_MSG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_network_table() {
        let url = Url::parse("http://127.0.0.1:8545").unwrap();
        let providers = HttpProviders::get_providers(&ENetwork::BscTestnet, Some(&url)).unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].url().as_str(), "http://127.0.0.1:8545/");
    }

    #[test]
    fn first_provider_comes_from_table() {
        let provider = HttpProviders::get_first_provider(&ENetwork::BscTestnet, None).unwrap();
        assert_eq!(
            provider.url().host_str(),
            Some("data-seed-prebsc-1-s1.binance.org")
        );
    }
}
