use std::{str::FromStr, sync::Arc, time::Duration};

use ethers::{
    providers::{Http, Provider},
    signers::LocalWallet,
    types::U64,
};
use provider_utils::http_providers::HttpProviders;
use url::Url;

use crate::constants::Env;

use super::{InteractiveSigner, KeySigner, KeySignerSource, TxError, TxSigner};

/// Read connection to the chain plus the two ways of obtaining a signer.
#[derive(Debug, Clone)]
pub struct ChainConnector {
    chain_id: U64,
    http_provider: Arc<Provider<Http>>,
    wallet_rpc_url: Url,
    confirmation_poll: Duration,
}

impl ChainConnector {
    pub fn new(
        http_provider: Arc<Provider<Http>>,
        chain_id: U64,
        wallet_rpc_url: Url,
        confirmation_poll: Duration,
    ) -> Self {
        Self {
            chain_id,
            http_provider,
            wallet_rpc_url,
            confirmation_poll,
        }
    }

    /// Builds the read connection without touching the network; an endpoint
    /// that is down surfaces on the first submission instead.
    pub fn from_env(env: &Env) -> anyhow::Result<Self> {
        let http_provider =
            HttpProviders::get_first_provider(&env.listen_network, env.rpc_url.as_ref())?
                .interval(env.confirmation_poll);

        Ok(Self::new(
            Arc::new(http_provider),
            env.chain_id,
            env.wallet_rpc_url.clone(),
            env.confirmation_poll,
        ))
    }

    /// Tries the configured endpoints in order and keeps the first one that
    /// answers `eth_blockNumber`.
    pub async fn connect_healthy(env: &Env) -> anyhow::Result<Self> {
        let http_provider =
            HttpProviders::get_healthy_provider(&env.listen_network, env.rpc_url.as_ref())
                .await?
                .interval(env.confirmation_poll);

        Ok(Self::new(
            Arc::new(http_provider),
            env.chain_id,
            env.wallet_rpc_url.clone(),
            env.confirmation_poll,
        ))
    }

    pub fn http_provider(&self) -> Arc<Provider<Http>> {
        self.http_provider.clone()
    }

    pub fn chain_id(&self) -> U64 {
        self.chain_id
    }

    pub async fn interactive_signer(&self) -> Result<TxSigner, TxError> {
        let wallet_provider = Provider::new(Http::new(self.wallet_rpc_url.clone()));
        let signer = InteractiveSigner::connect(
            wallet_provider,
            self.http_provider.clone(),
            self.confirmation_poll,
        )
        .await?;

        Ok(TxSigner::Interactive(signer))
    }
}

impl KeySignerSource for ChainConnector {
    type Sender = TxSigner;

    fn key_signer(&self, secret: &str) -> Result<TxSigner, TxError> {
        let secret = secret.trim();
        let secret = secret
            .strip_prefix("0x")
            .or_else(|| secret.strip_prefix("0X"))
            .unwrap_or(secret);
        // the wallet error may echo the input, keep it out of the logs
        let wallet = LocalWallet::from_str(secret)
            .map_err(|_| TxError::InvalidSecret("not a valid secp256k1 key".to_string()))?;

        Ok(TxSigner::Key(KeySigner::new(
            wallet,
            self.chain_id,
            self.http_provider.clone(),
            self.confirmation_poll,
        )))
    }
}
