use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::anyhow;
use ethers::{
    contract::EthEvent,
    providers::{Http, Middleware, Provider},
    types::{Address, Filter, Log},
};
use provider_utils::{enums::ENetwork, ws_providers::WsProviders};
use token_buyer_utils::abi::MintFilter;
use tokio::{
    sync::{broadcast::error::RecvError, Notify},
    time::timeout,
};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::routers::PancakeRouterService;

use super::{InputSource, InputValidator};

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Last pair lookup: the form's token and its pool, `None` while the factory
/// has no pair for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchedPair {
    pub token: Address,
    pub pair: Option<Address>,
}

/// Listens for `Mint` logs and wakes the monitor when liquidity lands in the
/// pool of the token currently in the form. Purely an accelerator: the monitor
/// still validates and triggers on its own schedule.
pub struct LiquidityWatcher<I, M = Provider<Http>> {
    network: ENetwork,
    ws_url: Option<Url>,
    input: I,
    router_service: PancakeRouterService<M>,
    wake_signal: Arc<Notify>,
    exit: Arc<AtomicBool>,
}

impl<I, M> LiquidityWatcher<I, M>
where
    I: InputSource,
    M: Middleware + 'static,
{
    pub fn new(
        network: ENetwork,
        ws_url: Option<Url>,
        input: I,
        router_service: PancakeRouterService<M>,
        wake_signal: Arc<Notify>,
        exit: Arc<AtomicBool>,
    ) -> Self {
        Self {
            network,
            ws_url,
            input,
            router_service,
            wake_signal,
            exit,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mint_filter = Filter::new().topic0(MintFilter::signature());
        let mut receiver =
            WsProviders::subscribe_logs_stream(&self.network, self.ws_url.as_ref(), mint_filter)
                .await?;
        log::info!("[LiquidityWatcher] listening for Mint logs on {}", self.network);

        let mut watched: Option<WatchedPair> = None;
        loop {
            if cancel.is_cancelled() || self.exit.load(Ordering::Relaxed) {
                return Ok(());
            }

            let Ok(next_value) = timeout(RECV_TIMEOUT, receiver.recv()).await else {
                continue;
            };
            let log = match next_value {
                Ok(log) => log,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("[LiquidityWatcher] lagged, skipped {} logs", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    return Err(anyhow!("[LiquidityWatcher] log stream closed"));
                }
            };

            if self.is_watched_pair(&mut watched, &log).await {
                log::info!(
                    "[LiquidityWatcher] liquidity added to {:?} in tx {:?}",
                    log.address,
                    log.transaction_hash
                );
                self.wake_signal.notify_one();
            }
        }
    }

    /// Whether `log` was emitted by the factory pair of the form's token and
    /// wrapped native. The pair is resolved lazily and again whenever the
    /// token changes; an unresolved pair is looked up on every Mint log until
    /// it exists.
    pub async fn is_watched_pair(&self, watched: &mut Option<WatchedPair>, log: &Log) -> bool {
        let form = self.input.snapshot();
        let Ok(token) = InputValidator::parse_token_address(&form.token_address) else {
            return false;
        };

        let needs_lookup = match watched {
            Some(current) => current.token != token || current.pair.is_none(),
            None => true,
        };
        if needs_lookup {
            let pair = match self.router_service.pair_address(token).await {
                Ok(pair) => pair,
                Err(err) => {
                    log::warn!("[LiquidityWatcher] pair lookup failed: {:?}", err);
                    None
                }
            };
            *watched = Some(WatchedPair { token, pair });
        }

        matches!(watched, Some(WatchedPair { pair: Some(pair), .. }) if *pair == log.address)
    }
}
