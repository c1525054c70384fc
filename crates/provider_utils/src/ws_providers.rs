use cached::{Cached, TimedCache};
use ethers::{
    providers::{Middleware, Provider, Ws},
    types::{Filter, Log, H256},
};
use std::sync::Arc;
use tokio::sync::{
    broadcast::{self, Sender},
    Mutex,
};
use tokio_stream::StreamExt;
use url::Url;

use crate::{enums::ENetwork, networks::network_config};

/// Lifespan, in seconds, of the tx-hash cache that collapses duplicate logs
/// delivered by several endpoints.
const DEDUP_LIFESPAN_SECS: u64 = 180;

pub struct WsProviders;

impl WsProviders {
    pub async fn subscribe_logs_stream(
        network: &ENetwork,
        ws_override: Option<&Url>,
        filter: Filter,
    ) -> anyhow::Result<broadcast::Receiver<Log>> {
        let (event_sender, event_receiver): (Sender<Log>, _) = broadcast::channel(128);
        let ws_providers = Self::get_ws_providers(network, ws_override).await?;
        let tx_hashes_cache: Arc<Mutex<TimedCache<H256, bool>>> =
            Arc::new(Mutex::new(TimedCache::with_lifespan(DEDUP_LIFESPAN_SECS)));

        for ws_provider in ws_providers {
            let event_sender = event_sender.clone();
            let filter = filter.clone();
            let tx_hashes_cache = tx_hashes_cache.clone();

            tokio::spawn(async move {
                let mut stream = match ws_provider.subscribe_logs(&filter).await {
                    Ok(stream) => stream.fuse(),
                    Err(err) => {
                        log::error!("[WsProviders] subscribe_logs failed: {:?}", err);
                        return;
                    }
                };

                while let Some(event) = stream.next().await {
                    let Some(tx_hash) = event.transaction_hash else {
                        continue;
                    };
                    let mut tx_hashes_cache = tx_hashes_cache.lock().await;
                    if tx_hashes_cache.cache_get(&tx_hash).is_none() {
                        tx_hashes_cache.cache_set(tx_hash, true);
                        if event_sender.send(event).is_err() {
                            log::debug!("[WsProviders] no receiver left, closing stream");
                            return;
                        }
                    }
                }
            });
        }

        Ok(event_receiver)
    }

    pub async fn get_ws_providers(
        network: &ENetwork,
        ws_override: Option<&Url>,
    ) -> anyhow::Result<Vec<Provider<Ws>>> {
        let urls = match ws_override {
            Some(url) => vec![url.to_string()],
            None => network_config(network)?.ws_urls.clone(),
        };

        let mut providers = Vec::new();
        for url in urls {
            let ws = Ws::connect(url.as_str()).await?;
            providers.push(Provider::new(ws));
        }

        Ok(providers)
    }
}
