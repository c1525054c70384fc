use std::sync::{atomic::Ordering, Arc};

use token_buyer_rs::{
    constants::{Env, LOG_TARGETS},
    core::{
        ChainConnector, EnvInputSource, ExecutorConfig, LiquidityMonitor, LiquidityWatcher,
        NotificationService, PurchaseService,
    },
    routers::PancakeRouterService,
};
use token_buyer_utils::log::setup_logger;
use tokio::{sync::Notify, task::JoinSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenv::dotenv().ok();
    setup_logger(&LOG_TARGETS, None)?;
    let env = Env::new()?;
    let exit = env.exit.clone();
    if env.amount_out_min.is_zero() {
        log::warn!("AMOUNT_OUT_MIN = 0, swaps accept any output amount");
    }

    let chain_connector = ChainConnector::from_env(&env)?;
    let router_service = PancakeRouterService::from_env(&env, chain_connector.http_provider());
    log::info!(
        "auto buy bot on {} (chain id {}), router {:?}, form read from {:?}",
        env.listen_network,
        chain_connector.chain_id(),
        env.router_address,
        env_file
    );
    let purchase_service = PurchaseService::new(
        chain_connector,
        router_service.clone(),
        ExecutorConfig::from_env(&env),
        NotificationService::from_env()?,
    );

    let input = EnvInputSource::new(env_file);
    let mut monitor = LiquidityMonitor::new(
        input.clone(),
        purchase_service,
        env.monitor_interval,
        exit.clone(),
    );
    let mut watcher = None;
    if env.liquidity_events_enabled {
        let wake_signal = Arc::new(Notify::new());
        monitor = monitor.with_wake_signal(wake_signal.clone());
        watcher = Some(LiquidityWatcher::new(
            env.listen_network,
            env.ws_url.clone(),
            input,
            router_service,
            wake_signal,
            exit.clone(),
        ));
    }

    let monitor_handle = monitor.spawn();
    let mut set = JoinSet::new();
    if let Some(watcher) = watcher {
        let cancel = monitor_handle.cancellation_token();
        set.spawn(async move {
            // the monitor keeps its own schedule without the watcher
            if let Err(err) = watcher.run(cancel).await {
                log::error!("liquidity watcher exited: {:?}", err);
            }
        });
    }

    let res = tokio::signal::ctrl_c().await;
    log::info!("shutting down, res {:?}", res);
    // gracefully shutdown
    exit.store(true, Ordering::Relaxed);
    monitor_handle.shutdown().await?;
    while let Some(res) = set.join_next().await {
        log::debug!("task exited, res {:?}", res);
    }

    Ok(())
}
