use anyhow::anyhow;
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256, U64},
};
use token_buyer_utils::utils::format_lower_hex;

use crate::{
    routers::PancakeRouterService,
    types::{BatchReport, PurchaseRequest},
};

use super::{
    ChainConnector, ExecutorConfig, KeySignerSource, NotificationService, PurchaseTrigger,
    TradeExecutor, TransactionSender,
};

/// Production purchase path: key signer from the request, router allowance
/// for the whole batch, then the sequential swaps.
#[derive(Debug, Clone)]
pub struct PurchaseService<K = ChainConnector, M = Provider<Http>> {
    signer_source: K,
    router_service: PancakeRouterService<M>,
    executor_config: ExecutorConfig,
    notification_service: NotificationService,
}

impl<K, M> PurchaseService<K, M>
where
    K: KeySignerSource,
    M: Middleware + 'static,
{
    pub fn new(
        signer_source: K,
        router_service: PancakeRouterService<M>,
        executor_config: ExecutorConfig,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            signer_source,
            router_service,
            executor_config,
            notification_service,
        }
    }

    async fn log_price_estimate(&self, token_address: Address) {
        let token_info = match self.router_service.token_info(token_address).await {
            Ok(token_info) => token_info,
            Err(err) => {
                log::warn!("[PurchaseService] token info unavailable: {:?}", err);
                return;
            }
        };

        match self.router_service.token_native_price(&token_info).await {
            Ok(Some(estimate)) => log::info!(
                "[PurchaseService] {} pair {:?} price {} native per token",
                token_info.symbol,
                estimate.pair_address,
                estimate.token_native_price
            ),
            Ok(None) => log::warn!(
                "[PurchaseService] no liquidity for {} yet, swaps may revert",
                token_info.symbol
            ),
            Err(err) => log::warn!("[PurchaseService] price estimate failed: {:?}", err),
        }
    }

    /// Approves the router for the maximum amount once the current allowance
    /// no longer covers `required`.
    async fn ensure_allowance<S: TransactionSender>(
        &self,
        sender: &S,
        token_address: Address,
        required: U256,
    ) -> anyhow::Result<()> {
        let owner = sender.address();
        let allowance = self
            .router_service
            .router_allowance(token_address, owner)
            .await?;
        if allowance >= required {
            return Ok(());
        }

        log::info!(
            "[PurchaseService] allowance {} below {}, approving router",
            allowance,
            required
        );
        let approve_tx = self
            .router_service
            .approve_router_tx(token_address, owner, U256::MAX);
        let tx_hash = sender.send_transaction(approve_tx).await?;
        let tx_receipt = sender.wait_for_receipt(tx_hash).await?;
        if tx_receipt.status == Some(U64::zero()) {
            return Err(anyhow!("approve {} reverted", format_lower_hex(&tx_hash)));
        }

        Ok(())
    }

    async fn notify(&self, request: &PurchaseRequest, wallet: Address, report: &BatchReport) {
        log::debug!(
            "[PurchaseService] report {}",
            serde_json::to_string(report).unwrap_or_default()
        );
        if !self.notification_service.is_enabled() {
            return;
        }

        self.notification_service
            .send_message(batch_message(request, wallet, report))
            .await;
    }
}

/// Telegram summary of one batch.
pub fn batch_message(request: &PurchaseRequest, wallet: Address, report: &BatchReport) -> String {
    format!(
        "Token buyer: {} of {} swaps confirmed\nToken: {:?}\nWallet: {:?}\n{}",
        report.confirmed_count(),
        request.number_of_buys,
        request.token_address,
        wallet,
        report.outcome_lines()
    )
}

#[async_trait]
impl<K, M> PurchaseTrigger for PurchaseService<K, M>
where
    K: KeySignerSource,
    M: Middleware + 'static,
{
    async fn execute_purchase(
        &self,
        request: PurchaseRequest,
        token_amount: U256,
    ) -> anyhow::Result<BatchReport> {
        let signer = self.signer_source.key_signer(&request.secret)?;
        let wallet = signer.address();
        log::info!(
            "[PurchaseService] wallet {:?} buying with {} x{}",
            wallet,
            token_amount,
            request.number_of_buys
        );

        self.log_price_estimate(request.token_address).await;

        let total_amount = token_amount
            .checked_mul(U256::from(request.number_of_buys))
            .ok_or_else(|| anyhow!("batch amount overflows"))?;
        self.ensure_allowance(&signer, request.token_address, total_amount)
            .await?;

        let executor = TradeExecutor::new(
            signer,
            self.router_service.clone(),
            self.router_service.trade_path(request.token_address),
            self.executor_config.clone(),
        );
        let report = executor
            .execute(token_amount, request.number_of_buys)
            .await;

        self.notify(&request, wallet, &report).await;
        Ok(report)
    }
}
