use anyhow::anyhow;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, TransactionReceipt, U256, U64},
};
use token_buyer_utils::{
    clock::{Clock, SystemClock},
    utils::{deadline_after, format_lower_hex},
};

use crate::routers::PancakeRouterService;

use super::TransactionSender;

pub const SEED_DEADLINE_SECS: u64 = 600;

/// One-shot deposit of token + native liquidity into the router's pool.
pub struct LiquiditySeeder<S, C = SystemClock, M = Provider<Http>> {
    sender: S,
    router_service: PancakeRouterService<M>,
    native_amount: U256,
    clock: C,
}

impl<S: TransactionSender, M: Middleware + 'static> LiquiditySeeder<S, SystemClock, M> {
    pub fn new(sender: S, router_service: PancakeRouterService<M>, native_amount: U256) -> Self {
        Self::with_clock(sender, router_service, native_amount, SystemClock)
    }
}

impl<S, C, M> LiquiditySeeder<S, C, M>
where
    S: TransactionSender,
    C: Clock,
    M: Middleware + 'static,
{
    pub fn with_clock(
        sender: S,
        router_service: PancakeRouterService<M>,
        native_amount: U256,
        clock: C,
    ) -> Self {
        Self {
            sender,
            router_service,
            native_amount,
            clock,
        }
    }

    pub async fn seed(
        &self,
        token_address: Address,
        token_amount: U256,
    ) -> anyhow::Result<TransactionReceipt> {
        if token_amount.is_zero() {
            return Err(anyhow!("token amount must be positive"));
        }
        self.approve_if_needed(token_address, token_amount).await?;
        self.add_liquidity(token_address, token_amount).await
    }

    /// Returns the approval receipt, or `None` when the router may already
    /// spend `token_amount`.
    pub async fn approve_if_needed(
        &self,
        token_address: Address,
        token_amount: U256,
    ) -> anyhow::Result<Option<TransactionReceipt>> {
        let owner = self.sender.address();
        let allowance = self
            .router_service
            .router_allowance(token_address, owner)
            .await?;
        if allowance >= token_amount {
            log::info!(
                "[LiquiditySeeder] allowance {} already covers {}",
                allowance,
                token_amount
            );
            return Ok(None);
        }

        let approve_tx = self
            .router_service
            .approve_router_tx(token_address, owner, token_amount);
        let tx_hash = self.sender.send_transaction(approve_tx).await?;
        log::info!(
            "[LiquiditySeeder] approve sent {}",
            format_lower_hex(&tx_hash)
        );

        let tx_receipt = self.sender.wait_for_receipt(tx_hash).await?;
        if tx_receipt.status == Some(U64::zero()) {
            return Err(anyhow!("approve {} reverted", format_lower_hex(&tx_hash)));
        }
        Ok(Some(tx_receipt))
    }

    pub async fn add_liquidity(
        &self,
        token_address: Address,
        token_amount: U256,
    ) -> anyhow::Result<TransactionReceipt> {
        let recipient = self.sender.address();
        let deadline = deadline_after(self.clock.now_timestamp(), SEED_DEADLINE_SECS);
        let add_liquidity_tx = self.router_service.add_liquidity_native_tx(
            token_address,
            token_amount,
            self.native_amount,
            recipient,
            deadline,
        );

        let tx_hash = self.sender.send_transaction(add_liquidity_tx).await?;
        log::info!(
            "[LiquiditySeeder] add liquidity sent {}, token {} native {}",
            format_lower_hex(&tx_hash),
            token_amount,
            self.native_amount
        );

        let tx_receipt = self.sender.wait_for_receipt(tx_hash).await?;
        if tx_receipt.status == Some(U64::zero()) {
            return Err(anyhow!(
                "add liquidity {} reverted",
                format_lower_hex(&tx_hash)
            ));
        }
        log::info!(
            "[LiquiditySeeder] Add Liquidity confirmed in block {:?}",
            tx_receipt.block_number
        );
        Ok(tx_receipt)
    }
}
