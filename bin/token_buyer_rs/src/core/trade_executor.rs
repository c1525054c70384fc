use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256, U64},
};
use token_buyer_utils::{
    clock::{Clock, SystemClock},
    utils::{deadline_after, format_lower_hex},
};

use crate::{
    constants::Env,
    routers::PancakeRouterService,
    types::{BatchReport, IterationOutcome, IterationStatus, SwapIteration, TradePath},
};

use super::TransactionSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub gas_price: U256,
    pub deadline_secs: u64,
    /// Zero disables the slippage floor.
    pub amount_out_min: U256,
}

impl ExecutorConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            gas_price: env.swap_gas_price,
            deadline_secs: env.swap_deadline_secs,
            amount_out_min: env.amount_out_min,
        }
    }
}

/// Sells `token_amount` of the path's token for native currency, `number_of_buys`
/// times, one transaction at a time.
pub struct TradeExecutor<S, C = SystemClock, M = Provider<Http>> {
    sender: S,
    router_service: PancakeRouterService<M>,
    path: TradePath,
    config: ExecutorConfig,
    clock: C,
}

impl<S: TransactionSender, M: Middleware + 'static> TradeExecutor<S, SystemClock, M> {
    pub fn new(
        sender: S,
        router_service: PancakeRouterService<M>,
        path: TradePath,
        config: ExecutorConfig,
    ) -> Self {
        Self::with_clock(sender, router_service, path, config, SystemClock)
    }
}

impl<S, C, M> TradeExecutor<S, C, M>
where
    S: TransactionSender,
    C: Clock,
    M: Middleware + 'static,
{
    pub fn with_clock(
        sender: S,
        router_service: PancakeRouterService<M>,
        path: TradePath,
        config: ExecutorConfig,
        clock: C,
    ) -> Self {
        Self {
            sender,
            router_service,
            path,
            config,
            clock,
        }
    }

    /// Iteration i+1 is only built once iteration i is confirmed or has
    /// failed. A failed iteration is recorded and the batch carries on; there
    /// is no retry.
    pub async fn execute(&self, token_amount: U256, number_of_buys: u32) -> BatchReport {
        let mut report = BatchReport {
            token_amount,
            outcomes: Vec::with_capacity(number_of_buys as usize),
        };
        if number_of_buys == 0 {
            log::warn!("[TradeExecutor] number_of_buys = 0, nothing to execute");
            return report;
        }

        let recipient = self.sender.address();
        for index in 0..number_of_buys {
            let iteration = self.next_iteration(index, token_amount);
            let outcome = self
                .run_iteration(&iteration, number_of_buys, recipient)
                .await;
            report.outcomes.push(outcome);
        }

        log::info!(
            "[TradeExecutor] batch done, wallet {:?} confirmed {}/{} failed {}",
            recipient,
            report.confirmed_count(),
            number_of_buys,
            report.failed_count()
        );
        report
    }

    fn next_iteration(&self, index: u32, token_amount: U256) -> SwapIteration {
        SwapIteration {
            index,
            amount_in: token_amount,
            amount_out_min: self.config.amount_out_min,
            // read the clock per iteration, confirmations can take minutes
            deadline: deadline_after(self.clock.now_timestamp(), self.config.deadline_secs),
            gas_price: self.config.gas_price,
        }
    }

    async fn run_iteration(
        &self,
        iteration: &SwapIteration,
        number_of_buys: u32,
        recipient: Address,
    ) -> IterationOutcome {
        let mut outcome = IterationOutcome::new(iteration);
        let position = iteration.index + 1;
        let swap_tx = self
            .router_service
            .swap_tokens_for_native_tx(iteration, &self.path, recipient);

        let tx_hash = match self.sender.send_transaction(swap_tx).await {
            Ok(tx_hash) => tx_hash,
            Err(err) => {
                log::error!(
                    "[TradeExecutor] iteration {}/{} submission failed: {:?}",
                    position,
                    number_of_buys,
                    err
                );
                outcome.fail(err);
                return outcome;
            }
        };
        outcome.tx_hash = Some(tx_hash);
        log::info!(
            "[TradeExecutor] iteration {}/{} submitted {}, waiting for confirmation",
            position,
            number_of_buys,
            format_lower_hex(&tx_hash)
        );

        match self.sender.wait_for_receipt(tx_hash).await {
            Ok(tx_receipt) => {
                outcome.block_number = tx_receipt.block_number;
                if tx_receipt.status == Some(U64::zero()) {
                    log::error!(
                        "[TradeExecutor] iteration {}/{} reverted {}",
                        position,
                        number_of_buys,
                        format_lower_hex(&tx_hash)
                    );
                    outcome.fail("transaction reverted");
                } else {
                    log::info!(
                        "[TradeExecutor] iteration {}/{} confirmed {} in block {:?}",
                        position,
                        number_of_buys,
                        format_lower_hex(&tx_hash),
                        tx_receipt.block_number
                    );
                    outcome.status = IterationStatus::Confirmed;
                }
            }
            Err(err) => {
                log::error!(
                    "[TradeExecutor] iteration {}/{} confirmation failed: {:?}",
                    position,
                    number_of_buys,
                    err
                );
                outcome.fail(err);
            }
        }

        outcome
    }
}
