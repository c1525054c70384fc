use bigdecimal::BigDecimal;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, Address, U256},
};
use std::{str::FromStr, sync::Arc};
use token_buyer_utils::{
    abi::{Erc20Abigen, PancakeFactoryAbigen, PancakeRouterAbigen},
    constants::{NATIVE_DECIMALS, ZERO_ADDRESS},
    utils::to_legacy_tx,
};

use crate::{
    constants::Env,
    types::{PriceEstimate, SwapIteration, TokenInfo, TradePath},
};

/// Calldata builders and read calls against the router, its factory and the
/// tokens it trades. Reads go through `client`.
#[derive(Debug)]
pub struct PancakeRouterService<M = Provider<Http>> {
    client: Arc<M>,
    router_address: Address,
    wrapped_native_address: Address,
    swap_gas_limit: U256,
}

impl<M> Clone for PancakeRouterService<M> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            router_address: self.router_address,
            wrapped_native_address: self.wrapped_native_address,
            swap_gas_limit: self.swap_gas_limit,
        }
    }
}

impl<M: Middleware + 'static> PancakeRouterService<M> {
    pub fn new(
        client: Arc<M>,
        router_address: Address,
        wrapped_native_address: Address,
        swap_gas_limit: U256,
    ) -> Self {
        Self {
            client,
            router_address,
            wrapped_native_address,
            swap_gas_limit,
        }
    }

    pub fn from_env(env: &Env, client: Arc<M>) -> Self {
        Self::new(
            client,
            env.router_address,
            env.wrapped_native_address,
            env.swap_gas_limit,
        )
    }

    pub fn router_address(&self) -> Address {
        self.router_address
    }

    pub fn trade_path(&self, token_address: Address) -> TradePath {
        TradePath::new(token_address, self.wrapped_native_address)
    }

    /// Unsigned fee-on-transfer aware token -> native swap. Nonce and chain id
    /// are left to the signer.
    pub fn swap_tokens_for_native_tx(
        &self,
        iteration: &SwapIteration,
        path: &TradePath,
        recipient: Address,
    ) -> TypedTransaction {
        let router = PancakeRouterAbigen::new(self.router_address, self.client.clone());

        let mut swap_tx = to_legacy_tx(
            router
                .swap_exact_tokens_for_eth_supporting_fee_on_transfer_tokens(
                    iteration.amount_in,
                    iteration.amount_out_min,
                    path.to_vec(),
                    recipient,
                    iteration.deadline,
                )
                .tx,
        );
        swap_tx.set_from(recipient);
        swap_tx.set_gas(self.swap_gas_limit); // fixed gas
        swap_tx.set_gas_price(iteration.gas_price);

        swap_tx
    }

    /// Zero minimum on both sides. Gas is left for the wallet to estimate,
    /// the first deposit may also deploy the pair.
    pub fn add_liquidity_native_tx(
        &self,
        token_address: Address,
        token_amount: U256,
        native_amount: U256,
        recipient: Address,
        deadline: U256,
    ) -> TypedTransaction {
        let router = PancakeRouterAbigen::new(self.router_address, self.client.clone());

        let mut add_liquidity_tx = to_legacy_tx(
            router
                .add_liquidity_eth(
                    token_address,
                    token_amount,
                    U256::zero(),
                    U256::zero(),
                    recipient,
                    deadline,
                )
                .tx,
        );
        add_liquidity_tx.set_from(recipient);
        add_liquidity_tx.set_value(native_amount);

        add_liquidity_tx
    }

    pub fn approve_router_tx(
        &self,
        token_address: Address,
        owner: Address,
        amount: U256,
    ) -> TypedTransaction {
        let token = Erc20Abigen::new(token_address, self.client.clone());

        let mut approve_tx = to_legacy_tx(token.approve(self.router_address, amount).tx);
        approve_tx.set_from(owner);

        approve_tx
    }

    pub async fn router_allowance(
        &self,
        token_address: Address,
        owner: Address,
    ) -> anyhow::Result<U256> {
        let token = Erc20Abigen::new(token_address, self.client.clone());
        Ok(token.allowance(owner, self.router_address).call().await?)
    }

    pub async fn token_info(&self, token_address: Address) -> anyhow::Result<TokenInfo> {
        let token = Erc20Abigen::new(token_address, self.client.clone());
        let (symbol, decimals) = (token.symbol(), token.decimals());
        let (symbol, decimals) = tokio::join!(symbol.call(), decimals.call());

        Ok(TokenInfo {
            address: token_address,
            symbol: symbol?,
            decimals: decimals?,
        })
    }

    pub async fn pair_address(&self, token_address: Address) -> anyhow::Result<Option<Address>> {
        let router = PancakeRouterAbigen::new(self.router_address, self.client.clone());
        let factory_address: Address = router.factory().call().await?;
        let factory = PancakeFactoryAbigen::new(factory_address, self.client.clone());
        let pair_address: Address = factory
            .get_pair(token_address, self.wrapped_native_address)
            .call()
            .await?;

        if pair_address == ZERO_ADDRESS {
            return Ok(None);
        }
        Ok(Some(pair_address))
    }

    /// Reads both reserves as ERC20 balances held by the pair. `None` while the
    /// pair does not exist or holds no tokens.
    pub async fn token_native_price(
        &self,
        token_info: &TokenInfo,
    ) -> anyhow::Result<Option<PriceEstimate>> {
        let Some(pair_address) = self.pair_address(token_info.address).await? else {
            return Ok(None);
        };

        let token = Erc20Abigen::new(token_info.address, self.client.clone());
        let wrapped_native =
            Erc20Abigen::new(self.wrapped_native_address, self.client.clone());
        let (token_reserve, native_reserve) = (
            token.balance_of(pair_address),
            wrapped_native.balance_of(pair_address),
        );
        let (token_reserve, native_reserve) =
            tokio::join!(token_reserve.call(), native_reserve.call());
        let (token_reserve, native_reserve) = (token_reserve?, native_reserve?);

        if token_reserve.is_zero() {
            return Ok(None);
        }

        Ok(Some(PriceEstimate {
            pair_address,
            token_reserve,
            native_reserve,
            token_native_price: reserve_ratio(
                token_reserve,
                token_info.decimals as u32,
                native_reserve,
                NATIVE_DECIMALS,
            )?,
        }))
    }
}

pub fn reserve_ratio(
    token_reserve: U256,
    token_decimals: u32,
    native_reserve: U256,
    native_decimals: u32,
) -> anyhow::Result<f64> {
    let token_amount = BigDecimal::from_str(&format!("{}e-{}", token_reserve, token_decimals))?;
    let native_amount = BigDecimal::from_str(&format!("{}e-{}", native_reserve, native_decimals))?;

    Ok((native_amount / token_amount)
        .round(18)
        .to_string()
        .parse::<f64>()?)
}

#[cfg(test)]
mod tests {
    use ethers::abi::AbiParser;
    use token_buyer_utils::constants::APPROVE_SIG;

    use super::*;

    fn offline_service() -> PancakeRouterService {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap();
        PancakeRouterService::new(
            Arc::new(provider),
            Address::from_low_u64_be(0x10),
            Address::from_low_u64_be(0x20),
            U256::from(500_000u64),
        )
    }

    #[test]
    fn approve_targets_the_token_and_names_the_router() {
        let service = offline_service();
        let token = Address::from_low_u64_be(0x30);
        let owner = Address::from_low_u64_be(0x40);
        let approve_tx = service.approve_router_tx(token, owner, U256::MAX);

        assert_eq!(approve_tx.to_addr(), Some(&token));
        assert_eq!(approve_tx.from(), Some(&owner));
        assert!(matches!(approve_tx, TypedTransaction::Legacy(_)));

        let function = AbiParser::default().parse_function(APPROVE_SIG).unwrap();
        let data = approve_tx.data().unwrap();
        let inputs = function.decode_input(&data[4..]).unwrap();
        assert_eq!(inputs[0].clone().into_address(), Some(service.router_address()));
        assert_eq!(inputs[1].clone().into_uint(), Some(U256::MAX));
    }

    #[test]
    fn trade_path_ends_in_wrapped_native() {
        let service = offline_service();
        let token = Address::from_low_u64_be(0x30);
        assert_eq!(
            service.trade_path(token).to_vec(),
            vec![token, Address::from_low_u64_be(0x20)]
        );
    }

    #[test]
    fn ratio_accounts_for_decimals() {
        // 1_000 tokens (9 decimals) against 2 native
        let price = reserve_ratio(
            U256::from(1_000_000_000_000u64),
            9,
            U256::from(2_000_000_000_000_000_000u64),
            18,
        )
        .unwrap();
        assert!((price - 0.002).abs() < 1e-12);
    }
}
