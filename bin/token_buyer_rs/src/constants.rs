use std::{
    str::FromStr,
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use anyhow::anyhow;
use ethers::types::{Address, U256, U64};
use rust_decimal::Decimal;
use token_buyer_utils::{
    constants::{PANCAKE_ROUTERS, WRAPPED_NATIVE_TOKENS, ZERO_ADDRESS},
    env::{get_env, get_env_parsed, get_optional_env, get_optional_env_parsed},
    utils::{gwei_to_wei, to_native_minor_units},
};
use provider_utils::{enums::ENetwork, networks::network_config};
use url::Url;

pub const LOG_TARGETS: [&str; 3] = ["token_buyer_rs", "token_buyer_utils", "provider_utils"];

pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 100_000;
pub const DEFAULT_SWAP_DEADLINE_SECS: u64 = 600;
pub const DEFAULT_SWAP_GAS_PRICE_GWEI: &str = "10";
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 500_000;
pub const DEFAULT_CONFIRMATION_POLL_MS: u64 = 3_000;
pub const DEFAULT_SEED_NATIVE_AMOUNT: &str = "0.01";
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

/// Deployment settings, read once per process. Purchase inputs are not part of
/// it: they are snapshotted from the form at every monitor tick.
#[derive(Debug, Clone)]
pub struct Env {
    pub listen_network: ENetwork,
    pub chain_id: U64,
    pub native_symbol: String,
    pub rpc_url: Option<Url>,
    pub ws_url: Option<Url>,
    pub router_address: Address,
    pub wrapped_native_address: Address,
    pub monitor_interval: Duration,
    pub swap_deadline_secs: u64,
    pub swap_gas_price: U256,
    pub swap_gas_limit: U256,
    pub amount_out_min: U256,
    pub confirmation_poll: Duration,
    pub seed_native_amount: U256,
    pub wallet_rpc_url: Url,
    pub liquidity_events_enabled: bool,
    pub exit: Arc<AtomicBool>,
}

impl Env {
    pub fn new() -> anyhow::Result<Self> {
        let network_str = get_env("LISTEN_NETWORK", Some("BSC_TESTNET"))?;
        let listen_network = ENetwork::from_str(&network_str)
            .map_err(|_| anyhow!("LISTEN_NETWORK {:?} invalid", network_str))?;
        let network_config = network_config(&listen_network)?;

        let router_address = match get_optional_env_parsed::<Address>("ROUTER_ADDRESS")? {
            Some(address) => address,
            None => *PANCAKE_ROUTERS
                .get(&listen_network)
                .ok_or_else(|| anyhow!("PANCAKE_ROUTERS not found in {:?}", listen_network))?,
        };
        if router_address == ZERO_ADDRESS {
            return Err(anyhow!("router not supported in {:?}", listen_network));
        }

        let wrapped_native_address =
            match get_optional_env_parsed::<Address>("WRAPPED_NATIVE_ADDRESS")? {
                Some(address) => address,
                None => *WRAPPED_NATIVE_TOKENS.get(&listen_network).ok_or_else(|| {
                    anyhow!("WRAPPED_NATIVE_TOKENS not found in {:?}", listen_network)
                })?,
            };

        let gas_price_gwei: Decimal =
            get_env_parsed("SWAP_GAS_PRICE_GWEI", Some(DEFAULT_SWAP_GAS_PRICE_GWEI))?;
        let swap_gas_price = gwei_to_wei(gas_price_gwei)
            .ok_or_else(|| anyhow!("SWAP_GAS_PRICE_GWEI {} invalid", gas_price_gwei))?;

        let amount_out_min = match get_optional_env("AMOUNT_OUT_MIN") {
            Some(value) => U256::from_dec_str(&value)
                .map_err(|err| anyhow!("AMOUNT_OUT_MIN {:?} invalid: {}", value, err))?,
            None => U256::zero(),
        };

        let seed_native: Decimal =
            get_env_parsed("SEED_NATIVE_AMOUNT", Some(DEFAULT_SEED_NATIVE_AMOUNT))?;
        let seed_native_amount = to_native_minor_units(seed_native)
            .ok_or_else(|| anyhow!("SEED_NATIVE_AMOUNT {} invalid", seed_native))?;

        Ok(Self {
            listen_network,
            chain_id: U64::from(network_config.chain_id),
            native_symbol: network_config.native_symbol.clone(),
            rpc_url: get_optional_env_parsed("RPC_URL")?,
            ws_url: get_optional_env_parsed("WS_URL")?,
            router_address,
            wrapped_native_address,
            monitor_interval: Duration::from_millis(get_env_parsed(
                "MONITOR_INTERVAL_MS",
                Some(&DEFAULT_MONITOR_INTERVAL_MS.to_string()),
            )?),
            swap_deadline_secs: get_env_parsed(
                "SWAP_DEADLINE_SECS",
                Some(&DEFAULT_SWAP_DEADLINE_SECS.to_string()),
            )?,
            swap_gas_price,
            swap_gas_limit: U256::from(get_env_parsed::<u64>(
                "SWAP_GAS_LIMIT",
                Some(&DEFAULT_SWAP_GAS_LIMIT.to_string()),
            )?),
            amount_out_min,
            confirmation_poll: Duration::from_millis(get_env_parsed(
                "CONFIRMATION_POLL_MS",
                Some(&DEFAULT_CONFIRMATION_POLL_MS.to_string()),
            )?),
            seed_native_amount,
            wallet_rpc_url: get_env_parsed("WALLET_RPC_URL", Some(DEFAULT_WALLET_RPC_URL))?,
            liquidity_events_enabled: get_env_parsed("LIQUIDITY_EVENTS_ENABLED", Some("false"))?,
            exit: Arc::new(AtomicBool::new(false)),
        })
    }
}
