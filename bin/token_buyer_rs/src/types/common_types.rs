use ethers::types::{Address, H160, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: H160,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub pair_address: Address,
    pub token_reserve: U256,
    pub native_reserve: U256,
    /// native units per whole token
    pub token_native_price: f64,
}
