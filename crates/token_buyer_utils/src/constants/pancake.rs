use ethers::{prelude::Lazy, types::Address};
use provider_utils::enums::ENetwork;
use std::{collections::HashMap, str::FromStr};

pub static PANCAKE_ROUTERS: Lazy<HashMap<ENetwork, Address>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::BscTestnet,
            Address::from_str("0x9Ac64Cc6e4415144C455BD8E4837Fea55603e5c3").unwrap(),
        ),
        (
            ENetwork::BscMainnet,
            Address::from_str("0x10ED43C718714eb63d5aA57B78B54704E256024E").unwrap(),
        ),
    ])
});

// swapExactTokensForETHSupportingFeeOnTransferTokens(uint256,uint256,address[],address,uint256)
pub const SWAP_TOKENS_FOR_ETH_FOT_SIG: &str = "function swapExactTokensForETHSupportingFeeOnTransferTokens(uint256,uint256,address[],address,uint256) external";
// addLiquidityETH(address,uint256,uint256,uint256,address,uint256)
pub const ADD_LIQUIDITY_ETH_SIG: &str =
    "function addLiquidityETH(address,uint256,uint256,uint256,address,uint256) external payable";
// approve(address,uint256)
pub const APPROVE_SIG: &str = "function approve(address,uint256) external returns (bool)";
