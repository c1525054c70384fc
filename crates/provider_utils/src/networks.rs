use ethers::prelude::Lazy;
use std::collections::HashMap;

use crate::enums::ENetwork;

#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    pub network: ENetwork,
    pub chain_id: u64,
    pub native_symbol: String,
    pub rpc_urls: Vec<String>,
    pub ws_urls: Vec<String>,
}

pub static NETWORKS: Lazy<HashMap<ENetwork, NetworkConfig>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::BscTestnet,
            NetworkConfig {
                network: ENetwork::BscTestnet,
                chain_id: 97,
                native_symbol: "BNB".to_string(),
                rpc_urls: vec![
                    "https://data-seed-prebsc-1-s1.binance.org:8545/".to_string(),
                    "https://data-seed-prebsc-2-s1.binance.org:8545/".to_string(),
                    "https://bsc-testnet-rpc.publicnode.com".to_string(),
                ],
                ws_urls: vec!["wss://bsc-testnet-rpc.publicnode.com".to_string()],
            },
        ),
        (
            ENetwork::BscMainnet,
            NetworkConfig {
                network: ENetwork::BscMainnet,
                chain_id: 56,
                native_symbol: "BNB".to_string(),
                rpc_urls: vec![
                    "https://bsc-dataseed.binance.org/".to_string(),
                    "https://bsc-dataseed1.defibit.io/".to_string(),
                    "https://bsc-rpc.publicnode.com".to_string(),
                ],
                ws_urls: vec!["wss://bsc-rpc.publicnode.com".to_string()],
            },
        ),
    ])
});

pub fn network_config(network: &ENetwork) -> anyhow::Result<&'static NetworkConfig> {
    NETWORKS
        .get(network)
        .ok_or_else(|| anyhow::anyhow!("NETWORKS {:?} not found", network))
}
