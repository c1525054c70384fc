use ethers::{prelude::Lazy, types::Address};
use provider_utils::enums::ENetwork;
use std::{collections::HashMap, str::FromStr};

/// WBNB, the second hop of every swap path and the quote side of each pair.
pub static WRAPPED_NATIVE_TOKENS: Lazy<HashMap<ENetwork, Address>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::BscTestnet,
            Address::from_str("0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd").unwrap(),
        ),
        (
            ENetwork::BscMainnet,
            Address::from_str("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c").unwrap(),
        ),
    ])
});
