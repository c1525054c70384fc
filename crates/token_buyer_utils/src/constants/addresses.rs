use ethers::types::{Address, H160};

pub const ZERO_ADDRESS: Address = H160([0u8; 20]);

/// Every network we trade on uses an 18-decimal native currency.
pub const NATIVE_DECIMALS: u32 = 18;
