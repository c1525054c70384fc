pub mod abi;
pub mod clock;
pub mod constants;
pub mod env;
pub mod log;
pub mod utils;
