mod chain_connector;
mod input_validator;
mod liquidity_monitor;
mod liquidity_seeder;
mod liquidity_watcher;
mod notification_service;
mod purchase_service;
mod trade_executor;
mod tx_signer;

pub use chain_connector::*;
pub use input_validator::*;
pub use liquidity_monitor::*;
pub use liquidity_seeder::*;
pub use liquidity_watcher::*;
pub use notification_service::*;
pub use purchase_service::*;
pub use trade_executor::*;
pub use tx_signer::*;
