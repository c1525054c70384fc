use anyhow::anyhow;
use rust_decimal::Decimal;
use token_buyer_rs::{
    constants::{Env, LOG_TARGETS},
    core::{ChainConnector, InputValidator, LiquiditySeeder, NotificationService},
    routers::PancakeRouterService,
};
use token_buyer_utils::{
    env::{get_env, get_env_parsed},
    log::setup_logger,
    utils::{format_lower_hex, to_minor_units},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(&LOG_TARGETS, None)?;
    let env = Env::new()?;

    let token_address = InputValidator::parse_token_address(&get_env("TOKEN_ADDRESS", None)?)?;
    let seed_token_amount: Decimal = get_env_parsed("SEED_TOKEN_AMOUNT", None)?;

    let chain_connector = ChainConnector::connect_healthy(&env).await?;
    let router_service = PancakeRouterService::from_env(&env, chain_connector.http_provider());
    let token_info = router_service.token_info(token_address).await?;
    let token_amount = to_minor_units(seed_token_amount, token_info.decimals as u32)
        .filter(|amount| !amount.is_zero())
        .ok_or_else(|| anyhow!("SEED_TOKEN_AMOUNT {} invalid", seed_token_amount))?;

    let signer = chain_connector.interactive_signer().await?;
    let seeder = LiquiditySeeder::new(signer, router_service, env.seed_native_amount);
    log::info!(
        "seeding {} {} with {} wei {}",
        seed_token_amount,
        token_info.symbol,
        env.seed_native_amount,
        env.native_symbol
    );

    let notification_service = NotificationService::from_env()?;
    match seeder.seed(token_address, token_amount).await {
        Ok(tx_receipt) => {
            let message = format!(
                "Liquidity added for {} ({:?}) in tx {}",
                token_info.symbol,
                token_address,
                format_lower_hex(&tx_receipt.transaction_hash)
            );
            log::info!("{}", message);
            notification_service.send_message(message).await;
            Ok(())
        }
        Err(err) => {
            log::error!("Error adding liquidity: {:?}", err);
            notification_service
                .send_message(format!("Adding liquidity for {:?} failed: {}", token_address, err))
                .await;
            Err(err)
        }
    }
}
