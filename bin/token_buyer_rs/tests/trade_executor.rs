mod common;

use std::str::FromStr;

use common::*;
use ethers::types::U256;
use rust_decimal::Decimal;
use token_buyer_rs::{
    core::{ExecutorConfig, TradeExecutor},
    types::IterationStatus,
};
use token_buyer_utils::{
    constants::SWAP_TOKENS_FOR_ETH_FOT_SIG,
    utils::{gwei_to_wei, to_native_minor_units},
};

fn config() -> ExecutorConfig {
    ExecutorConfig {
        gas_price: gwei_to_wei(Decimal::from(10)).unwrap(),
        deadline_secs: 600,
        amount_out_min: U256::zero(),
    }
}

fn executor(sender: MockSender, clock: ManualClock) -> TradeExecutor<MockSender, ManualClock> {
    let router_service = offline_router_service();
    let path = router_service.trade_path(address(TOKEN_ADDRESS));
    TradeExecutor::with_clock(sender, router_service, path, config(), clock)
}

fn one_and_a_half() -> U256 {
    to_native_minor_units(Decimal::from_str("1.5").unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn submits_one_swap_per_buy_and_waits_for_each_confirmation() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let sender = MockSender::new();
    let report = executor(sender.clone(), clock).execute(one_and_a_half(), 3).await;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.confirmed_count(), 3);

    let events = sender.events();
    assert_eq!(events.len(), 6);
    for (position, event) in events.iter().enumerate() {
        let expected_kind = if position % 2 == 0 {
            SenderEventKind::Submit
        } else {
            SenderEventKind::Confirm
        };
        assert_eq!(event.kind, expected_kind);
        assert_eq!(event.index, position / 2);
    }
    for pair in events.windows(2) {
        assert!(pair[1].at >= pair[0].at);
    }
    // next submission only after the previous confirmation
    for index in 1..3 {
        let confirmed = &events[2 * index - 1];
        let submitted = &events[2 * index];
        assert!(submitted.at - confirmed.at < sender.confirmation_delay);
        assert!(submitted.at >= confirmed.at);
    }
}

#[tokio::test(start_paused = true)]
async fn swap_calldata_sells_the_scaled_amount_along_the_direct_path() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let sender = MockSender::new();
    executor(sender.clone(), clock).execute(one_and_a_half(), 1).await;

    let transactions = sender.transactions();
    assert_eq!(transactions.len(), 1);
    let swap_tx = &transactions[0];
    assert_eq!(swap_tx.to_addr(), Some(&address(ROUTER_ADDRESS)));
    assert_eq!(swap_tx.gas(), Some(&U256::from(500_000u64)));
    assert_eq!(
        swap_tx.gas_price(),
        Some(U256::from_dec_str("10000000000").unwrap())
    );

    let inputs = decode_call(SWAP_TOKENS_FOR_ETH_FOT_SIG, swap_tx);
    assert_eq!(
        inputs[0].clone().into_uint().unwrap(),
        U256::from_dec_str("1500000000000000000").unwrap()
    );
    assert_eq!(inputs[1].clone().into_uint().unwrap(), U256::zero());
    let path: Vec<_> = inputs[2]
        .clone()
        .into_array()
        .unwrap()
        .into_iter()
        .map(|token| token.into_address().unwrap())
        .collect();
    assert_eq!(path, vec![address(TOKEN_ADDRESS), address(WBNB_ADDRESS)]);
    assert_eq!(inputs[3].clone().into_address().unwrap(), sender.address);
}

#[tokio::test(start_paused = true)]
async fn deadline_is_recomputed_for_every_iteration() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let mut sender = MockSender::new();
    sender.clock = Some(clock.clone());
    let report = executor(sender.clone(), clock).execute(one_and_a_half(), 3).await;

    let delay = sender.confirmation_delay.as_secs();
    for (index, swap_tx) in sender.transactions().iter().enumerate() {
        let expected = U256::from(START_TIMESTAMP + 600 + delay * index as u64);
        let inputs = decode_call(SWAP_TOKENS_FOR_ETH_FOT_SIG, swap_tx);
        assert_eq!(inputs[4].clone().into_uint().unwrap(), expected);
        assert_eq!(report.outcomes[index].deadline, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn reverted_iteration_does_not_stop_the_batch() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let mut sender = MockSender::new();
    sender.revert_at = Some(1);
    let report = executor(sender.clone(), clock).execute(one_and_a_half(), 4).await;

    assert_eq!(sender.transactions().len(), 4);
    let statuses: Vec<_> = report.outcomes.iter().map(|outcome| outcome.status).collect();
    assert_eq!(
        statuses,
        vec![
            IterationStatus::Confirmed,
            IterationStatus::Failed,
            IterationStatus::Confirmed,
            IterationStatus::Confirmed,
        ]
    );
    assert_eq!(
        report.outcomes[1].error.as_deref(),
        Some("transaction reverted")
    );
    assert!(report.outcomes[1].tx_hash.is_some());
}

#[tokio::test(start_paused = true)]
async fn submission_error_is_recorded_and_next_iteration_runs() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let mut sender = MockSender::new();
    sender.fail_submit_at = Some(0);
    let report = executor(sender.clone(), clock).execute(one_and_a_half(), 2).await;

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.confirmed_count(), 1);
    assert!(report.outcomes[0].tx_hash.is_none());
    assert!(report.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("nonce too low"));

    let confirms = sender
        .events()
        .iter()
        .filter(|event| event.kind == SenderEventKind::Confirm)
        .count();
    assert_eq!(confirms, 1);
}

#[tokio::test]
async fn zero_buys_submit_nothing() {
    let clock = ManualClock::starting_at(START_TIMESTAMP);
    let sender = MockSender::new();
    let report = executor(sender.clone(), clock).execute(one_and_a_half(), 0).await;

    assert!(report.outcomes.is_empty());
    assert!(sender.transactions().is_empty());
}
