#![allow(dead_code)]

use std::{
    collections::HashMap,
    fmt::Debug,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethers::{
    abi::{self, AbiParser, Token},
    providers::{Http, JsonRpcClient, MockError, Provider, ProviderError},
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, TransactionReceipt, H256, U256,
        U64,
    },
    utils::hex,
};
use serde::{de::DeserializeOwned, Serialize};
use token_buyer_rs::{
    core::{TransactionSender, TxError},
    routers::PancakeRouterService,
};
use token_buyer_utils::clock::Clock;
use tokio::time::Instant;

pub const TOKEN_ADDRESS: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const ROUTER_ADDRESS: &str = "0x9Ac64Cc6e4415144C455BD8E4837Fea55603e5c3";
pub const WBNB_ADDRESS: &str = "0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd";
pub const FACTORY_ADDRESS: &str = "0x6725F303b657a9451d8BA641348b6761A6CC7a17";
pub const PAIR_ADDRESS: &str = "0x1000000000000000000000000000000000000001";
pub const START_TIMESTAMP: u64 = 1_700_000_000;

pub const ALLOWANCE_SIG: &str = "function allowance(address,address) external view returns (uint256)";
pub const BALANCE_OF_SIG: &str = "function balanceOf(address) external view returns (uint256)";
pub const DECIMALS_SIG: &str = "function decimals() external view returns (uint8)";
pub const SYMBOL_SIG: &str = "function symbol() external view returns (string)";
pub const FACTORY_SIG: &str = "function factory() external view returns (address)";
pub const GET_PAIR_SIG: &str = "function getPair(address,address) external view returns (address)";

pub fn address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}

pub fn random_secret() -> String {
    let wallet = LocalWallet::new(&mut rand::thread_rng());
    format!("0x{}", hex::encode(wallet.signer().to_bytes()))
}

/// Router service bound to an endpoint nobody listens on; only calldata
/// builders may be used with it.
pub fn offline_router_service() -> PancakeRouterService {
    let provider = Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap();
    PancakeRouterService::new(
        Arc::new(provider),
        address(ROUTER_ADDRESS),
        address(WBNB_ADDRESS),
        U256::from(500_000u64),
    )
}

/// Same router and wrapped native as `offline_router_service`, reads served
/// by `chain`.
pub fn chain_router_service(chain: &FakeChain) -> PancakeRouterService<Provider<FakeChain>> {
    PancakeRouterService::new(
        Arc::new(Provider::new(chain.clone())),
        address(ROUTER_ADDRESS),
        address(WBNB_ADDRESS),
        U256::from(500_000u64),
    )
}

pub fn decode_call(signature: &str, tx: &TypedTransaction) -> Vec<Token> {
    let function = AbiParser::default().parse_function(signature).unwrap();
    let data = tx.data().expect("calldata");
    assert_eq!(&data[..4], &function.short_signature()[..]);
    function.decode_input(&data[4..]).unwrap()
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn starting_at(timestamp: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_timestamp(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderEventKind {
    Submit,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct SenderEvent {
    pub kind: SenderEventKind,
    pub index: usize,
    pub at: Instant,
}

/// Records every submission and confirmation wait. Submission `k` can be made
/// to fail, or its receipt to carry a revert status.
#[derive(Debug, Clone)]
pub struct MockSender {
    pub address: Address,
    pub events: Arc<Mutex<Vec<SenderEvent>>>,
    pub transactions: Arc<Mutex<Vec<TypedTransaction>>>,
    pub fail_submit_at: Option<usize>,
    pub revert_at: Option<usize>,
    pub confirmation_delay: Duration,
    pub clock: Option<ManualClock>,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            address: Address::from_low_u64_be(0xb0b),
            events: Arc::new(Mutex::new(Vec::new())),
            transactions: Arc::new(Mutex::new(Vec::new())),
            fail_submit_at: None,
            revert_at: None,
            confirmation_delay: Duration::from_secs(3),
            clock: None,
        }
    }

    pub fn events(&self) -> Vec<SenderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<TypedTransaction> {
        self.transactions.lock().unwrap().clone()
    }

    fn tx_hash(index: usize) -> H256 {
        H256::from_low_u64_be(index as u64 + 1)
    }
}

#[async_trait]
impl TransactionSender for MockSender {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256, TxError> {
        let index = self.transactions.lock().unwrap().len();
        self.transactions.lock().unwrap().push(tx);
        self.events.lock().unwrap().push(SenderEvent {
            kind: SenderEventKind::Submit,
            index,
            at: Instant::now(),
        });

        if self.fail_submit_at == Some(index) {
            return Err(TxError::Provider(ProviderError::CustomError(
                "nonce too low".to_string(),
            )));
        }
        Ok(Self::tx_hash(index))
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, TxError> {
        tokio::time::sleep(self.confirmation_delay).await;
        if let Some(clock) = &self.clock {
            clock.advance(self.confirmation_delay.as_secs());
        }

        let index = tx_hash.to_low_u64_be() as usize - 1;
        self.events.lock().unwrap().push(SenderEvent {
            kind: SenderEventKind::Confirm,
            index,
            at: Instant::now(),
        });

        let status = if self.revert_at == Some(index) { 0u64 } else { 1u64 };
        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(100 + index as u64)),
            status: Some(U64::from(status)),
            ..Default::default()
        })
    }
}

/// JSON-RPC client that answers `eth_call` from a table keyed by contract and
/// exact calldata. Any other method, and any call nobody registered, fails.
#[derive(Debug, Clone, Default)]
pub struct FakeChain {
    responses: Arc<Mutex<HashMap<(Address, Bytes), Bytes>>>,
    calls: Arc<Mutex<Vec<(Address, Bytes)>>>,
}

impl FakeChain {
    pub fn respond(&self, to: Address, signature: &str, inputs: &[Token], outputs: &[Token]) {
        let function = AbiParser::default().parse_function(signature).unwrap();
        let calldata = Bytes::from(function.encode_input(inputs).unwrap());
        self.responses
            .lock()
            .unwrap()
            .insert((to, calldata), Bytes::from(abi::encode(outputs)));
    }

    /// Token metadata, the factory pair and its reserves.
    pub fn with_pool(self, token_reserve: U256, native_reserve: U256) -> Self {
        let token = address(TOKEN_ADDRESS);
        let pair = address(PAIR_ADDRESS);
        self.respond(token, SYMBOL_SIG, &[], &[Token::String("DAI".to_string())]);
        self.respond(token, DECIMALS_SIG, &[], &[Token::Uint(U256::from(18))]);
        self.respond_factory();
        self.respond_pair(token, pair);
        self.respond(
            token,
            BALANCE_OF_SIG,
            &[Token::Address(pair)],
            &[Token::Uint(token_reserve)],
        );
        self.respond(
            address(WBNB_ADDRESS),
            BALANCE_OF_SIG,
            &[Token::Address(pair)],
            &[Token::Uint(native_reserve)],
        );
        self
    }

    pub fn respond_factory(&self) {
        self.respond(
            address(ROUTER_ADDRESS),
            FACTORY_SIG,
            &[],
            &[Token::Address(address(FACTORY_ADDRESS))],
        );
    }

    pub fn respond_pair(&self, token: Address, pair: Address) {
        self.respond(
            address(FACTORY_ADDRESS),
            GET_PAIR_SIG,
            &[Token::Address(token), Token::Address(address(WBNB_ADDRESS))],
            &[Token::Address(pair)],
        );
    }

    pub fn respond_allowance(&self, owner: Address, allowance: U256) {
        self.respond(
            address(TOKEN_ADDRESS),
            ALLOWANCE_SIG,
            &[Token::Address(owner), Token::Address(address(ROUTER_ADDRESS))],
            &[Token::Uint(allowance)],
        );
    }

    /// Number of `eth_call`s made to any function with `signature`.
    pub fn call_count(&self, signature: &str) -> usize {
        let function = AbiParser::default().parse_function(signature).unwrap();
        let selector = function.short_signature();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, calldata)| calldata.len() >= 4 && calldata[..4] == selector)
            .count()
    }
}

#[async_trait]
impl JsonRpcClient for FakeChain {
    type Error = MockError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, MockError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        if method != "eth_call" {
            return Err(MockError::EmptyResponses);
        }

        let params = serde_json::to_value(params)?;
        let to: Address = serde_json::from_value(params[0]["to"].clone())?;
        let calldata: Bytes = serde_json::from_value(params[0]["data"].clone())?;
        self.calls.lock().unwrap().push((to, calldata.clone()));

        let output = self
            .responses
            .lock()
            .unwrap()
            .get(&(to, calldata))
            .cloned()
            .ok_or(MockError::EmptyResponses)?;
        Ok(serde_json::from_value(serde_json::to_value(output)?)?)
    }
}
