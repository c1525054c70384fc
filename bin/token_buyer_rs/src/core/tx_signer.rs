use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, PendingTransaction, Provider, ProviderError},
    signers::{LocalWallet, Signer, WalletError},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, TransactionReceipt, H256,
        U64,
    },
};
use thiserror::Error;
use token_buyer_utils::utils::{compute_transaction_hash, to_legacy_tx, to_signed_tx};

#[derive(Error, Debug)]
pub enum TxError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("private key rejected: {0}")]
    InvalidSecret(String),
    #[error("wallet at {0} exposed no account")]
    NoAccount(String),
    #[error("transaction {0:?} dropped before confirmation")]
    Dropped(H256),
}

/// What the executor and the seeder need from whichever signer is active.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    fn address(&self) -> Address;

    /// Signs (or has the wallet sign) and broadcasts `tx`. Returns once the
    /// node accepted it, not once it is mined.
    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256, TxError>;

    /// Blocks until `tx_hash` is mined. Reverted transactions still return
    /// their receipt; callers inspect `status`.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, TxError>;
}

/// Turns the private key carried by a purchase request into a sender.
pub trait KeySignerSource: Send + Sync {
    type Sender: TransactionSender + 'static;

    fn key_signer(&self, secret: &str) -> Result<Self::Sender, TxError>;
}

/// Private-key signer used by the automated purchase path. Transactions are
/// signed locally and sent raw.
#[derive(Debug, Clone)]
pub struct KeySigner {
    wallet: LocalWallet,
    chain_id: U64,
    http_provider: Arc<Provider<Http>>,
    confirmation_poll: Duration,
}

impl KeySigner {
    pub fn new(
        wallet: LocalWallet,
        chain_id: U64,
        http_provider: Arc<Provider<Http>>,
        confirmation_poll: Duration,
    ) -> Self {
        Self {
            wallet: wallet.with_chain_id(chain_id.as_u64()),
            chain_id,
            http_provider,
            confirmation_poll,
        }
    }
}

#[async_trait]
impl TransactionSender for KeySigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn send_transaction(&self, mut tx: TypedTransaction) -> Result<H256, TxError> {
        let wallet_address = self.wallet.address();
        // one submission at a time, so the pending count is the next free nonce
        let nonce = self
            .http_provider
            .get_transaction_count(wallet_address, Some(BlockNumber::Pending.into()))
            .await?;

        tx.set_from(wallet_address);
        tx.set_nonce(nonce);
        tx.set_chain_id(self.chain_id);
        if tx.gas().is_none() {
            let gas = self.http_provider.estimate_gas(&tx, None).await?;
            tx.set_gas(gas);
        }
        if tx.gas_price().is_none() {
            let gas_price = self.http_provider.get_gas_price().await?;
            tx.set_gas_price(gas_price);
        }

        let tx = to_legacy_tx(tx);
        let signed_tx = to_signed_tx(&self.wallet, &tx).await?;
        let tx_hash = compute_transaction_hash(&signed_tx);
        log::debug!(
            "[KeySigner] address {:?} nonce {:?} sending {}",
            wallet_address,
            nonce,
            tx_hash
        );

        let pending_tx = self.http_provider.send_raw_transaction(signed_tx).await?;
        Ok(*pending_tx)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, TxError> {
        wait_for_receipt(&self.http_provider, tx_hash, self.confirmation_poll).await
    }
}

/// Account held by an external wallet (browser-extension bridge, Frame, a
/// node-managed account) reachable over JSON-RPC. The wallet picks the nonce,
/// signs, and usually asks its user to approve every request.
#[derive(Debug, Clone)]
pub struct InteractiveSigner {
    wallet_provider: Provider<Http>,
    account: Address,
    http_provider: Arc<Provider<Http>>,
    confirmation_poll: Duration,
}

impl InteractiveSigner {
    pub async fn connect(
        wallet_provider: Provider<Http>,
        http_provider: Arc<Provider<Http>>,
        confirmation_poll: Duration,
    ) -> Result<Self, TxError> {
        let accounts: Vec<Address> = wallet_provider
            .request("eth_requestAccounts", Vec::<String>::new())
            .await?;
        let Some(account) = accounts.first().copied() else {
            return Err(TxError::NoAccount(wallet_provider.url().to_string()));
        };
        log::info!("[InteractiveSigner] wallet exposed account {:?}", account);

        Ok(Self {
            wallet_provider,
            account,
            http_provider,
            confirmation_poll,
        })
    }
}

#[async_trait]
impl TransactionSender for InteractiveSigner {
    fn address(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, mut tx: TypedTransaction) -> Result<H256, TxError> {
        tx.set_from(self.account);
        let pending_tx = self.wallet_provider.send_transaction(tx, None).await?;
        Ok(*pending_tx)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, TxError> {
        // confirmations are read from the chain endpoint, not from the wallet
        wait_for_receipt(&self.http_provider, tx_hash, self.confirmation_poll).await
    }
}

/// The two signer kinds. A sequence of transactions always uses one of them.
#[derive(Debug, Clone)]
pub enum TxSigner {
    Key(KeySigner),
    Interactive(InteractiveSigner),
}

#[async_trait]
impl TransactionSender for TxSigner {
    fn address(&self) -> Address {
        match self {
            TxSigner::Key(signer) => signer.address(),
            TxSigner::Interactive(signer) => signer.address(),
        }
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256, TxError> {
        match self {
            TxSigner::Key(signer) => signer.send_transaction(tx).await,
            TxSigner::Interactive(signer) => signer.send_transaction(tx).await,
        }
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, TxError> {
        match self {
            TxSigner::Key(signer) => signer.wait_for_receipt(tx_hash).await,
            TxSigner::Interactive(signer) => signer.wait_for_receipt(tx_hash).await,
        }
    }
}

pub async fn wait_for_receipt(
    http_provider: &Provider<Http>,
    tx_hash: H256,
    poll_interval: Duration,
) -> Result<TransactionReceipt, TxError> {
    PendingTransaction::new(tx_hash, http_provider)
        .interval(poll_interval)
        .await?
        .ok_or(TxError::Dropped(tx_hash))
}
