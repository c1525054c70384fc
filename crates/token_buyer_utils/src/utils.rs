use std::fmt::LowerHex;

use ethers::{
    signers::{LocalWallet, Signer, WalletError},
    types::{transaction::eip2718::TypedTransaction, Bytes, TransactionRequest, U256},
    utils::keccak256,
};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::NATIVE_DECIMALS;

pub fn compute_transaction_hash(raw_tx: &Bytes) -> String {
    format!("0x{}", hex::encode(keccak256(raw_tx)))
}

pub fn to_legacy_tx(tx: TypedTransaction) -> TypedTransaction {
    match tx {
        TypedTransaction::Eip1559(inner) => {
            let tx: TransactionRequest = inner.into();
            TypedTransaction::Legacy(tx)
        }
        other => other,
    }
}

pub async fn to_signed_tx(
    wallet: &LocalWallet,
    tx: &TypedTransaction,
) -> Result<Bytes, WalletError> {
    let signature = wallet.sign_transaction(tx).await?;
    let signed = tx.rlp_signed(&signature);
    Ok(signed)
}

pub fn format_lower_hex(hash: &impl LowerHex) -> String {
    format!("{:#x}", hash)
}

/// Scales a non-negative decimal by `10^decimals`, dropping digits beyond
/// `decimals` places. Returns `None` for negative amounts and for results
/// that do not fit a `U256`.
pub fn to_minor_units(amount: Decimal, decimals: u32) -> Option<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }
    let truncated = amount.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    let scale = truncated.scale();
    let mantissa = u128::try_from(truncated.mantissa()).ok()?;
    if mantissa == 0 {
        return Some(U256::zero());
    }
    // 10^78 no longer fits a U256
    let exponent = (decimals - scale) as usize;
    if exponent > 77 {
        return None;
    }

    U256::from(mantissa).checked_mul(U256::exp10(exponent))
}

pub fn to_native_minor_units(amount: Decimal) -> Option<U256> {
    to_minor_units(amount, NATIVE_DECIMALS)
}

pub fn gwei_to_wei(gwei: Decimal) -> Option<U256> {
    to_minor_units(gwei, 9)
}

pub fn deadline_after(now_timestamp: u64, validity_secs: u64) -> U256 {
    U256::from(now_timestamp) + U256::from(validity_secs)
}
