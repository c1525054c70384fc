use std::str::FromStr;

use ethers::{prelude::Lazy, types::Address, utils::to_checksum};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{PurchaseForm, PurchaseRequest};

static ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{40}$").unwrap());
static SECRET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0x|0X)?[0-9a-fA-F]{64}$").unwrap());

/// Why a form cannot be acted on yet. This is the normal state while the user
/// is still typing, not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotReady {
    #[error("token address {0:?} is not a valid address")]
    InvalidTokenAddress(String),
    #[error("private key is not a 32-byte hex value")]
    InvalidSecret,
    #[error("amount to buy is missing")]
    MissingAmount,
    #[error("amount to buy {0} must be positive")]
    NonPositiveAmount(Decimal),
    #[error("number of buys is missing")]
    MissingNumberOfBuys,
    #[error("number of buys {0} must be a positive integer")]
    InvalidNumberOfBuys(i64),
}

pub struct InputValidator;

impl InputValidator {
    pub fn validate(form: &PurchaseForm) -> Result<PurchaseRequest, NotReady> {
        let token_address = Self::parse_token_address(&form.token_address)?;

        if !Self::is_valid_secret(&form.secret) {
            return Err(NotReady::InvalidSecret);
        }

        let amount_to_buy = form.amount_to_buy.ok_or(NotReady::MissingAmount)?;
        if amount_to_buy <= Decimal::ZERO {
            return Err(NotReady::NonPositiveAmount(amount_to_buy));
        }

        let number_of_buys = form.number_of_buys.ok_or(NotReady::MissingNumberOfBuys)?;
        let number_of_buys = u32::try_from(number_of_buys)
            .ok()
            .filter(|count| *count > 0)
            .ok_or(NotReady::InvalidNumberOfBuys(number_of_buys))?;

        Ok(PurchaseRequest {
            token_address,
            secret: form.secret.trim().to_string(),
            amount_to_buy,
            number_of_buys,
        })
    }

    /// The `0x` prefix is optional. All-lowercase and all-uppercase hex are
    /// accepted as is; mixed case must match the EIP-55 checksum.
    pub fn parse_token_address(raw: &str) -> Result<Address, NotReady> {
        let raw = raw.trim();
        let invalid = || NotReady::InvalidTokenAddress(raw.to_string());
        if !ADDRESS_REGEX.is_match(raw) {
            return Err(invalid());
        }

        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let normalized = format!("0x{}", digits);
        let address = Address::from_str(&normalized).map_err(|_| invalid())?;
        let is_single_case = digits == digits.to_lowercase() || digits == digits.to_uppercase();
        if !is_single_case && to_checksum(&address, None) != normalized {
            return Err(invalid());
        }

        Ok(address)
    }

    pub fn is_valid_secret(raw: &str) -> bool {
        SECRET_REGEX.is_match(raw.trim())
    }
}
