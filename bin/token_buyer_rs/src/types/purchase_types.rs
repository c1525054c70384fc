use std::fmt;

use ethers::types::Address;
use rust_decimal::Decimal;

/// Raw, possibly incomplete purchase input as typed by the user.
#[derive(Clone, Default, PartialEq)]
pub struct PurchaseForm {
    pub token_address: String,
    pub secret: String,
    pub amount_to_buy: Option<Decimal>,
    pub number_of_buys: Option<i64>,
}

impl PurchaseForm {
    /// Reads the four form fields through `lookup`. Unset or non-numeric
    /// amounts stay `None`; the validator reports them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            token_address: lookup("TOKEN_ADDRESS").unwrap_or_default(),
            secret: lookup("PRIVATE_KEY").unwrap_or_default(),
            amount_to_buy: lookup("AMOUNT_TO_BUY").and_then(|value| value.trim().parse().ok()),
            number_of_buys: lookup("NUMBER_OF_BUYS").and_then(|value| value.trim().parse().ok()),
        }
    }
}

impl fmt::Debug for PurchaseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurchaseForm")
            .field("token_address", &self.token_address)
            .field("secret", &redact(&self.secret))
            .field("amount_to_buy", &self.amount_to_buy)
            .field("number_of_buys", &self.number_of_buys)
            .finish()
    }
}

/// A form that passed validation. Built fresh at every monitor tick and
/// handed to the purchase path by value.
#[derive(Clone, PartialEq)]
pub struct PurchaseRequest {
    pub token_address: Address,
    pub secret: String,
    pub amount_to_buy: Decimal,
    pub number_of_buys: u32,
}

impl fmt::Debug for PurchaseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurchaseRequest")
            .field("token_address", &self.token_address)
            .field("secret", &redact(&self.secret))
            .field("amount_to_buy", &self.amount_to_buy)
            .field("number_of_buys", &self.number_of_buys)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
