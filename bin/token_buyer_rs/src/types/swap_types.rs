use ethers::types::{Address, H256, U256, U64};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use token_buyer_utils::utils::format_lower_hex;

/// Direct token -> wrapped native route. Two hops by construction.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TradePath {
    pub token: Address,
    pub wrapped_native: Address,
}

impl TradePath {
    pub fn new(token: Address, wrapped_native: Address) -> Self {
        Self {
            token,
            wrapped_native,
        }
    }

    pub fn to_vec(&self) -> Vec<Address> {
        vec![self.token, self.wrapped_native]
    }
}

/// Parameters of one swap submission. Lives until the iteration settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIteration {
    pub index: u32,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub deadline: U256,
    pub gas_price: U256,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IterationStatus {
    Submitted,
    Confirmed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IterationOutcome {
    pub index: u32,
    pub status: IterationStatus,
    pub tx_hash: Option<H256>,
    pub deadline: U256,
    pub block_number: Option<U64>,
    pub error: Option<String>,
}

impl IterationOutcome {
    pub fn new(iteration: &SwapIteration) -> Self {
        Self {
            index: iteration.index,
            status: IterationStatus::Submitted,
            tx_hash: None,
            deadline: iteration.deadline,
            block_number: None,
            error: None,
        }
    }

    pub fn fail(&mut self, error: impl ToString) {
        self.status = IterationStatus::Failed;
        self.error = Some(error.to_string());
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub token_amount: U256,
    pub outcomes: Vec<IterationOutcome>,
}

impl BatchReport {
    pub fn confirmed_count(&self) -> usize {
        self.count(IterationStatus::Confirmed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(IterationStatus::Failed)
    }

    /// One `#<n> <STATUS> <tx hash>` line per iteration, failures carry their
    /// error.
    pub fn outcome_lines(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| {
                let tx_hash = outcome
                    .tx_hash
                    .map(|tx_hash| format_lower_hex(&tx_hash))
                    .unwrap_or_else(|| "-".to_string());
                match &outcome.error {
                    Some(error) => format!(
                        "#{} {} {} ({})",
                        outcome.index + 1,
                        outcome.status,
                        tx_hash,
                        error
                    ),
                    None => format!("#{} {} {}", outcome.index + 1, outcome.status, tx_hash),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn count(&self, status: IterationStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: u32, status: IterationStatus) -> IterationOutcome {
        IterationOutcome {
            index,
            status,
            tx_hash: Some(H256::from_low_u64_be(index as u64 + 1)),
            deadline: U256::from(1_700_000_300u64),
            block_number: None,
            error: None,
        }
    }

    #[test]
    fn outcome_lines_show_status_and_hash() {
        let mut failed = outcome(1, IterationStatus::Failed);
        failed.error = Some("transaction reverted".to_string());
        let mut rejected = outcome(2, IterationStatus::Failed);
        rejected.tx_hash = None;
        let report = BatchReport {
            token_amount: U256::exp10(18),
            outcomes: vec![outcome(0, IterationStatus::Confirmed), failed, rejected],
        };

        let lines: Vec<String> = report.outcome_lines().lines().map(String::from).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            format!("#1 CONFIRMED {:#x}", H256::from_low_u64_be(1))
        );
        assert_eq!(
            lines[1],
            format!("#2 FAILED {:#x} (transaction reverted)", H256::from_low_u64_be(2))
        );
        assert!(lines[2].starts_with("#3 FAILED -"));
        assert_eq!(report.confirmed_count(), 1);
        assert_eq!(report.failed_count(), 2);
    }
}
