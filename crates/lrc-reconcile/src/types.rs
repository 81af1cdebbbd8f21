use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lrc_decimal::Amount;
use lrc_markets::{Address, MarketField, MarketSymbol};
use serde::{Deserialize, Serialize};

pub const OK_TAG: &str = "\u{2705}";
pub const FAIL_TAG: &str = "\u{274c}";

fn tag(ok: bool) -> &'static str {
    if ok {
        OK_TAG
    } else {
        FAIL_TAG
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("no contract snapshot for {account} in {market}")]
    MissingSnapshot { market: MarketSymbol, account: String },
    #[error("no contract values for market {0}")]
    MissingContractValues(MarketSymbol),
}

// ---------------------------------------------------------------------------
// Market values
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldComparison {
    pub ok: bool,
    pub message: String,
}

impl FieldComparison {
    pub fn new(ok: bool, api: &Amount, contract: &Amount) -> Self {
        let message = if ok {
            format!("{} {api}", OK_TAG)
        } else {
            format!("{} Api: {api}. Contract: {contract}", FAIL_TAG)
        };
        Self { ok, message }
    }
}

/// One market: AND of its eight fields, plus one message per field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarketComparison {
    pub ok: bool,
    #[serde(flatten)]
    pub fields: BTreeMap<MarketField, String>,
}

/// All markets of one block: AND across markets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarketsComparison {
    pub ok: bool,
    pub markets: BTreeMap<MarketSymbol, MarketComparison>,
}

// ---------------------------------------------------------------------------
// Account values
// ---------------------------------------------------------------------------

/// Which rule decides whether an account analysis "has errors".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCheckMode {
    /// Contract-active counts vs. indexed counts, plus any wrongful/missing.
    #[default]
    Count,
    /// Any wrong-value account.
    Values,
}

impl AccountCheckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCheckMode::Count => "count",
            AccountCheckMode::Values => "values",
        }
    }
}

impl fmt::Display for AccountCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountCheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(AccountCheckMode::Count),
            "values" => Ok(AccountCheckMode::Values),
            other => Err(format!("invalid mode '{other}'. expected one of: count | values")),
        }
    }
}

/// Both legs non-empty and unequal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WrongValue {
    pub account: String,
    pub api_balance: Amount,
    pub contract_balance: Amount,
    /// `api_balance - contract_balance`.
    pub diff: Amount,
}

/// Classification of one leg (borrow or supply) of one account.
///
/// `Uncounted` is a match where the API value is not strictly positive,
/// e.g. (0, 0) or (NaN, 0). Such accounts are reconciled but not counted.
#[derive(Clone, Debug, PartialEq)]
pub enum LegOutcome {
    Right,
    Uncounted,
    /// API reports a balance the contract denies entirely.
    Wrongful,
    /// Contract shows a balance the API omitted.
    Missing,
    WrongValue {
        api: Amount,
        contract: Amount,
        diff: Amount,
    },
}

/// Accumulated classification of one leg across a market.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LegAnalysis {
    pub right: Vec<String>,
    pub wrongful: Vec<String>,
    pub missing: Vec<String>,
    pub wrong_value: Vec<WrongValue>,
    /// Accounts with a strictly positive converted contract balance.
    pub contract_active: Vec<String>,
    /// Count reported by the indexing API for this market.
    pub expected_count: u64,
}

impl LegAnalysis {
    pub fn with_expected(expected_count: u64) -> Self {
        Self {
            expected_count,
            ..Self::default()
        }
    }

    pub fn record(&mut self, account: &str, outcome: LegOutcome) {
        match outcome {
            LegOutcome::Right => self.right.push(account.to_string()),
            LegOutcome::Uncounted => {}
            LegOutcome::Wrongful => self.wrongful.push(account.to_string()),
            LegOutcome::Missing => self.missing.push(account.to_string()),
            LegOutcome::WrongValue { api, contract, diff } => self.wrong_value.push(WrongValue {
                account: account.to_string(),
                api_balance: api,
                contract_balance: contract,
                diff,
            }),
        }
    }

    pub fn count_ok(&self) -> bool {
        self.contract_active.len() as u64 == self.expected_count
    }

    /// Three-line console summary.
    pub fn message(&self) -> String {
        let active = self.contract_active.len();
        let count = if self.count_ok() {
            format!("{} {active}", OK_TAG)
        } else {
            format!("{} Api: {}. JIT: {active}", FAIL_TAG, self.expected_count)
        };
        let right = format!(
            "{} Right: {}/{active}.",
            tag(self.right.len() == active),
            self.right.len()
        );
        let wrong = format!(
            "Wrong Value: {}. Missing: {}. Wrongful: {}.",
            self.wrong_value.len(),
            self.missing.len(),
            self.wrongful.len()
        );
        format!("Count: {count}.\n{right}\n{wrong}")
    }
}

/// Result of checking every API account of one market against the contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccountValuesAnalysis {
    pub market: MarketSymbol,
    pub borrows: LegAnalysis,
    pub supplies: LegAnalysis,
}

impl AccountValuesAnalysis {
    pub fn has_errors(&self, mode: AccountCheckMode) -> bool {
        match mode {
            AccountCheckMode::Count => {
                !self.borrows.count_ok()
                    || !self.supplies.count_ok()
                    || !self.borrows.missing.is_empty()
                    || !self.supplies.missing.is_empty()
                    || !self.borrows.wrongful.is_empty()
                    || !self.supplies.wrongful.is_empty()
            }
            AccountCheckMode::Values => {
                !self.borrows.wrong_value.is_empty() || !self.supplies.wrong_value.is_empty()
            }
        }
    }

    pub fn borrower_message(&self) -> String {
        self.borrows.message()
    }

    pub fn supplier_message(&self) -> String {
        self.supplies.message()
    }
}

// ---------------------------------------------------------------------------
// Account sets
// ---------------------------------------------------------------------------

/// Accounts strictly positive on exactly one of two sources, per market.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarketDiff {
    pub market: MarketSymbol,
    pub market_address: Option<Address>,
    pub first_only_borrowers: Vec<String>,
    pub first_only_suppliers: Vec<String>,
    pub second_only_borrowers: Vec<String>,
    pub second_only_suppliers: Vec<String>,
}

impl MarketDiff {
    pub fn is_empty(&self) -> bool {
        self.first_only_borrowers.is_empty()
            && self.first_only_suppliers.is_empty()
            && self.second_only_borrowers.is_empty()
            && self.second_only_suppliers.is_empty()
    }
}

pub type AccountsDiff = BTreeMap<MarketSymbol, MarketDiff>;

/// Contract arbitration of one side's exclusive accounts on one leg.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MissingResolution {
    /// On-chain balance is non-zero: the other source genuinely missed it.
    pub wrongful: Vec<String>,
    /// On-chain balance is zero: the exclusion was legitimate.
    pub rightful: Vec<String>,
}

impl MissingResolution {
    pub fn total(&self) -> usize {
        self.wrongful.len() + self.rightful.len()
    }

    /// `wrongful/total`.
    pub fn message(&self) -> String {
        format!("{}/{}", self.wrongful.len(), self.total())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SideMissing {
    pub borrowers: MissingResolution,
    pub suppliers: MissingResolution,
}

impl SideMissing {
    pub fn has_wrongful(&self) -> bool {
        !self.borrowers.wrongful.is_empty() || !self.suppliers.wrongful.is_empty()
    }
}

/// Per market: what each source missed, as arbitrated by the contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarketMissingAnalysis {
    pub market: MarketSymbol,
    /// Accounts only the second source has.
    pub missing_from_first: SideMissing,
    /// Accounts only the first source has.
    pub missing_from_second: SideMissing,
}
