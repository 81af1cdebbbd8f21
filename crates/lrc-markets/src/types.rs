use std::collections::BTreeMap;

use alloy::primitives::Address;
use lrc_decimal::Amount;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::registry::MarketSymbol;

/// Protocol (receipt) token precision. Constant across all markets.
pub const PROTOCOL_TOKEN_DECIMALS: u32 = 8;

/// Account addresses are compared lowercased everywhere.
pub fn normalize_account(account: &str) -> String {
    account.trim().to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Markets
// ---------------------------------------------------------------------------

/// Per-market configuration for one analysis run at one block.
///
/// Counts are as reported by the indexing API and serve only as expected
/// values for count reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub symbol: MarketSymbol,
    /// On-chain protocol-token ticker as reported upstream.
    pub ticker: String,
    pub address: Address,
    pub underlying_decimals: u32,
    pub decimals: u32,
    pub suppliers_count: u64,
    pub borrowers_count: u64,
}

/// Keyed by registry address.
pub type MarketsInfo = BTreeMap<Address, MarketInfo>;

/// The eight market-level figures compared between a data source and the
/// contract, already converted to decimals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketValues {
    pub symbol: MarketSymbol,
    pub address: Address,
    pub borrow_apy: Amount,
    pub supply_apy: Amount,
    pub cash: Amount,
    pub reserves: Amount,
    pub total_borrows: Amount,
    pub total_supply: Amount,
    pub exchange_rate: Amount,
    pub borrow_index: Amount,
}

/// Field selector over [`MarketValues`], in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarketField {
    BorrowApy,
    SupplyApy,
    Cash,
    Reserves,
    TotalBorrows,
    TotalSupply,
    ExchangeRate,
    BorrowIndex,
}

impl MarketField {
    pub const ALL: [MarketField; 8] = [
        MarketField::BorrowApy,
        MarketField::SupplyApy,
        MarketField::Cash,
        MarketField::Reserves,
        MarketField::TotalBorrows,
        MarketField::TotalSupply,
        MarketField::ExchangeRate,
        MarketField::BorrowIndex,
    ];

    /// Report key, identical to the serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketField::BorrowApy => "borrowApy",
            MarketField::SupplyApy => "supplyApy",
            MarketField::Cash => "cash",
            MarketField::Reserves => "reserves",
            MarketField::TotalBorrows => "totalBorrows",
            MarketField::TotalSupply => "totalSupply",
            MarketField::ExchangeRate => "exchangeRate",
            MarketField::BorrowIndex => "borrowIndex",
        }
    }

    pub fn get<'a>(&self, values: &'a MarketValues) -> &'a Amount {
        match self {
            MarketField::BorrowApy => &values.borrow_apy,
            MarketField::SupplyApy => &values.supply_apy,
            MarketField::Cash => &values.cash,
            MarketField::Reserves => &values.reserves,
            MarketField::TotalBorrows => &values.total_borrows,
            MarketField::TotalSupply => &values.total_supply,
            MarketField::ExchangeRate => &values.exchange_rate,
            MarketField::BorrowIndex => &values.borrow_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Supply and borrow of one account in one market, in underlying units.
///
/// A leg the source did not report is NaN, which compares as empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub supply: Amount,
    pub borrow: Amount,
}

impl Default for AccountBalance {
    fn default() -> Self {
        Self {
            supply: Amount::NaN,
            borrow: Amount::NaN,
        }
    }
}

/// One source's view of one market.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAccounts {
    /// Number of supply entries the parser kept. Diagnostic only.
    pub suppliers: u64,
    /// Number of borrow entries the parser kept. Diagnostic only.
    pub borrowers: u64,
    /// Lowercased account address -> balance.
    pub accounts: BTreeMap<String, AccountBalance>,
}

impl MarketAccounts {
    /// Accounts with a strictly positive borrow.
    pub fn positive_borrowers(&self) -> impl Iterator<Item = &String> {
        self.accounts
            .iter()
            .filter(|(_, b)| b.borrow.is_positive())
            .map(|(a, _)| a)
    }

    /// Accounts with a strictly positive supply.
    pub fn positive_suppliers(&self) -> impl Iterator<Item = &String> {
        self.accounts
            .iter()
            .filter(|(_, b)| b.supply.is_positive())
            .map(|(a, _)| a)
    }
}

/// One source's full account snapshot at one block.
pub type AccountsSnapshot = BTreeMap<MarketSymbol, MarketAccounts>;

/// Raw integers from `getAccountSnapshot`, before any decimal shift.
///
/// `supply` is in protocol-token units, `borrow` in underlying base units.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RawAccountSnapshot {
    pub supply: BigInt,
    pub borrow: BigInt,
}

/// Contract reads for one market keyed by lowercased account.
pub type RawSnapshots = BTreeMap<String, RawAccountSnapshot>;
