//! Normalization of raw source responses into the shared model.
//!
//! Unmapped market tickers/names resolve to the registry's "not applicable"
//! sentinel and are skipped, never fatal.

use std::collections::BTreeMap;

use lrc_decimal::Amount;
use lrc_markets::{
    normalize_account, symbol_for_name, symbol_for_onchain_ticker, AccountsSnapshot, MarketInfo,
    MarketSymbol, MarketValues, MarketsInfo, PROTOCOL_TOKEN_DECIMALS,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::partner::PartnerAccounts;
use crate::subgraph::{SubgraphAccount, SubgraphMarket, SubgraphMarketInfo};

// ---------------------------------------------------------------------------
// Borrow index adjustment
// ---------------------------------------------------------------------------

/// A non-zero stored borrow whose interest adjustment is undefined
/// (zero or missing account index, or missing market index).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowIndexAnomaly {
    pub market: MarketSymbol,
    pub account: String,
    pub stored_borrow: Amount,
    pub account_borrow_index: Amount,
    pub market_borrow_index: Amount,
}

/// `stored * market_index / account_index`, floored to `decimals`.
///
/// Zero stays exactly zero and NaN stays NaN without touching the indexes.
/// `None` flags an inconsistent index state for a non-zero balance.
pub fn adjust_borrow(
    stored: &Amount,
    market_index: &Amount,
    account_index: &Amount,
    decimals: u32,
) -> Option<Amount> {
    if stored.is_nan() {
        return Some(Amount::NaN);
    }
    if stored.is_zero() {
        return Some(Amount::zero());
    }
    Amount::mul_div_floor(stored, market_index, account_index, decimals).ok()
}

// ---------------------------------------------------------------------------
// Subgraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAccounts {
    pub accounts: AccountsSnapshot,
    pub anomalies: Vec<BorrowIndexAnomaly>,
}

/// Normalize subgraph account rows.
///
/// With `keep_zero_balances` every tracked entry is retained, including
/// explicit zeros; otherwise only strictly positive legs are kept. An
/// anomalous borrow keeps its unadjusted stored value and is reported.
pub fn parse_subgraph_accounts(
    info: &MarketsInfo,
    accounts: &[SubgraphAccount],
    keep_zero_balances: bool,
) -> ParsedAccounts {
    let mut out = ParsedAccounts::default();

    for row in accounts {
        let account = normalize_account(&row.id);

        for token in &row.tokens {
            let symbol = symbol_for_onchain_ticker(&token.symbol);
            let Some(market) = lookup_market(info, symbol, &token.symbol) else {
                continue;
            };

            let entry = out.accounts.entry(symbol).or_default();

            let supply = Amount::parse_opt(token.total_supply_amount.as_deref());
            if keep_zero_balances || supply.is_positive() {
                entry.suppliers += 1;
                entry.accounts.entry(account.clone()).or_default().supply = supply;
            }

            let stored = Amount::parse_opt(token.stored_borrow_balance.as_deref());
            if keep_zero_balances || stored.is_positive() {
                let account_index = Amount::parse_opt(token.account_borrow_index.as_deref());
                let market_index = Amount::parse_opt(
                    token
                        .market
                        .as_ref()
                        .and_then(|m| m.borrow_index.as_deref()),
                );

                let borrow = match adjust_borrow(
                    &stored,
                    &market_index,
                    &account_index,
                    market.underlying_decimals,
                ) {
                    Some(adjusted) => adjusted,
                    None => {
                        warn!(
                            market = %symbol,
                            account = %account,
                            stored = %stored,
                            account_index = %account_index,
                            market_index = %market_index,
                            "inconsistent borrow index state; keeping stored balance"
                        );
                        out.anomalies.push(BorrowIndexAnomaly {
                            market: symbol,
                            account: account.clone(),
                            stored_borrow: stored.clone(),
                            account_borrow_index: account_index,
                            market_borrow_index: market_index,
                        });
                        stored
                    }
                };

                entry.borrowers += 1;
                entry.accounts.entry(account.clone()).or_default().borrow = borrow;
            }
        }
    }

    out
}

fn lookup_market<'a>(
    info: &'a MarketsInfo,
    symbol: MarketSymbol,
    raw: &str,
) -> Option<&'a MarketInfo> {
    let address = match symbol.address() {
        Some(a) => a,
        None => {
            debug!(ticker = raw, "unmapped market ticker; skipping");
            return None;
        }
    };
    let market = info.get(&address);
    if market.is_none() {
        warn!(market = %symbol, "no market info at this block; skipping");
    }
    market
}

/// Normalize subgraph market figures, keyed by canonical symbol.
pub fn parse_subgraph_markets(rows: &[SubgraphMarket]) -> BTreeMap<MarketSymbol, MarketValues> {
    let mut out = BTreeMap::new();

    for row in rows {
        let symbol = symbol_for_onchain_ticker(&row.symbol);
        let Some(address) = symbol.address() else {
            debug!(ticker = %row.symbol, "unmapped market ticker; skipping");
            continue;
        };

        out.insert(
            symbol,
            MarketValues {
                symbol,
                address,
                borrow_apy: Amount::parse_opt(row.borrow_rate_apy.as_deref()),
                supply_apy: Amount::parse_opt(row.supply_rate_apy.as_deref()),
                cash: Amount::parse_opt(row.cash.as_deref()),
                reserves: Amount::parse_opt(row.reserves.as_deref()),
                total_borrows: Amount::parse_opt(row.total_borrows.as_deref()),
                total_supply: Amount::parse_opt(row.total_supply.as_deref()),
                exchange_rate: Amount::parse_opt(row.exchange_rate.as_deref()),
                borrow_index: Amount::parse_opt(row.borrow_index.as_deref()),
            },
        );
    }

    out
}

/// Market configuration keyed by the registry address of each market.
pub fn parse_markets_info(rows: &[SubgraphMarketInfo]) -> MarketsInfo {
    let mut out = MarketsInfo::new();

    for row in rows {
        let symbol = symbol_for_onchain_ticker(&row.symbol);
        let Some(address) = symbol.address() else {
            debug!(ticker = %row.symbol, "unmapped market ticker; skipping");
            continue;
        };
        let Ok(underlying_decimals) = u32::try_from(row.underlying_decimals) else {
            warn!(market = %symbol, decimals = row.underlying_decimals, "implausible decimals; skipping");
            continue;
        };

        out.insert(
            address,
            MarketInfo {
                symbol,
                ticker: row.symbol.clone(),
                address,
                underlying_decimals,
                decimals: PROTOCOL_TOKEN_DECIMALS,
                suppliers_count: row.suppliers_count,
                borrowers_count: row.borrowers_count,
            },
        );
    }

    out
}

// ---------------------------------------------------------------------------
// Partner API
// ---------------------------------------------------------------------------

/// Normalize partner API accounts. Only strictly positive legs are kept;
/// markets are created on first sight even when every entry is zero.
pub fn parse_partner_accounts(accounts: &PartnerAccounts) -> AccountsSnapshot {
    let mut out = AccountsSnapshot::new();

    for (raw_account, balances) in accounts {
        let account = normalize_account(raw_account);

        for (name, value) in &balances.supply {
            let symbol = symbol_for_name(name);
            if !symbol.is_applicable() {
                debug!(market = %name, "unmapped partner market; skipping");
                continue;
            }
            let entry = out.entry(symbol).or_default();
            if value.is_positive() {
                entry.suppliers += 1;
                entry.accounts.entry(account.clone()).or_default().supply = value.clone();
            }
        }

        for (name, value) in &balances.borrows {
            let symbol = symbol_for_name(name);
            if !symbol.is_applicable() {
                debug!(market = %name, "unmapped partner market; skipping");
                continue;
            }
            let entry = out.entry(symbol).or_default();
            if value.is_positive() {
                entry.borrowers += 1;
                entry.accounts.entry(account.clone()).or_default().borrow = value.clone();
            }
        }
    }

    out
}
