use std::collections::BTreeSet;

use lrc_markets::{AccountsSnapshot, MarketAccounts, MarketSymbol, RawSnapshots};
use num_bigint::Sign;

use crate::{
    AccountsDiff, MarketDiff, MarketMissingAnalysis, MissingResolution, ReconcileError,
    SideMissing,
};

/// Members of `a` not in `b`, sorted.
pub fn exclusive(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.difference(b).cloned().collect()
}

fn positive_sets(market: Option<&MarketAccounts>) -> (BTreeSet<String>, BTreeSet<String>) {
    match market {
        Some(m) => (
            m.positive_borrowers().cloned().collect(),
            m.positive_suppliers().cloned().collect(),
        ),
        None => (BTreeSet::new(), BTreeSet::new()),
    }
}

/// Per-market symmetric difference of strictly positive borrowers and
/// suppliers between two sources. Covers the union of both sides' markets.
pub fn compare_accounts(first: &AccountsSnapshot, second: &AccountsSnapshot) -> AccountsDiff {
    let markets: BTreeSet<MarketSymbol> = first
        .keys()
        .chain(second.keys())
        .copied()
        .filter(MarketSymbol::is_applicable)
        .collect();

    let mut out = AccountsDiff::new();
    for market in markets {
        let (first_borrowers, first_suppliers) = positive_sets(first.get(&market));
        let (second_borrowers, second_suppliers) = positive_sets(second.get(&market));

        out.insert(
            market,
            MarketDiff {
                market,
                market_address: market.address(),
                first_only_borrowers: exclusive(&first_borrowers, &second_borrowers),
                first_only_suppliers: exclusive(&first_suppliers, &second_suppliers),
                second_only_borrowers: exclusive(&second_borrowers, &first_borrowers),
                second_only_suppliers: exclusive(&second_suppliers, &first_suppliers),
            },
        );
    }
    out
}

/// Arbitrate one side's exclusive accounts with their contract snapshots.
///
/// Returns `(borrowers, suppliers)`. Non-zero raw balance means wrongful.
pub fn resolve_missing(
    market: MarketSymbol,
    borrowers: &[String],
    suppliers: &[String],
    contract: &RawSnapshots,
) -> Result<(MissingResolution, MissingResolution), ReconcileError> {
    let lookup = |account: &String| {
        contract
            .get(account)
            .ok_or_else(|| ReconcileError::MissingSnapshot {
                market,
                account: account.clone(),
            })
    };

    let mut b = MissingResolution::default();
    for account in borrowers {
        if lookup(account)?.borrow.sign() == Sign::Plus {
            b.wrongful.push(account.clone());
        } else {
            b.rightful.push(account.clone());
        }
    }

    let mut s = MissingResolution::default();
    for account in suppliers {
        if lookup(account)?.supply.sign() == Sign::Plus {
            s.wrongful.push(account.clone());
        } else {
            s.rightful.push(account.clone());
        }
    }

    Ok((b, s))
}

/// Both directions of one market's diff.
pub fn resolve_market_missing(
    diff: &MarketDiff,
    contract: &RawSnapshots,
) -> Result<MarketMissingAnalysis, ReconcileError> {
    let (borrowers, suppliers) = resolve_missing(
        diff.market,
        &diff.second_only_borrowers,
        &diff.second_only_suppliers,
        contract,
    )?;
    let missing_from_first = SideMissing {
        borrowers,
        suppliers,
    };

    let (borrowers, suppliers) = resolve_missing(
        diff.market,
        &diff.first_only_borrowers,
        &diff.first_only_suppliers,
        contract,
    )?;
    let missing_from_second = SideMissing {
        borrowers,
        suppliers,
    };

    Ok(MarketMissingAnalysis {
        market: diff.market,
        missing_from_first,
        missing_from_second,
    })
}
