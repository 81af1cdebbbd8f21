use std::collections::BTreeMap;

use lrc_decimal::Amount;
use lrc_markets::{AccountBalance, MarketInfo, RawSnapshots};

use crate::{AccountValuesAnalysis, LegAnalysis, LegOutcome, ReconcileError};

/// Classify one leg. Exactly one outcome applies to any pair.
pub fn classify_leg(api: &Amount, contract: &Amount) -> LegOutcome {
    if api.matches(contract) {
        return if api.is_positive() {
            LegOutcome::Right
        } else {
            LegOutcome::Uncounted
        };
    }

    match (api.is_empty(), contract.is_empty()) {
        (false, true) => LegOutcome::Wrongful,
        (true, false) => LegOutcome::Missing,
        _ => {
            // Both non-empty, hence both numbers.
            let diff = api.checked_sub(contract).unwrap_or(Amount::NaN);
            LegOutcome::WrongValue {
                api: api.clone(),
                contract: contract.clone(),
                diff,
            }
        }
    }
}

/// Check every API account of one market against its contract snapshot.
///
/// Raw contract integers are shifted here: borrow by the underlying
/// decimals, supply by the protocol-token decimals. `contract` must hold a
/// snapshot for every account in `api_accounts`.
pub fn find_wrongful_balance_accounts(
    market: &MarketInfo,
    api_accounts: &BTreeMap<String, AccountBalance>,
    contract: &RawSnapshots,
) -> Result<AccountValuesAnalysis, ReconcileError> {
    let mut borrows = LegAnalysis::with_expected(market.borrowers_count);
    let mut supplies = LegAnalysis::with_expected(market.suppliers_count);

    for (account, api) in api_accounts {
        let raw = contract
            .get(account)
            .ok_or_else(|| ReconcileError::MissingSnapshot {
                market: market.symbol,
                account: account.clone(),
            })?;

        let contract_borrow = Amount::from_raw(&raw.borrow, market.underlying_decimals);
        let contract_supply = Amount::from_raw(&raw.supply, market.decimals);

        borrows.record(account, classify_leg(&api.borrow, &contract_borrow));
        supplies.record(account, classify_leg(&api.supply, &contract_supply));

        if contract_borrow.is_positive() {
            borrows.contract_active.push(account.clone());
        }
        if contract_supply.is_positive() {
            supplies.contract_active.push(account.clone());
        }
    }

    Ok(AccountValuesAnalysis {
        market: market.symbol,
        borrows,
        supplies,
    })
}
