use std::collections::BTreeMap;

use lrc_decimal::Amount;
use lrc_markets::{MarketField, MarketSymbol, MarketValues};

use crate::{FieldComparison, MarketComparison, MarketsComparison, ReconcileError};

/// Exact equality; NaN on either side is a mismatch.
pub fn compare_field(api: &Amount, contract: &Amount) -> FieldComparison {
    FieldComparison::new(api.equals(contract), api, contract)
}

/// Compare every API market against its contract figures.
///
/// Every market in `api` must have a counterpart in `contract`.
pub fn compare_market_values(
    api: &BTreeMap<MarketSymbol, MarketValues>,
    contract: &BTreeMap<MarketSymbol, MarketValues>,
) -> Result<MarketsComparison, ReconcileError> {
    let mut out = MarketsComparison {
        ok: true,
        markets: BTreeMap::new(),
    };

    for (symbol, api_values) in api {
        let contract_values = contract
            .get(symbol)
            .ok_or(ReconcileError::MissingContractValues(*symbol))?;

        let mut market_ok = true;
        let mut fields = BTreeMap::new();
        for field in MarketField::ALL {
            let cmp = compare_field(field.get(api_values), field.get(contract_values));
            market_ok &= cmp.ok;
            fields.insert(field, cmp.message);
        }

        out.ok &= market_ok;
        out.markets.insert(
            *symbol,
            MarketComparison {
                ok: market_ok,
                fields,
            },
        );
    }

    Ok(out)
}
