//! Report payloads and their console summaries.

use std::collections::BTreeMap;

use lrc_markets::{MarketField, MarketSymbol};
use lrc_reconcile::{
    AccountCheckMode, AccountValuesAnalysis, MarketMissingAnalysis, MarketsComparison, WrongValue,
};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Account analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAccountsReport {
    pub api_borrowers_count: u64,
    pub api_suppliers_count: u64,
    pub has_errors: bool,
    pub borrows: String,
    pub supplies: String,
    pub wrongful_borrowers: Vec<String>,
    pub wrongful_suppliers: Vec<String>,
    pub wrong_value_borrowers: Vec<WrongValue>,
    pub wrong_value_suppliers: Vec<WrongValue>,
    pub missing_borrowers: Vec<String>,
    pub missing_suppliers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rightful_borrowers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rightful_suppliers: Option<Vec<String>>,
}

/// Per-market account reconciliation of one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsReport {
    pub mode: AccountCheckMode,
    pub markets: BTreeMap<MarketSymbol, MarketAccountsReport>,
}

impl AccountsReport {
    pub fn new(mode: AccountCheckMode) -> Self {
        Self {
            mode,
            markets: BTreeMap::new(),
        }
    }

    /// Right-account lists are large and rarely needed; they are only kept
    /// when `include_right` is set.
    pub fn push(&mut self, analysis: &AccountValuesAnalysis, include_right: bool) {
        let b = &analysis.borrows;
        let s = &analysis.supplies;
        let right = |v: &Vec<String>| include_right.then(|| v.clone());

        self.markets.insert(
            analysis.market,
            MarketAccountsReport {
                api_borrowers_count: b.expected_count,
                api_suppliers_count: s.expected_count,
                has_errors: analysis.has_errors(self.mode),
                borrows: analysis.borrower_message(),
                supplies: analysis.supplier_message(),
                wrongful_borrowers: b.wrongful.clone(),
                wrongful_suppliers: s.wrongful.clone(),
                wrong_value_borrowers: b.wrong_value.clone(),
                wrong_value_suppliers: s.wrong_value.clone(),
                missing_borrowers: b.missing.clone(),
                missing_suppliers: s.missing.clone(),
                rightful_borrowers: right(&b.right),
                rightful_suppliers: right(&s.right),
            },
        );
    }

    pub fn has_errors(&self) -> bool {
        self.markets.values().any(|m| m.has_errors)
    }
}

// ---------------------------------------------------------------------------
// Missing-account analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingReport {
    pub has_wrongful: bool,
    pub markets: BTreeMap<MarketSymbol, MarketMissingAnalysis>,
}

impl MissingReport {
    pub fn from_analyses<I>(analyses: I) -> Self
    where
        I: IntoIterator<Item = MarketMissingAnalysis>,
    {
        let markets: BTreeMap<_, _> = analyses.into_iter().map(|a| (a.market, a)).collect();
        let has_wrongful = markets
            .values()
            .any(|a| a.missing_from_first.has_wrongful() || a.missing_from_second.has_wrongful());
        Self {
            has_wrongful,
            markets,
        }
    }
}

// ---------------------------------------------------------------------------
// Console summaries
// ---------------------------------------------------------------------------

/// One block per market: the market name, then one `field: message` line per
/// compared field in fixed order.
pub fn render_markets_summary(cmp: &MarketsComparison) -> String {
    let mut out = String::new();
    for (symbol, market) in &cmp.markets {
        out.push_str(&format!("{symbol}\n"));
        for field in MarketField::ALL {
            if let Some(msg) = market.fields.get(&field) {
                out.push_str(&format!("  {}: {msg}\n", field.as_str()));
            }
        }
    }
    out
}

pub fn render_account_summary(analysis: &AccountValuesAnalysis) -> String {
    let indent = |s: String| {
        s.lines()
            .map(|l| format!("    {l}\n"))
            .collect::<String>()
    };
    format!(
        "{}\n  Borrows\n{}  Supplies\n{}",
        analysis.market,
        indent(analysis.borrower_message()),
        indent(analysis.supplier_message()),
    )
}

/// `wrongful/total` for each side and leg.
pub fn render_missing_summary(report: &MissingReport) -> String {
    let mut out = String::new();
    for (symbol, a) in &report.markets {
        out.push_str(&format!(
            "{symbol}: missing_from_first borrowers={} suppliers={} | missing_from_second borrowers={} suppliers={}\n",
            a.missing_from_first.borrowers.message(),
            a.missing_from_first.suppliers.message(),
            a.missing_from_second.borrowers.message(),
            a.missing_from_second.suppliers.message(),
        ));
    }
    out
}
