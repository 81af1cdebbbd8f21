//! Per-block analyses. Each one fetches its inputs, compares them, writes its
//! report and returns the outcome. Any fetch or read failure aborts the whole
//! analysis of that block.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use lrc_api::{
    parse_markets_info, parse_partner_accounts, parse_subgraph_accounts, parse_subgraph_markets,
    BorrowIndexAnomaly, GRAPH_ACCOUNTS, GRAPH_MARKETS, PARTNER_ACCOUNTS,
};
use lrc_artifacts::{AccountsReport, MissingReport};
use lrc_chain::ContractCaller;
use lrc_markets::{MarketSymbol, MarketValues, MarketsInfo};
use lrc_reconcile::{
    compare_accounts, compare_market_values, find_wrongful_balance_accounts,
    resolve_market_missing, AccountCheckMode, AccountValuesAnalysis, AccountsDiff,
    MarketMissingAnalysis, MarketsComparison,
};
use tracing::{debug, info, warn};

use crate::context::AnalysisContext;

#[derive(Debug, Clone)]
pub struct MarketsOutcome {
    pub block: u64,
    pub comparison: MarketsComparison,
    pub report_path: PathBuf,
}

impl MarketsOutcome {
    pub fn has_errors(&self) -> bool {
        !self.comparison.ok
    }
}

#[derive(Debug, Clone)]
pub struct AccountsOutcome {
    pub block: u64,
    pub mode: AccountCheckMode,
    pub analyses: Vec<AccountValuesAnalysis>,
    pub anomalies: Vec<BorrowIndexAnomaly>,
    pub report: AccountsReport,
    pub report_path: PathBuf,
}

impl AccountsOutcome {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

#[derive(Debug, Clone)]
pub struct SourcesOutcome {
    pub block: u64,
    /// First source is the subgraph, second the partner API.
    pub diff: AccountsDiff,
    pub missing: MissingReport,
    pub diff_path: PathBuf,
    pub missing_path: PathBuf,
}

impl<C: ContractCaller> AnalysisContext<C> {
    async fn markets_info(&self, block: u64) -> Result<MarketsInfo> {
        let rows = self
            .subgraph
            .fetch_markets_info(block)
            .await
            .with_context(|| format!("fetch markets info at block {block}"))?;
        Ok(parse_markets_info(&rows))
    }

    /// Subgraph market figures vs. the contracts, all at `block`.
    ///
    /// Markets without on-chain configuration at `block` are left out.
    pub async fn analyse_markets(&self, block: u64) -> Result<MarketsOutcome> {
        let rows = self
            .responses
            .get_or_fetch(GRAPH_MARKETS, block, || self.subgraph.fetch_markets(block))
            .await
            .with_context(|| format!("fetch subgraph markets at block {block}"))?;
        let info = self.markets_info(block).await?;

        let mut api = parse_subgraph_markets(&rows);
        api.retain(|symbol, values| {
            let known = info.contains_key(&values.address);
            if !known {
                warn!(market = %symbol, block, "market has no info at this block; not compared");
            }
            known
        });

        let reads = info
            .values()
            .filter(|m| api.contains_key(&m.symbol))
            .map(|m| async move { self.reader.get_market_values(block, m).await });
        let contract: BTreeMap<MarketSymbol, MarketValues> = try_join_all(reads)
            .await
            .with_context(|| format!("read market values at block {block}"))?
            .into_iter()
            .map(|v| (v.symbol, v))
            .collect();

        let comparison = compare_market_values(&api, &contract)?;
        let report_path = self.reports.write_market_analysis(block, &comparison)?;

        info!(block, ok = comparison.ok, markets = comparison.markets.len(), "markets analysed");
        Ok(MarketsOutcome {
            block,
            comparison,
            report_path,
        })
    }

    /// Every subgraph account vs. its contract snapshot, per market.
    pub async fn analyse_accounts(
        &self,
        block: u64,
        mode: AccountCheckMode,
    ) -> Result<AccountsOutcome> {
        let rows = self
            .responses
            .get_or_fetch(GRAPH_ACCOUNTS, block, || self.subgraph.fetch_accounts(block))
            .await
            .with_context(|| format!("fetch subgraph accounts at block {block}"))?;
        let info = self.markets_info(block).await?;

        let parsed = parse_subgraph_accounts(&info, &rows, true);
        if !parsed.anomalies.is_empty() {
            warn!(block, count = parsed.anomalies.len(), "borrow index anomalies");
        }

        let mut report = AccountsReport::new(mode);
        let mut analyses = Vec::with_capacity(parsed.accounts.len());

        for (symbol, market) in &parsed.accounts {
            let Some(market_info) = symbol.address().and_then(|a| info.get(&a)) else {
                continue;
            };

            let snapshots = self
                .reader
                .get_account_snapshots(block, market_info.address, market.accounts.keys().cloned())
                .await
                .with_context(|| format!("read {symbol} account snapshots at block {block}"))?;

            let analysis = find_wrongful_balance_accounts(market_info, &market.accounts, &snapshots)?;
            debug!(
                market = %symbol,
                block,
                has_errors = analysis.has_errors(mode),
                "market accounts analysed"
            );
            report.push(&analysis, self.config.output.include_right_accounts);
            analyses.push(analysis);
        }

        let report_path = self.reports.write_account_analysis(block, &report)?;
        info!(block, mode = %mode, has_errors = report.has_errors(), "accounts analysed");

        Ok(AccountsOutcome {
            block,
            mode,
            analyses,
            anomalies: parsed.anomalies,
            report,
            report_path,
        })
    }

    /// Subgraph vs. partner API account sets, with the contract deciding who
    /// is right about each exclusive account.
    pub async fn compare_sources(&self, block: u64) -> Result<SourcesOutcome> {
        let partner = self.partner()?;

        let (graph_rows, partner_rows, info) = tokio::try_join!(
            async {
                self.responses
                    .get_or_fetch(GRAPH_ACCOUNTS, block, || self.subgraph.fetch_accounts(block))
                    .await
                    .with_context(|| format!("fetch subgraph accounts at block {block}"))
            },
            async {
                self.responses
                    .get_or_fetch(PARTNER_ACCOUNTS, block, || partner.fetch_accounts(block))
                    .await
                    .with_context(|| format!("fetch partner accounts at block {block}"))
            },
            self.markets_info(block),
        )?;

        let first = parse_subgraph_accounts(&info, &graph_rows, false).accounts;
        let second = parse_partner_accounts(&partner_rows);

        let diff = compare_accounts(&first, &second);
        let diff_path = self.reports.write_diff_dump(block, &diff)?;

        let mut analyses: Vec<MarketMissingAnalysis> = Vec::with_capacity(diff.len());
        for market_diff in diff.values() {
            let Some(address) = market_diff.market_address else {
                continue;
            };

            let accounts: BTreeSet<String> = market_diff
                .first_only_borrowers
                .iter()
                .chain(&market_diff.first_only_suppliers)
                .chain(&market_diff.second_only_borrowers)
                .chain(&market_diff.second_only_suppliers)
                .cloned()
                .collect();

            let snapshots = self
                .reader
                .get_account_snapshots(block, address, accounts)
                .await
                .with_context(|| {
                    format!("read {} account snapshots at block {block}", market_diff.market)
                })?;
            analyses.push(resolve_market_missing(market_diff, &snapshots)?);
        }

        let missing = MissingReport::from_analyses(analyses);
        let missing_path = self.reports.write_missing_analysis(block, &missing)?;
        info!(block, has_wrongful = missing.has_wrongful, "sources compared");

        Ok(SourcesOutcome {
            block,
            diff,
            missing,
            diff_path,
            missing_path,
        })
    }
}
