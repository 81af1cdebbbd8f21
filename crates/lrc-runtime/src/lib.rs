//! lrc-runtime
//!
//! Orchestration: wires the configured sources into an [`AnalysisContext`],
//! runs the per-block analyses and drives the bisection search for the first
//! block at which a source diverges from the chain.
//!
//! Analyses:
//! - [`AnalysisContext::analyse_markets`]: subgraph market figures vs. contracts
//! - [`AnalysisContext::analyse_accounts`]: subgraph account balances vs. contracts
//! - [`AnalysisContext::compare_sources`]: subgraph vs. partner API account sets

mod analysis;
mod bisect;
mod context;

pub use analysis::{AccountsOutcome, MarketsOutcome, SourcesOutcome};
pub use bisect::{
    bisect_failing_block, AccountsProbe, BisectionOutcome, BlockProbe, MarketsProbe, ProbeRecord,
};
pub use context::AnalysisContext;
