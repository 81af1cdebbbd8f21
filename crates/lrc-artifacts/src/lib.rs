//! lrc-artifacts
//!
//! Report Writer. Every report is a pretty-printed JSON file wrapped in a
//! [`ReportEnvelope`] that names the block, the run and the config hash.
//!
//! Layout under the report root:
//! - `marketAnalysis-<block>.json`
//! - `<mode>/accountAnalysis-<block>.json`
//! - `diffDump-<block>.json`
//! - `missingAnalysis-<block>.json`

mod reports;

pub use reports::{
    render_account_summary, render_markets_summary, render_missing_summary, AccountsReport,
    MarketAccountsReport, MissingReport,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lrc_reconcile::{AccountCheckMode, AccountsDiff, MarketsComparison};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope<T> {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub block: u64,
    pub config_hash: String,
    pub created_at_utc: DateTime<Utc>,
    pub report: T,
}

/// Writes the reports of one run. Existing files for the same block are
/// overwritten.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    root: PathBuf,
    run_id: Uuid,
    config_hash: String,
}

impl ReportWriter {
    pub fn new(root: impl Into<PathBuf>, run_id: Uuid, config_hash: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            run_id,
            config_hash: config_hash.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn market_analysis_path(&self, block: u64) -> PathBuf {
        self.root.join(format!("marketAnalysis-{block}.json"))
    }

    pub fn account_analysis_path(&self, block: u64, mode: AccountCheckMode) -> PathBuf {
        self.root
            .join(mode.as_str())
            .join(format!("accountAnalysis-{block}.json"))
    }

    pub fn diff_dump_path(&self, block: u64) -> PathBuf {
        self.root.join(format!("diffDump-{block}.json"))
    }

    pub fn missing_analysis_path(&self, block: u64) -> PathBuf {
        self.root.join(format!("missingAnalysis-{block}.json"))
    }

    pub fn write_market_analysis(&self, block: u64, report: &MarketsComparison) -> Result<PathBuf> {
        self.write(self.market_analysis_path(block), block, report)
    }

    pub fn write_account_analysis(&self, block: u64, report: &AccountsReport) -> Result<PathBuf> {
        self.write(self.account_analysis_path(block, report.mode), block, report)
    }

    pub fn write_diff_dump(&self, block: u64, diff: &AccountsDiff) -> Result<PathBuf> {
        self.write(self.diff_dump_path(block), block, diff)
    }

    pub fn write_missing_analysis(&self, block: u64, report: &MissingReport) -> Result<PathBuf> {
        self.write(self.missing_analysis_path(block), block, report)
    }

    fn write<T: Serialize>(&self, path: PathBuf, block: u64, report: &T) -> Result<PathBuf> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create report dir failed: {}", dir.display()))?;
        }

        let envelope = ReportEnvelope {
            schema_version: SCHEMA_VERSION,
            run_id: self.run_id,
            block,
            config_hash: self.config_hash.clone(),
            created_at_utc: Utc::now(),
            report,
        };
        let json = serde_json::to_string_pretty(&envelope).context("serialize report failed")?;
        fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("write report failed: {}", path.display()))?;

        info!(path = %path.display(), block, "report written");
        Ok(path)
    }
}
