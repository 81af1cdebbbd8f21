use std::time::Duration;

use anyhow::{Context, Result};
use lrc_api::{PartnerClient, ResponseCache, SubgraphClient};
use lrc_artifacts::ReportWriter;
use lrc_chain::{AlloyCaller, ContractCaller, ContractReader};
use lrc_config::ReconConfig;
use uuid::Uuid;

/// Everything one run needs to analyse blocks: the three data sources, the
/// response cache and the report writer.
///
/// The contract reader's account cache is not keyed by block; use
/// [`AnalysisContext::reset_block_state`] before moving to another block.
pub struct AnalysisContext<C> {
    pub(crate) config: ReconConfig,
    pub(crate) subgraph: SubgraphClient,
    pub(crate) partner: Option<PartnerClient>,
    pub(crate) reader: ContractReader<C>,
    pub(crate) responses: ResponseCache,
    pub(crate) reports: ReportWriter,
}

impl AnalysisContext<AlloyCaller> {
    /// Production wiring: JSON-RPC contract transport at `chain.rpc_url`.
    pub fn connect(config: ReconConfig, config_hash: &str) -> Result<Self> {
        let caller = AlloyCaller::connect(&config.chain.rpc_url)
            .context("failed to set up the JSON-RPC provider")?;
        Self::new(config, config_hash, caller)
    }
}

impl<C: ContractCaller> AnalysisContext<C> {
    pub fn new(config: ReconConfig, config_hash: &str, caller: C) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let subgraph = SubgraphClient::with_client(
            http.clone(),
            config.subgraph.url.clone(),
            config.subgraph.page_size,
        );
        let partner = config
            .partner
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .map(|url| PartnerClient::with_client(http.clone(), url));
        let reader = ContractReader::new(caller, config.chain.batch_size);
        let responses = ResponseCache::new(&config.output.cache_dir);
        let reports = ReportWriter::new(&config.output.report_dir, Uuid::new_v4(), config_hash);

        Ok(Self {
            config,
            subgraph,
            partner,
            reader,
            responses,
            reports,
        })
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn reader(&self) -> &ContractReader<C> {
        &self.reader
    }

    pub fn reports(&self) -> &ReportWriter {
        &self.reports
    }

    pub fn run_id(&self) -> Uuid {
        self.reports.run_id()
    }

    /// Drop every memoized contract read.
    pub fn reset_block_state(&self) {
        self.reader.clear_cache();
    }

    pub(crate) fn partner(&self) -> Result<&PartnerClient> {
        self.config.partner.require_url()?;
        self.partner
            .as_ref()
            .context("partner client is not configured")
    }
}
