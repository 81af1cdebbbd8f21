use std::time::Duration;

use anyhow::{ensure, Result};
use async_trait::async_trait;
use lrc_chain::ContractCaller;
use lrc_reconcile::AccountCheckMode;
use serde::Serialize;
use tracing::{info, warn};

use crate::context::AnalysisContext;

/// A per-block "did anything mismatch" question.
#[async_trait]
pub trait BlockProbe: Send {
    /// Forget every memoized read before the next block is probed.
    fn reset(&mut self);

    async fn has_errors(&mut self, block: u64) -> Result<bool>;
}

/// Market-value analysis as a probe. Writes a report per probed block.
pub struct MarketsProbe<'a, C> {
    ctx: &'a AnalysisContext<C>,
}

impl<'a, C> MarketsProbe<'a, C> {
    pub fn new(ctx: &'a AnalysisContext<C>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl<C: ContractCaller> BlockProbe for MarketsProbe<'_, C> {
    fn reset(&mut self) {
        self.ctx.reset_block_state();
    }

    async fn has_errors(&mut self, block: u64) -> Result<bool> {
        Ok(self.ctx.analyse_markets(block).await?.has_errors())
    }
}

/// Account analysis in the given mode as a probe.
pub struct AccountsProbe<'a, C> {
    ctx: &'a AnalysisContext<C>,
    mode: AccountCheckMode,
}

impl<'a, C> AccountsProbe<'a, C> {
    pub fn new(ctx: &'a AnalysisContext<C>, mode: AccountCheckMode) -> Self {
        Self { ctx, mode }
    }
}

#[async_trait]
impl<C: ContractCaller> BlockProbe for AccountsProbe<'_, C> {
    fn reset(&mut self) {
        self.ctx.reset_block_state();
    }

    async fn has_errors(&mut self, block: u64) -> Result<bool> {
        Ok(self.ctx.analyse_accounts(block, self.mode).await?.has_errors())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    pub block: u64,
    pub has_errors: bool,
    /// The probe itself failed; counted as "has errors".
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BisectionOutcome {
    pub first_failing_block: u64,
    pub probes: Vec<ProbeRecord>,
}

/// `ceil((low + high) / 2)` without overflow.
fn upper_mid(low: u64, high: u64) -> u64 {
    low + (high - low).div_ceil(2)
}

/// Smallest block in `(good, bad]` at which `probe` reports errors, assuming
/// the predicate is monotone (clean up to some block, failing from then on).
///
/// `bad` itself is never probed; the caller has already seen it fail. A
/// probe that errors out counts as failing. `cooldown` is slept between
/// consecutive probes.
pub async fn bisect_failing_block<P>(
    probe: &mut P,
    good: u64,
    bad: u64,
    cooldown: Duration,
) -> Result<BisectionOutcome>
where
    P: BlockProbe + ?Sized,
{
    ensure!(
        good < bad,
        "bisection needs known_good_block < known_bad_block (got {good} and {bad})"
    );

    let (mut low, mut high) = (good, bad);
    let mut probes: Vec<ProbeRecord> = Vec::new();
    let mut mid = upper_mid(low, high);

    while mid != high {
        if !probes.is_empty() && !cooldown.is_zero() {
            tokio::time::sleep(cooldown).await;
        }

        probe.reset();
        let (has_errors, failed) = match probe.has_errors(mid).await {
            Ok(v) => (v, false),
            Err(err) => {
                warn!(block = mid, error = %format!("{err:#}"), "probe failed; treating block as failing");
                (true, true)
            }
        };
        probes.push(ProbeRecord {
            block: mid,
            has_errors,
            failed,
        });

        if has_errors {
            high = mid;
        } else {
            low = mid;
        }
        info!(block = mid, has_errors, low, high, "bisection step");
        mid = upper_mid(low, high);
    }

    info!(first_failing_block = high, probes = probes.len(), "bisection finished");
    Ok(BisectionOutcome {
        first_failing_block: high,
        probes,
    })
}
