use std::time::Duration;

use anyhow::{bail, Context, Result};
use lrc_artifacts::{render_account_summary, render_markets_summary, render_missing_summary};
use lrc_chain::AlloyCaller;
use lrc_config::{load_recon_config, ReconConfig};
use lrc_reconcile::AccountCheckMode;
use lrc_runtime::{bisect_failing_block, AccountsProbe, AnalysisContext, BlockProbe, MarketsProbe};

fn open(config_paths: &[String]) -> Result<(ReconConfig, AnalysisContext<AlloyCaller>)> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let (loaded, cfg) = load_recon_config(&path_refs)?;
    let ctx = AnalysisContext::connect(cfg.clone(), &loaded.config_hash)?;

    println!("run_id={}", ctx.run_id());
    println!("config_hash={}", loaded.config_hash);
    Ok((cfg, ctx))
}

pub async fn markets(config_paths: &[String], block: Option<u64>, bisect: bool) -> Result<()> {
    let (cfg, ctx) = open(config_paths)?;
    let block = block.unwrap_or(cfg.bisection.known_bad_block);
    println!("block={block}");

    let out = ctx.analyse_markets(block).await?;
    print!("{}", render_markets_summary(&out.comparison));
    println!("report={}", out.report_path.display());
    println!("has_errors={}", out.has_errors());

    if bisect && out.has_errors() {
        run_bisection(&mut MarketsProbe::new(&ctx), &cfg, block).await?;
    }
    Ok(())
}

pub async fn accounts(
    config_paths: &[String],
    block: Option<u64>,
    mode: AccountCheckMode,
    bisect: bool,
) -> Result<()> {
    let (cfg, ctx) = open(config_paths)?;
    let block = block.unwrap_or(cfg.bisection.known_bad_block);
    println!("block={block}");
    println!("mode={mode}");

    let out = ctx.analyse_accounts(block, mode).await?;
    for analysis in &out.analyses {
        print!("{}", render_account_summary(analysis));
    }
    println!("borrow_index_anomalies={}", out.anomalies.len());
    println!("report={}", out.report_path.display());
    println!("has_errors={}", out.has_errors());

    if bisect && out.has_errors() {
        run_bisection(&mut AccountsProbe::new(&ctx, mode), &cfg, block).await?;
    }
    Ok(())
}

pub async fn compare_sources(config_paths: &[String], block: Option<u64>) -> Result<()> {
    let (cfg, ctx) = open(config_paths)?;
    let block = block.unwrap_or(cfg.bisection.known_bad_block);
    println!("block={block}");

    let out = ctx.compare_sources(block).await?;
    for d in out.diff.values() {
        println!(
            "{}: subgraph_only borrowers={} suppliers={} | partner_only borrowers={} suppliers={}",
            d.market,
            d.first_only_borrowers.len(),
            d.first_only_suppliers.len(),
            d.second_only_borrowers.len(),
            d.second_only_suppliers.len(),
        );
    }
    print!("{}", render_missing_summary(&out.missing));
    println!("diff_report={}", out.diff_path.display());
    println!("missing_report={}", out.missing_path.display());
    println!("has_wrongful={}", out.missing.has_wrongful);
    Ok(())
}

/// `block` has just been seen failing, so it is the upper bound.
async fn run_bisection<P: BlockProbe>(probe: &mut P, cfg: &ReconConfig, block: u64) -> Result<()> {
    let good = cfg.bisection.known_good_block;
    if block <= good {
        bail!("block {block} is not above bisection.known_good_block ({good}); nothing to bisect");
    }

    let outcome = bisect_failing_block(
        probe,
        good,
        block,
        Duration::from_secs(cfg.bisection.cooldown_secs),
    )
    .await
    .context("bisection failed")?;

    for p in &outcome.probes {
        println!("probe block={} has_errors={} failed={}", p.block, p.has_errors, p.failed);
    }
    println!("first_failing_block={}", outcome.first_failing_block);
    Ok(())
}
