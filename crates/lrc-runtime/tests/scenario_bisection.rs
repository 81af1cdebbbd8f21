use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lrc_runtime::{bisect_failing_block, BlockProbe};

/// Fails at and after `threshold`; blocks in `broken` error out instead.
struct ThresholdProbe {
    threshold: u64,
    broken: HashSet<u64>,
    probed: Vec<u64>,
    resets: usize,
}

impl ThresholdProbe {
    fn new(threshold: u64) -> Self {
        Self {
            threshold,
            broken: HashSet::new(),
            probed: Vec::new(),
            resets: 0,
        }
    }
}

#[async_trait]
impl BlockProbe for ThresholdProbe {
    fn reset(&mut self) {
        self.resets += 1;
    }

    async fn has_errors(&mut self, block: u64) -> Result<bool> {
        assert_eq!(self.resets, self.probed.len() + 1, "reset precedes every probe");
        self.probed.push(block);
        if self.broken.contains(&block) {
            return Err(anyhow!("rpc timeout at {block}"));
        }
        Ok(block >= self.threshold)
    }
}

#[tokio::test]
async fn finds_first_failing_block_for_every_threshold() {
    for threshold in 101..=200 {
        let mut probe = ThresholdProbe::new(threshold);
        let out = bisect_failing_block(&mut probe, 100, 200, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(out.first_failing_block, threshold);
        assert!(out.probes.len() <= 7, "log2(100) rounds up to 7 probes");
        assert!(probe.probed.iter().all(|b| *b > 100 && *b < 200));
    }
}

#[tokio::test]
async fn adjacent_bounds_need_no_probe() {
    let mut probe = ThresholdProbe::new(11);
    let out = bisect_failing_block(&mut probe, 10, 11, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(out.first_failing_block, 11);
    assert!(out.probes.is_empty());
    assert_eq!(probe.resets, 0);
}

#[tokio::test]
async fn inverted_bounds_are_rejected() {
    let mut probe = ThresholdProbe::new(5);
    assert!(bisect_failing_block(&mut probe, 20, 20, Duration::ZERO).await.is_err());
    assert!(bisect_failing_block(&mut probe, 30, 20, Duration::ZERO).await.is_err());
    assert!(probe.probed.is_empty());
}

#[tokio::test]
async fn failed_probe_counts_as_failing() {
    let mut probe = ThresholdProbe::new(190);
    probe.broken.insert(150);

    let out = bisect_failing_block(&mut probe, 100, 200, Duration::ZERO)
        .await
        .unwrap();

    // Everything below 150 is clean, so the broken block becomes the answer.
    assert_eq!(out.first_failing_block, 150);
    let record = out.probes.iter().find(|p| p.block == 150).unwrap();
    assert!(record.has_errors);
    assert!(record.failed);
}

#[tokio::test]
async fn midpoints_round_up() {
    let mut probe = ThresholdProbe::new(1_000);
    let out = bisect_failing_block(&mut probe, 0, 3, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(probe.probed, vec![2]);
    assert_eq!(out.first_failing_block, 3);
}

#[tokio::test(start_paused = true)]
async fn cooldown_only_between_probes() {
    let mut probe = ThresholdProbe::new(105);
    let started = tokio::time::Instant::now();

    let out = bisect_failing_block(&mut probe, 100, 108, Duration::from_secs(10))
        .await
        .unwrap();

    let gaps = out.probes.len() as u32 - 1;
    assert_eq!(out.first_failing_block, 105);
    assert_eq!(started.elapsed(), Duration::from_secs(10) * gaps);
}
