use chrono::Utc;
use std::time::Instant;
use tracing::info;

use crate::analysis::flow::{self, WeeklyBucket};
use crate::analysis::{health, projection, summary};
use crate::config::Config;
use crate::core::EventKind;
use crate::core::amount::SeededEstimator;
use crate::core::balance::BalanceVerifier;
use crate::core::classify::SignatureClassifier;
use crate::core::scan::{DirectionSummary, WindowScanner};
use crate::error::Result;
use crate::report::{ContractsInfo, HealthReport, StakingAnalysis, TokenInfo, UnstakingAnalysis};
use crate::rpc::LedgerPort;

/// Run the full health check: verify balance, scan the window, aggregate
/// flows, score, project, compose. One report per invocation; every
/// stage after the scan is a pure function of the collected data.
pub async fn run_health_check<L: LedgerPort>(ledger: &L, config: &Config) -> Result<HealthReport> {
    config.validate()?;
    let started = Instant::now();
    let window_days = config.analysis.window_days;

    info!("Phase 1: staked balance verification");
    let verifier = BalanceVerifier::new(
        ledger,
        &config.contracts.token,
        &config.contracts.staking,
        config.token.total_supply,
        config.token.decimals,
    );
    let fallback = config.token.fallback_balance;
    let balance = verifier.verify(|| fallback).await;

    info!("Phase 2: scanning stake/unstake events ({window_days} days)");
    let classifier = SignatureClassifier::new(&config.contracts.staking, &config.selectors);
    let resolver = SeededEstimator;
    let scanner = WindowScanner::new(
        ledger,
        &classifier,
        &resolver,
        config.scan.stride,
        config.scan.concurrency,
    );

    let latest = ledger.latest_block_number().await?;
    let window_blocks = window_days as u64 * config.scan.blocks_per_day;
    let from_block = latest.saturating_sub(window_blocks);
    info!("Block range: {from_block} -> {latest}");

    let outcome = scanner.scan(from_block, latest).await;
    info!(
        "Scan complete: {} stake / {} unstake events over {} blocks",
        outcome.stake_events.len(),
        outcome.unstake_events.len(),
        outcome.blocks_scanned
    );

    let staking_summary =
        DirectionSummary::for_stakes(&outcome.stake_events, window_days, outcome.blocks_scanned);
    let unstaking_summary = DirectionSummary::for_unstakes(
        &outcome.unstake_events,
        window_days,
        outcome.blocks_scanned,
    );

    info!("Phase 3: flow comparison");
    let weekly = weekly_breakdown(&scanner, config, latest).await;
    let flow = flow::aggregate(
        &staking_summary,
        &unstaking_summary,
        balance.balance_tokens,
        weekly,
    );
    info!(
        "Events: {} stake vs {} unstake (net {:+}), trend {}",
        flow.stake_events,
        flow.unstake_events,
        flow.net_events,
        flow.trend.label()
    );

    info!("Phase 4: health metrics");
    let health_metrics = health::score(&balance, &flow);
    info!(
        "Health: {} {} (avg factor {:.2})",
        health_metrics.grade.emoji(),
        health_metrics.grade.label(),
        health_metrics.average_score
    );

    info!("Phase 5: projections and selling pressure");
    let projections = projection::project(&flow, &balance, &outcome.unstake_events);
    info!(
        "14-day pressure: {:.0} tokens ({:.2}%), intensity {}",
        projections.selling_pressure.total_pressure_14_days,
        projections.selling_pressure.pressure_percentage_of_staked,
        projections.selling_pressure.intensity.label()
    );

    info!("Phase 6: executive summary");
    let executive_summary = summary::compose(&health_metrics, &flow, &projections);

    Ok(HealthReport {
        analysis_timestamp: Utc::now(),
        execution_time_seconds: started.elapsed().as_secs_f64(),
        contracts: ContractsInfo {
            staking_contract: config.contracts.staking.to_lowercase(),
            token_contract: config.contracts.token.to_lowercase(),
        },
        analysis_period_days: window_days,
        token_info: TokenInfo {
            total_supply: config.token.total_supply,
            decimals: config.token.decimals,
        },
        balance_data: balance,
        staking_analysis: StakingAnalysis {
            summary: staking_summary,
            events: outcome.stake_events,
        },
        unstaking_analysis: UnstakingAnalysis {
            summary: unstaking_summary,
            events: outcome.unstake_events,
        },
        flow_analysis: flow,
        health_metrics,
        projections,
        executive_summary,
    })
}

/// Count stake/unstake events per 7-day sub-window, newest first, then
/// re-index ascending so week 1 is the oldest bucket. This is a second
/// counting pass with its own stride rather than a re-bucketing of the
/// main scan's events.
async fn weekly_breakdown<L: LedgerPort>(
    scanner: &WindowScanner<'_, L>,
    config: &Config,
    latest: u64,
) -> Vec<WeeklyBucket> {
    let weeks = flow::weeks_for(config.analysis.window_days);
    let week_blocks = 7 * config.scan.blocks_per_day;
    let mut buckets = Vec::with_capacity(weeks as usize);

    for week in 0..weeks as u64 {
        let start = latest.saturating_sub((week + 1) * week_blocks);
        let end = latest.saturating_sub(week * week_blocks);
        let stakes = scanner
            .count_matching(start, end, EventKind::Stake, config.scan.weekly_stride)
            .await;
        let unstakes = scanner
            .count_matching(start, end, EventKind::Unstake, config.scan.weekly_stride)
            .await;
        buckets.push(WeeklyBucket {
            week: weeks - week as u32,
            stake_events: stakes,
            unstake_events: unstakes,
            net_events: stakes as i64 - unstakes as i64,
        });
    }

    buckets.sort_by_key(|bucket| bucket.week);
    buckets
}
