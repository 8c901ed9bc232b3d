use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::flow::FlowComparison;
use crate::analysis::health::HealthAssessment;
use crate::analysis::projection::ProjectionReport;
use crate::analysis::summary::ExecutiveSummary;
use crate::core::scan::DirectionSummary;
use crate::core::{BalanceSnapshot, StakeEvent, UnstakeEvent};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractsInfo {
    pub staking_contract: String,
    pub token_contract: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub total_supply: f64,
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingAnalysis {
    #[serde(flatten)]
    pub summary: DirectionSummary,
    pub events: Vec<StakeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstakingAnalysis {
    #[serde(flatten)]
    pub summary: DirectionSummary,
    pub events: Vec<UnstakeEvent>,
}

/// The single artifact of a run: everything the pipeline produced, ready
/// for serialization and console rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub analysis_timestamp: DateTime<Utc>,
    pub execution_time_seconds: f64,
    pub contracts: ContractsInfo,
    pub analysis_period_days: u32,
    pub token_info: TokenInfo,
    pub balance_data: BalanceSnapshot,
    pub staking_analysis: StakingAnalysis,
    pub unstaking_analysis: UnstakingAnalysis,
    pub flow_analysis: FlowComparison,
    pub health_metrics: HealthAssessment,
    pub projections: ProjectionReport,
    pub executive_summary: ExecutiveSummary,
}

impl HealthReport {
    /// Write the JSON artifact.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Default artifact path, timestamped per run.
    pub fn default_output_path(&self) -> String {
        format!(
            "staking_health_{}.json",
            self.analysis_timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Render the human-readable report to stdout.
pub fn render(report: &HealthReport) {
    let rule = "=".repeat(100);
    println!("\n{rule}");
    println!("🎯 STAKING HEALTH CHECK REPORT");
    println!("{rule}");

    let summary = &report.executive_summary;
    println!("\n📋 EXECUTIVE SUMMARY");
    println!(
        "   Overall Status: {} {}",
        summary.overall_status.emoji(),
        summary.overall_status.label()
    );
    println!("   Staking: {}", summary.key_metrics.staking_percentage);
    println!("   Net Flow: {}", summary.key_metrics.net_flow);
    println!("   Trend: {}", summary.key_metrics.trend);
    println!("   Selling Pressure: {}", summary.key_metrics.selling_pressure);

    println!("\n💡 RECOMMENDATIONS:");
    for (i, rec) in summary.recommendations.iter().enumerate() {
        println!("   {}. {rec}", i + 1);
    }

    println!("\n🚨 PRIORITY ACTIONS:");
    for (i, action) in summary.priority_actions.iter().enumerate() {
        println!("   {}. {action}", i + 1);
    }

    let balance = &report.balance_data;
    println!("\n💰 CONFIGURATION AND BALANCE");
    println!("   Token Contract: {}", report.contracts.token_contract);
    println!("   Staking Contract: {}", report.contracts.staking_contract);
    println!("   Total Supply: {:.0} tokens", report.token_info.total_supply);
    println!(
        "   Total Staked: {:.0} tokens ({:.2}% of supply, {:?})",
        balance.balance_tokens, balance.percentage_of_supply, balance.method
    );

    let staking = &report.staking_analysis.summary;
    let unstaking = &report.unstaking_analysis.summary;
    let flow = &report.flow_analysis;
    println!("\n🔄 FLOW ANALYSIS ({} days)", report.analysis_period_days);
    println!(
        "   Staking Events: {} ({} unique stakers)",
        staking.events_found, staking.unique_addresses
    );
    println!(
        "   Unstaking Events: {} ({} unique unstakers)",
        unstaking.events_found, unstaking.unique_addresses
    );
    println!("   Staking Amount: {:.0} tokens", flow.stake_amount);
    println!("   Unstaking Amount: {:.0} tokens", flow.unstake_amount);
    println!("   Net Flow: {:+.0} tokens", flow.net_amount);

    if !flow.weekly_breakdown.is_empty() {
        println!("\n📅 WEEKLY BREAKDOWN");
        for bucket in &flow.weekly_breakdown {
            println!(
                "   Week {}: {} stakes, {} unstakes (net {:+})",
                bucket.week, bucket.stake_events, bucket.unstake_events, bucket.net_events
            );
        }
    }

    let health = &report.health_metrics;
    println!("\n🏥 HEALTH METRICS");
    println!("   Staking Percentage: {:.2}% of supply", health.staking_percentage);
    println!("   Staking Flow: {:.2}% of staked", health.staking_flow_percentage);
    println!(
        "   Unstaking Incidence: {:.2}% of staked",
        health.unstaking_incidence
    );
    println!("   Net Flow: {:+.2}% of staked", health.net_flow_percentage);
    println!("   Trend: {}", health.trend.label());
    println!(
        "   Health Score: {} {} (avg {:.2})",
        health.grade.emoji(),
        health.grade.label(),
        health.average_score
    );

    let projections = &report.projections;
    let pressure = &projections.selling_pressure;
    println!("\n🔮 PROJECTIONS AND SELLING PRESSURE");
    println!(
        "   30-day Projection: {:+.0} tokens ({:+.2}%)",
        projections.projections_30_days.projected_net_flow,
        projections.projections_30_days.projected_tvl_change_percentage
    );
    println!(
        "   14-day Selling Pressure: {:.0} tokens ({:.2}%)",
        pressure.total_pressure_14_days, pressure.pressure_percentage_of_staked
    );
    println!(
        "   Pressure Intensity: {} {}",
        pressure.intensity.emoji(),
        pressure.intensity.label()
    );

    if !pressure.timeline.is_empty() {
        println!("\n📅 SELLING PRESSURE TIMELINE (next 7 days)");
        for bucket in pressure.timeline.iter().filter(|b| b.day < 7) {
            println!(
                "      Day {}: {:.0} tokens ({} unstakes)",
                bucket.day, bucket.amount, bucket.count
            );
        }
    }

    let risk = &projections.risk_assessment;
    println!("\n⚠️ RISK ASSESSMENT");
    println!("   Liquidity Risk: {:?}", risk.liquidity_risk);
    println!("   Growth Sustainability: {:?}", risk.growth_sustainability);
    println!("   Market Impact: {:?}", risk.market_impact);

    println!("\nNext Review Recommended: {}", summary.next_review_recommended);
    println!(
        "Execution Time: {:.2} seconds",
        report.execution_time_seconds
    );
    println!("{rule}");
}
