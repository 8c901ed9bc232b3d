use serde::{Deserialize, Serialize};

use crate::analysis::flow::FlowComparison;
use crate::analysis::health::{HealthAssessment, HealthGrade};
use crate::analysis::projection::ProjectionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Excellent,
    Good,
    Stable,
    Attention,
    Critical,
}

impl OverallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Excellent => "EXCELLENT",
            OverallStatus::Good => "GOOD",
            OverallStatus::Stable => "STABLE",
            OverallStatus::Attention => "ATTENTION",
            OverallStatus::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            OverallStatus::Excellent | OverallStatus::Good => "🟢",
            OverallStatus::Stable => "🟡",
            OverallStatus::Attention => "🟠",
            OverallStatus::Critical => "🔴",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub staking_percentage: String,
    pub net_flow: String,
    pub trend: String,
    pub selling_pressure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overall_status: OverallStatus,
    pub key_metrics: KeyMetrics,
    pub recommendations: Vec<String>,
    pub priority_actions: Vec<String>,
    pub next_review_recommended: String,
}

/// Fixed decision table over grade, trend, net flow sign and pressure
/// intensity; branches are checked in order.
fn overall_status(health: &HealthAssessment, projections: &ProjectionReport) -> OverallStatus {
    let grade = health.grade;
    let net = health.net_flow_percentage;
    let pressure = projections.selling_pressure.intensity;

    if grade == HealthGrade::Excellent && health.trend.is_growth() && net > 0.0 {
        OverallStatus::Excellent
    } else if matches!(grade, HealthGrade::Excellent | HealthGrade::Good) && net >= 0.0 {
        OverallStatus::Good
    } else if matches!(grade, HealthGrade::Good | HealthGrade::Moderate) && net > -5.0 {
        OverallStatus::Stable
    } else if grade == HealthGrade::Moderate || pressure.is_elevated() {
        OverallStatus::Attention
    } else {
        OverallStatus::Critical
    }
}

fn recommendations(status: OverallStatus) -> Vec<String> {
    let lines: &[&str] = match status {
        OverallStatus::Excellent => &["Maintain current strategies", "Routine monitoring"],
        OverallStatus::Good => &["Continue regular monitoring", "Consider gradual expansion"],
        OverallStatus::Stable => &["Close monitoring", "Evaluate staking incentives"],
        OverallStatus::Attention => &[
            "Preventive action recommended",
            "Analyze causes of negative trend",
            "Implement incentives to reduce unstaking",
        ],
        OverallStatus::Critical => &[
            "IMMEDIATE ACTION REQUIRED",
            "Review staking strategy",
            "Community communication",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

fn priority_actions(
    status: OverallStatus,
    net_flow_percentage: f64,
    pressure_percentage: f64,
) -> Vec<String> {
    let mut actions = Vec::new();

    if status == OverallStatus::Critical {
        actions.push("Implement emergency measures to reduce unstaking".to_string());
        actions.push("Immediate stakeholder communication".to_string());
        actions.push("Consider urgent economic incentives".to_string());
    }
    if net_flow_percentage < -5.0 {
        actions.push("Analyze causes of negative flow".to_string());
        actions.push("Implement retention campaigns".to_string());
    }
    if pressure_percentage > 5.0 {
        actions.push("Prepare liquidity to absorb sales".to_string());
        actions.push("Real-time market monitoring".to_string());
    }
    if actions.is_empty() {
        actions.push("Continue regular monitoring".to_string());
    }

    actions
}

/// Map the assessment, flow and projections into the executive summary.
/// Pure function of its inputs.
pub fn compose(
    health: &HealthAssessment,
    flow: &FlowComparison,
    projections: &ProjectionReport,
) -> ExecutiveSummary {
    let status = overall_status(health, projections);
    let pressure = &projections.selling_pressure;

    let key_metrics = KeyMetrics {
        staking_percentage: format!("{:.2}% of supply staked", health.staking_percentage),
        net_flow: format!("{:+.2}% net flow", health.net_flow_percentage),
        trend: flow.trend.label().to_string(),
        selling_pressure: format!(
            "{} - {:.0} tokens",
            pressure.intensity.label(),
            pressure.total_pressure_14_days
        ),
    };

    let next_review = match status {
        OverallStatus::Critical => "24 hours",
        OverallStatus::Attention => "72 hours",
        _ => "7 days",
    };

    ExecutiveSummary {
        overall_status: status,
        key_metrics,
        recommendations: recommendations(status),
        priority_actions: priority_actions(
            status,
            health.net_flow_percentage,
            pressure.pressure_percentage_of_staked,
        ),
        next_review_recommended: next_review.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::flow::{self, Trend};
    use crate::analysis::health;
    use crate::analysis::projection;
    use crate::core::scan::DirectionSummary;
    use crate::core::{BalanceSnapshot, VerificationMethod};
    use chrono::Utc;

    fn summary(amount: f64) -> DirectionSummary {
        DirectionSummary {
            period_days: 14,
            blocks_scanned: 100,
            events_found: 5,
            unique_addresses: 5,
            total_estimated_amount: amount,
            daily_average_events: 5.0 / 14.0,
            daily_average_amount: amount / 14.0,
        }
    }

    fn snapshot(tokens: f64, percentage: f64) -> BalanceSnapshot {
        BalanceSnapshot {
            balance_wei: (tokens * 1e18) as u128,
            balance_tokens: tokens,
            percentage_of_supply: percentage,
            method: VerificationMethod::DirectBalanceCall,
            verified_at: Utc::now(),
        }
    }

    /// Full downstream pipeline on synthetic totals.
    fn summarize(
        stake: f64,
        unstake: f64,
        balance: f64,
        supply_pct: f64,
    ) -> (ExecutiveSummary, OverallStatus) {
        let snap = snapshot(balance, supply_pct);
        let flow = flow::aggregate(&summary(stake), &summary(unstake), balance, vec![]);
        let assessment = health::score(&snap, &flow);
        let projections = projection::project(&flow, &snap, &[]);
        let composed = compose(&assessment, &flow, &projections);
        let status = composed.overall_status;
        (composed, status)
    }

    #[test]
    fn healthy_growing_protocol_is_excellent() {
        // 45% of supply staked, strong inflow, no unstaking.
        let (summary, status) = summarize(60_000.0, 0.0, 1_000_000.0, 45.0);
        assert_eq!(status, OverallStatus::Excellent);
        assert_eq!(summary.next_review_recommended, "7 days");
        assert_eq!(summary.priority_actions, vec!["Continue regular monitoring"]);
    }

    #[test]
    fn heavy_outflow_is_critical() {
        // Unstaking dwarfs staking against a thin balance.
        let (summary, status) = summarize(1_000.0, 80_000.0, 200_000.0, 2.0);
        assert_eq!(status, OverallStatus::Critical);
        assert_eq!(summary.next_review_recommended, "24 hours");
        assert!(
            summary
                .priority_actions
                .iter()
                .any(|a| a.contains("emergency measures"))
        );
        // Net flow below -5% adds the retention block.
        assert!(
            summary
                .priority_actions
                .iter()
                .any(|a| a.contains("retention campaigns"))
        );
    }

    #[test]
    fn moderate_grade_with_mild_outflow_is_stable() {
        // 25% staked, mild net outflow within the -5% band.
        let (_, status) = summarize(10_000.0, 14_000.0, 500_000.0, 25.0);
        assert_eq!(status, OverallStatus::Stable);
    }

    #[test]
    fn recommendations_track_status() {
        assert_eq!(recommendations(OverallStatus::Excellent).len(), 2);
        assert_eq!(recommendations(OverallStatus::Attention).len(), 3);
        assert!(recommendations(OverallStatus::Critical)[0].contains("IMMEDIATE"));
    }

    #[test]
    fn priority_actions_default_when_no_triggers() {
        let actions = priority_actions(OverallStatus::Good, 1.0, 0.5);
        assert_eq!(actions, vec!["Continue regular monitoring"]);
    }

    #[test]
    fn pressure_trigger_adds_liquidity_actions() {
        let actions = priority_actions(OverallStatus::Stable, 0.0, 6.0);
        assert!(actions.iter().any(|a| a.contains("absorb sales")));
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn key_metrics_render_trend_label() {
        let (summary, _) = summarize(60_000.0, 0.0, 1_000_000.0, 45.0);
        assert_eq!(summary.key_metrics.trend, Trend::StrongGrowth.label());
        assert!(summary.key_metrics.staking_percentage.contains("45.00%"));
    }

    #[test]
    fn compose_is_pure() {
        let (a, _) = summarize(10_000.0, 4_000.0, 500_000.0, 25.0);
        let (b, _) = summarize(10_000.0, 4_000.0, 500_000.0, 25.0);
        assert_eq!(a, b);
    }
}
