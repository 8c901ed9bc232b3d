use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::flow::FlowComparison;
use crate::core::{BalanceSnapshot, UNLOCK_PERIOD_DAYS, UnstakeEvent};

/// Aggregate unlock pressure for one day offset of the countdown window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureBucket {
    pub day: i64,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureIntensity {
    Low,
    Moderate,
    High,
    Critical,
}

impl PressureIntensity {
    pub fn from_percentage(pct: f64) -> Self {
        if pct < 1.0 {
            PressureIntensity::Low
        } else if pct < 3.0 {
            PressureIntensity::Moderate
        } else if pct < 7.0 {
            PressureIntensity::High
        } else {
            PressureIntensity::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PressureIntensity::Low => "LOW",
            PressureIntensity::Moderate => "MODERATE",
            PressureIntensity::High => "HIGH",
            PressureIntensity::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PressureIntensity::Low => "🟢",
            PressureIntensity::Moderate => "🟡",
            PressureIntensity::High => "🟠",
            PressureIntensity::Critical => "🔴",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, PressureIntensity::High | PressureIntensity::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidityRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSustainability {
    Sustainable,
    Stable,
    AtRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketImpact {
    Limited,
    Moderate,
    Significant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub liquidity_risk: LiquidityRisk,
    pub growth_sustainability: GrowthSustainability,
    pub market_impact: MarketImpact,
}

/// Linear extrapolation of the window's daily rates over 30 days:
/// daily rate times horizon, no time-series fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projections30d {
    pub projected_stake_amount: f64,
    pub projected_unstake_amount: f64,
    pub projected_net_flow: f64,
    pub projected_tvl_change_percentage: f64,
    pub current_daily_growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPressure {
    pub total_pressure_14_days: f64,
    pub pressure_percentage_of_staked: f64,
    pub intensity: PressureIntensity,
    pub daily_average_pressure: f64,
    /// One bucket per distinct days-remaining value, ascending by day.
    pub timeline: Vec<PressureBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionReport {
    pub projections_30_days: Projections30d,
    pub selling_pressure: SellingPressure,
    pub risk_assessment: RiskAssessment,
}

/// Bucket pending unstakes by integer days remaining. Only countdowns
/// inside the unlock window [0, 14] contribute.
pub fn pressure_timeline(unstake_events: &[UnstakeEvent]) -> Vec<PressureBucket> {
    let mut by_day: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for event in unstake_events {
        if (0..=UNLOCK_PERIOD_DAYS).contains(&event.days_remaining) {
            let entry = by_day.entry(event.days_remaining).or_insert((0.0, 0));
            entry.0 += event.estimated_amount;
            entry.1 += 1;
        }
    }
    by_day
        .into_iter()
        .map(|(day, (amount, count))| PressureBucket { day, amount, count })
        .collect()
}

/// Derive projections and unlock pressure from the aggregated flow, the
/// verified balance, and the raw unstake events. Pure.
pub fn project(
    flow: &FlowComparison,
    balance: &BalanceSnapshot,
    unstake_events: &[UnstakeEvent],
) -> ProjectionReport {
    let staked = balance.balance_tokens;

    let projected_stake_30d = flow.daily_stake_amount * 30.0;
    let projected_unstake_30d = flow.daily_unstake_amount * 30.0;
    let projected_net_30d = flow.daily_net_amount * 30.0;
    let projected_tvl_change = if staked > 0.0 {
        projected_net_30d / staked * 100.0
    } else {
        0.0
    };
    let daily_growth_rate = if staked > 0.0 {
        flow.daily_net_amount / staked * 100.0
    } else {
        0.0
    };

    let timeline = pressure_timeline(unstake_events);
    let total_pressure: f64 = timeline.iter().map(|bucket| bucket.amount).sum();
    let pressure_percentage = if staked > 0.0 {
        total_pressure / staked * 100.0
    } else {
        0.0
    };
    let intensity = PressureIntensity::from_percentage(pressure_percentage);

    let risk_assessment = RiskAssessment {
        liquidity_risk: if intensity.is_elevated() {
            LiquidityRisk::High
        } else if intensity == PressureIntensity::Moderate {
            LiquidityRisk::Medium
        } else {
            LiquidityRisk::Low
        },
        growth_sustainability: if projected_tvl_change > 0.0 {
            GrowthSustainability::Sustainable
        } else if projected_tvl_change < -10.0 {
            GrowthSustainability::AtRisk
        } else {
            GrowthSustainability::Stable
        },
        market_impact: if pressure_percentage > 5.0 {
            MarketImpact::Significant
        } else if pressure_percentage > 2.0 {
            MarketImpact::Moderate
        } else {
            MarketImpact::Limited
        },
    };

    ProjectionReport {
        projections_30_days: Projections30d {
            projected_stake_amount: projected_stake_30d,
            projected_unstake_amount: projected_unstake_30d,
            projected_net_flow: projected_net_30d,
            projected_tvl_change_percentage: projected_tvl_change,
            current_daily_growth_rate: daily_growth_rate,
        },
        selling_pressure: SellingPressure {
            total_pressure_14_days: total_pressure,
            pressure_percentage_of_staked: pressure_percentage,
            intensity,
            daily_average_pressure: total_pressure / UNLOCK_PERIOD_DAYS as f64,
            timeline,
        },
        risk_assessment,
    }
}
