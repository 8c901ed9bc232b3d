use serde::{Deserialize, Serialize};

use crate::core::scan::DirectionSummary;

/// Discrete classification of net flow direction, relative to total
/// staking inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    StrongGrowth,
    Growth,
    Stable,
    Decline,
    StrongDecline,
}

impl Trend {
    /// Thresholds are fractions of the total stake amount: net above 10%
    /// is strong growth, net losses inside 10% are stable, inside 30%
    /// decline, beyond that strong decline.
    pub fn from_amounts(net_amount: f64, stake_amount: f64) -> Self {
        if net_amount > stake_amount * 0.1 {
            Trend::StrongGrowth
        } else if net_amount > 0.0 {
            Trend::Growth
        } else if net_amount > -stake_amount * 0.1 {
            Trend::Stable
        } else if net_amount > -stake_amount * 0.3 {
            Trend::Decline
        } else {
            Trend::StrongDecline
        }
    }

    pub fn score(&self) -> i8 {
        match self {
            Trend::StrongGrowth => 2,
            Trend::Growth => 1,
            Trend::Stable => 0,
            Trend::Decline => -1,
            Trend::StrongDecline => -2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::StrongGrowth => "STRONG GROWTH",
            Trend::Growth => "GROWTH",
            Trend::Stable => "STABLE",
            Trend::Decline => "DECLINE",
            Trend::StrongDecline => "STRONG DECLINE",
        }
    }

    pub fn is_growth(&self) -> bool {
        matches!(self, Trend::Growth | Trend::StrongGrowth)
    }
}

/// Net stake/unstake event counts for one 7-day sub-window. Week 1 is the
/// oldest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week: u32,
    pub stake_events: u64,
    pub unstake_events: u64,
    pub net_events: i64,
}

/// Aggregated stake-vs-unstake statistics over the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowComparison {
    pub stake_events: usize,
    pub unstake_events: usize,
    pub net_events: i64,
    pub stake_amount: f64,
    pub unstake_amount: f64,
    pub net_amount: f64,

    pub daily_stake_events: f64,
    pub daily_unstake_events: f64,
    pub daily_stake_amount: f64,
    pub daily_unstake_amount: f64,
    pub daily_net_amount: f64,

    pub stake_event_percentage: f64,
    pub unstake_event_percentage: f64,
    pub stake_amount_percentage: f64,
    pub unstake_amount_percentage: f64,

    pub trend: Trend,
    pub trend_score: i8,
    /// Net amount relative to the verified balance. Reported alongside
    /// the trend, but not part of the trend decision.
    pub net_flow_percentage: f64,

    pub weekly_breakdown: Vec<WeeklyBucket>,
}

/// Number of weekly buckets for a window: none under 7 days, at most 4.
pub fn weeks_for(window_days: u32) -> u32 {
    if window_days < 7 { 0 } else { (window_days / 7).min(4) }
}

/// Reduce the two direction summaries into a flow comparison. Pure:
/// identical inputs always produce identical output. The weekly buckets
/// are counted by the caller (they need ledger access) and passed in.
pub fn aggregate(
    staking: &DirectionSummary,
    unstaking: &DirectionSummary,
    staked_balance: f64,
    weekly_breakdown: Vec<WeeklyBucket>,
) -> FlowComparison {
    let stake_events = staking.events_found;
    let unstake_events = unstaking.events_found;
    let stake_amount = staking.total_estimated_amount;
    let unstake_amount = unstaking.total_estimated_amount;
    let net_amount = stake_amount - unstake_amount;

    let total_events = (stake_events + unstake_events) as f64;
    let (stake_event_pct, unstake_event_pct) = if total_events > 0.0 {
        (
            stake_events as f64 / total_events * 100.0,
            unstake_events as f64 / total_events * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    let total_amount = stake_amount + unstake_amount;
    let (stake_amount_pct, unstake_amount_pct) = if total_amount > 0.0 {
        (
            stake_amount / total_amount * 100.0,
            unstake_amount / total_amount * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    let trend = Trend::from_amounts(net_amount, stake_amount);
    let net_flow_percentage = if staked_balance > 0.0 {
        net_amount / staked_balance * 100.0
    } else {
        0.0
    };

    FlowComparison {
        stake_events,
        unstake_events,
        net_events: stake_events as i64 - unstake_events as i64,
        stake_amount,
        unstake_amount,
        net_amount,
        daily_stake_events: staking.daily_average_events,
        daily_unstake_events: unstaking.daily_average_events,
        daily_stake_amount: staking.daily_average_amount,
        daily_unstake_amount: unstaking.daily_average_amount,
        daily_net_amount: staking.daily_average_amount - unstaking.daily_average_amount,
        stake_event_percentage: stake_event_pct,
        unstake_event_percentage: unstake_event_pct,
        stake_amount_percentage: stake_amount_pct,
        unstake_amount_percentage: unstake_amount_pct,
        trend,
        trend_score: trend.score(),
        net_flow_percentage,
        weekly_breakdown,
    }
}
