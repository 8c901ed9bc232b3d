use serde::{Deserialize, Serialize};

use crate::analysis::flow::{FlowComparison, Trend};
use crate::core::BalanceSnapshot;

/// Signals the factors score against. Percentages are of the verified
/// staked balance except `staking_percentage`, which is of total supply.
#[derive(Debug, Clone, Copy)]
pub struct FactorInput {
    pub staking_percentage: f64,
    pub unstaking_incidence: f64,
    pub net_flow_percentage: f64,
    pub trend: Trend,
}

/// One independent ordinal health signal. Factors never short-circuit:
/// all of them are computed and reported on every run.
pub trait HealthFactor {
    fn name(&self) -> &'static str;
    fn score(&self, input: &FactorInput) -> i8;
}

pub fn default_factors() -> Vec<Box<dyn HealthFactor + Send + Sync>> {
    vec![
        Box::new(StakingShareFactor),
        Box::new(UnstakingIncidenceFactor),
        Box::new(TrendFactor),
        Box::new(NetFlowFactor),
    ]
}

/// Share of total supply locked in the contract.
struct StakingShareFactor;
impl HealthFactor for StakingShareFactor {
    fn name(&self) -> &'static str {
        "staking_share"
    }
    fn score(&self, input: &FactorInput) -> i8 {
        if input.staking_percentage > 40.0 {
            2
        } else if input.staking_percentage > 20.0 {
            1
        } else if input.staking_percentage > 10.0 {
            0
        } else {
            -1
        }
    }
}

/// Unstaked amount over the window relative to the staked balance.
struct UnstakingIncidenceFactor;
impl HealthFactor for UnstakingIncidenceFactor {
    fn name(&self) -> &'static str {
        "unstaking_incidence"
    }
    fn score(&self, input: &FactorInput) -> i8 {
        if input.unstaking_incidence < 2.0 {
            2
        } else if input.unstaking_incidence < 5.0 {
            1
        } else if input.unstaking_incidence < 10.0 {
            0
        } else {
            -1
        }
    }
}

/// Direct mapping of the flow trend; the only factor that can reach -2.
struct TrendFactor;
impl HealthFactor for TrendFactor {
    fn name(&self) -> &'static str {
        "trend"
    }
    fn score(&self, input: &FactorInput) -> i8 {
        input.trend.score()
    }
}

struct NetFlowFactor;
impl HealthFactor for NetFlowFactor {
    fn name(&self) -> &'static str {
        "net_flow"
    }
    fn score(&self, input: &FactorInput) -> i8 {
        if input.net_flow_percentage > 5.0 {
            2
        } else if input.net_flow_percentage > 0.0 {
            1
        } else if input.net_flow_percentage > -5.0 {
            0
        } else {
            -1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub name: String,
    pub score: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthGrade {
    Excellent,
    Good,
    Moderate,
    Critical,
}

impl HealthGrade {
    pub fn from_average(avg: f64) -> Self {
        if avg >= 1.5 {
            HealthGrade::Excellent
        } else if avg >= 0.5 {
            HealthGrade::Good
        } else if avg >= -0.5 {
            HealthGrade::Moderate
        } else {
            HealthGrade::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthGrade::Excellent => "EXCELLENT",
            HealthGrade::Good => "GOOD",
            HealthGrade::Moderate => "MODERATE",
            HealthGrade::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            HealthGrade::Excellent => "🟢",
            HealthGrade::Good => "🟡",
            HealthGrade::Moderate => "🟠",
            HealthGrade::Critical => "🔴",
        }
    }
}

/// Composite health view: the four factor scores, their mean, and the
/// qualitative grade, together with the derived percentages they used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub staking_percentage: f64,
    pub unstaking_incidence: f64,
    pub staking_flow_percentage: f64,
    pub net_flow_percentage: f64,
    pub trend: Trend,
    pub factors: Vec<FactorScore>,
    pub average_score: f64,
    pub grade: HealthGrade,
}

/// Combine the balance snapshot and flow comparison into a health grade.
/// Pure: no ledger access, no clock.
pub fn score(balance: &BalanceSnapshot, flow: &FlowComparison) -> HealthAssessment {
    let staked = balance.balance_tokens;
    let unstaking_incidence = if staked > 0.0 {
        flow.unstake_amount / staked * 100.0
    } else {
        0.0
    };
    let staking_flow_percentage = if staked > 0.0 {
        flow.stake_amount / staked * 100.0
    } else {
        0.0
    };

    let input = FactorInput {
        staking_percentage: balance.percentage_of_supply,
        unstaking_incidence,
        net_flow_percentage: flow.net_flow_percentage,
        trend: flow.trend,
    };

    let factors: Vec<FactorScore> = default_factors()
        .iter()
        .map(|factor| FactorScore {
            name: factor.name().to_string(),
            score: factor.score(&input),
        })
        .collect();

    let average_score =
        factors.iter().map(|f| f.score as f64).sum::<f64>() / factors.len() as f64;
    let grade = HealthGrade::from_average(average_score);

    HealthAssessment {
        staking_percentage: balance.percentage_of_supply,
        unstaking_incidence,
        staking_flow_percentage,
        net_flow_percentage: flow.net_flow_percentage,
        trend: flow.trend,
        factors,
        average_score,
        grade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::flow;
    use crate::core::VerificationMethod;
    use crate::core::scan::DirectionSummary;
    use chrono::Utc;

    fn snapshot(tokens: f64, percentage: f64) -> BalanceSnapshot {
        BalanceSnapshot {
            balance_wei: (tokens * 1e18) as u128,
            balance_tokens: tokens,
            percentage_of_supply: percentage,
            method: VerificationMethod::DirectBalanceCall,
            verified_at: Utc::now(),
        }
    }

    fn summary(amount: f64) -> DirectionSummary {
        DirectionSummary {
            period_days: 14,
            blocks_scanned: 100,
            events_found: 10,
            unique_addresses: 10,
            total_estimated_amount: amount,
            daily_average_events: 10.0 / 14.0,
            daily_average_amount: amount / 14.0,
        }
    }

    fn fixture_flow(stake: f64, unstake: f64, balance: f64) -> flow::FlowComparison {
        flow::aggregate(&summary(stake), &summary(unstake), balance, vec![])
    }

    #[test]
    fn always_four_factors_in_range() {
        let flow = fixture_flow(50_000.0, 20_000.0, 1_000_000.0);
        let assessment = score(&snapshot(1_000_000.0, 10.0), &flow);
        assert_eq!(assessment.factors.len(), 4);
        for factor in &assessment.factors {
            assert!((-2..=2).contains(&factor.score), "{factor:?}");
        }
    }

    #[test]
    fn reference_scenario_grades_good() {
        // balance 1M of a 10M supply (10%), 50k staked vs 20k unstaked
        // over 14 days: share factor -1 (10% fails the >10% bound),
        // incidence 2% => 1, net flow +3% => 1, trend strong growth => 2.
        let flow = fixture_flow(50_000.0, 20_000.0, 1_000_000.0);
        let assessment = score(&snapshot(1_000_000.0, 10.0), &flow);
        assert!((assessment.unstaking_incidence - 2.0).abs() < 1e-9);
        assert!((assessment.net_flow_percentage - 3.0).abs() < 1e-9);
        let scores: Vec<i8> = assessment.factors.iter().map(|f| f.score).collect();
        assert_eq!(scores, vec![-1, 1, 2, 1]);
        assert!((assessment.average_score - 0.75).abs() < 1e-9);
        assert_eq!(assessment.grade, HealthGrade::Good);
    }

    #[test]
    fn grade_thresholds_are_monotonic() {
        assert_eq!(HealthGrade::from_average(2.0), HealthGrade::Excellent);
        assert_eq!(HealthGrade::from_average(1.5), HealthGrade::Excellent);
        assert_eq!(HealthGrade::from_average(1.49), HealthGrade::Good);
        assert_eq!(HealthGrade::from_average(0.5), HealthGrade::Good);
        assert_eq!(HealthGrade::from_average(0.0), HealthGrade::Moderate);
        assert_eq!(HealthGrade::from_average(-0.5), HealthGrade::Moderate);
        assert_eq!(HealthGrade::from_average(-0.51), HealthGrade::Critical);
    }

    #[test]
    fn zero_balance_scores_without_division() {
        let flow = fixture_flow(100.0, 50.0, 0.0);
        let assessment = score(&snapshot(0.0, 0.0), &flow);
        assert_eq!(assessment.unstaking_incidence, 0.0);
        assert_eq!(assessment.staking_flow_percentage, 0.0);
        assert!(assessment.average_score.is_finite());
    }

    #[test]
    fn score_is_pure() {
        let flow = fixture_flow(50_000.0, 20_000.0, 1_000_000.0);
        let snap = snapshot(1_000_000.0, 10.0);
        assert_eq!(score(&snap, &flow), score(&snap, &flow));
    }
}
