pub mod amount;
pub mod balance;
pub mod classify;
pub mod pipeline;
pub mod scan;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed delay between an unstake request and funds becoming withdrawable.
pub const UNLOCK_PERIOD_DAYS: i64 = 14;

/// Classified transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Stake,
    Unstake,
}

/// A classified deposit into the staking contract. Produced only by the
/// window scanner; read-only downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeEvent {
    pub address: String,
    pub transaction_hash: String,
    /// Block timestamp, not wall clock.
    pub timestamp: DateTime<Utc>,
    pub selector: String,
    pub estimated_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnstakeStatus {
    Active,
    Expired,
}

/// A classified withdrawal request, carrying its unlock countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstakeEvent {
    pub address: String,
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
    pub selector: String,
    pub estimated_amount: f64,
    /// When the unstaked funds become withdrawable.
    pub maturity: DateTime<Utc>,
    /// Whole days until maturity, negative once past it.
    pub days_remaining: i64,
    pub status: UnstakeStatus,
}

impl UnstakeEvent {
    /// Build an unstake event from a classified transaction. `now` is
    /// injected so the countdown is reproducible in tests.
    pub fn new(
        address: String,
        transaction_hash: String,
        timestamp: DateTime<Utc>,
        selector: String,
        estimated_amount: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let maturity = timestamp + Duration::days(UNLOCK_PERIOD_DAYS);
        let days_remaining = (maturity - now).num_days();
        let status = if days_remaining > 0 {
            UnstakeStatus::Active
        } else {
            UnstakeStatus::Expired
        };
        Self {
            address,
            transaction_hash,
            timestamp,
            selector,
            estimated_amount,
            maturity,
            days_remaining,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    DirectBalanceCall,
    EstimatedFromActivity,
}

/// Point-in-time view of the staking contract's token balance. Exactly
/// one snapshot is produced per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Serialized as a decimal string; wei balances overflow JSON numbers.
    #[serde(with = "wei_string")]
    pub balance_wei: u128,
    pub balance_tokens: f64,
    pub percentage_of_supply: f64,
    pub method: VerificationMethod,
    pub verified_at: DateTime<Utc>,
}

mod wei_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn unstake_maturity_is_fourteen_days_out() {
        let stamped = ts(1_700_000_000);
        let event = UnstakeEvent::new(
            "0xabc".into(),
            "0xhash".into(),
            stamped,
            "0x2e1a7d4d".into(),
            1000.0,
            stamped,
        );
        assert_eq!(event.maturity - event.timestamp, Duration::days(14));
        assert_eq!(event.days_remaining, 14);
        assert_eq!(event.status, UnstakeStatus::Active);
    }

    #[test]
    fn unstake_expired_when_countdown_elapsed() {
        let stamped = ts(1_700_000_000);
        let now = stamped + Duration::days(15);
        let event = UnstakeEvent::new(
            "0xabc".into(),
            "0xhash".into(),
            stamped,
            "0x2e1a7d4d".into(),
            1000.0,
            now,
        );
        assert_eq!(event.days_remaining, -1);
        assert_eq!(event.status, UnstakeStatus::Expired);
    }

    #[test]
    fn unstake_expired_at_exact_maturity() {
        let stamped = ts(1_700_000_000);
        let now = stamped + Duration::days(14);
        let event = UnstakeEvent::new(
            "0xabc".into(),
            "0xhash".into(),
            stamped,
            "0x2e1a7d4d".into(),
            1000.0,
            now,
        );
        // days_remaining <= 0 means expired, including the boundary.
        assert_eq!(event.days_remaining, 0);
        assert_eq!(event.status, UnstakeStatus::Expired);
    }

    #[test]
    fn balance_wei_survives_json_beyond_u64() {
        let snapshot = BalanceSnapshot {
            balance_wei: 450_000_000u128 * 10u128.pow(18),
            balance_tokens: 450_000_000.0,
            percentage_of_supply: 45.0,
            method: VerificationMethod::DirectBalanceCall,
            verified_at: ts(1_700_000_000),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["balance_wei"].is_string());
        let back: BalanceSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.balance_wei, snapshot.balance_wei);
    }

    #[test]
    fn unstake_status_matches_countdown_sign() {
        let stamped = ts(1_700_000_000);
        for offset_days in 0..30 {
            let now = stamped + Duration::days(offset_days);
            let event = UnstakeEvent::new(
                "0xabc".into(),
                "0xhash".into(),
                stamped,
                "0x2e1a7d4d".into(),
                1.0,
                now,
            );
            let expired = event.days_remaining <= 0;
            assert_eq!(event.status == UnstakeStatus::Expired, expired);
        }
    }
}
