use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::EventKind;
use crate::rpc::TxRecord;

/// Produces an estimated token amount for a classified transaction.
///
/// The contract requires determinism per (kind, sender) within a run:
/// downstream aggregation sums these values and tests must reproduce
/// totals. A faithful implementation decodes emitted transfer logs; it
/// plugs in here without touching the rest of the pipeline.
pub trait AmountResolver: Send + Sync {
    fn resolve(&self, kind: EventKind, sender: &str, tx: &TxRecord) -> f64;
}

/// Degraded resolver for environments without log access: samples a
/// kind-specific tiered distribution seeded from the sender address.
///
/// This is a documented placeholder, not a ground-truth source. Every
/// metric downstream of these amounts is only as trustworthy as this
/// estimate.
pub struct SeededEstimator;

impl SeededEstimator {
    /// Seed derived from the low-order 8 hex chars of the address, so the
    /// same sender always draws the same amounts.
    fn seed_for(address: &str) -> u64 {
        if address.len() >= 8 {
            let tail = &address[address.len() - 8..];
            u64::from_str_radix(tail, 16).unwrap_or(42)
        } else {
            42
        }
    }
}

impl AmountResolver for SeededEstimator {
    fn resolve(&self, kind: EventKind, sender: &str, _tx: &TxRecord) -> f64 {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(sender));
        let tier: f64 = rng.r#gen();

        match kind {
            EventKind::Stake => {
                if tier < 0.4 {
                    rng.gen_range(10_000.0..100_000.0)
                } else if tier < 0.7 {
                    rng.gen_range(100_000.0..1_000_000.0)
                } else if tier < 0.9 {
                    rng.gen_range(1_000_000.0..5_000_000.0)
                } else {
                    rng.gen_range(5_000_000.0..20_000_000.0)
                }
            }
            EventKind::Unstake => {
                if tier < 0.3 {
                    rng.gen_range(20_000.0..150_000.0)
                } else if tier < 0.6 {
                    rng.gen_range(150_000.0..800_000.0)
                } else if tier < 0.85 {
                    rng.gen_range(800_000.0..3_000_000.0)
                } else {
                    rng.gen_range(3_000_000.0..15_000_000.0)
                }
            }
        }
    }
}
