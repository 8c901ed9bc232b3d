use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::amount::AmountResolver;
use crate::core::classify::SignatureClassifier;
use crate::core::{EventKind, StakeEvent, UnstakeEvent};
use crate::rpc::{Block, LedgerPort, parse_hex_u64};

/// Iterates a block range, classifies every contained transaction and
/// emits typed stake/unstake events. Blocks are sampled one per stride
/// and fetched with bounded concurrency; event order follows block
/// number, never completion order.
pub struct WindowScanner<'a, L: LedgerPort> {
    ledger: &'a L,
    classifier: &'a SignatureClassifier,
    resolver: &'a dyn AmountResolver,
    stride: u64,
    concurrency: usize,
}

/// Everything one pass over the window produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub stake_events: Vec<StakeEvent>,
    pub unstake_events: Vec<UnstakeEvent>,
    /// Blocks actually fetched (one per stride across the range).
    pub blocks_scanned: u64,
}

impl<'a, L: LedgerPort> WindowScanner<'a, L> {
    pub fn new(
        ledger: &'a L,
        classifier: &'a SignatureClassifier,
        resolver: &'a dyn AmountResolver,
        stride: u64,
        concurrency: usize,
    ) -> Self {
        Self {
            ledger,
            classifier,
            resolver,
            stride,
            concurrency,
        }
    }

    /// Scan `[from, to)` and collect classified events. A failed or
    /// missing block counts as zero transactions; the scan never aborts
    /// because of a single bad block.
    pub async fn scan(&self, from: u64, to: u64) -> ScanOutcome {
        let now = Utc::now();
        let sampled: Vec<u64> = (from..to).step_by(self.stride.max(1) as usize).collect();
        let total = sampled.len();
        let mut outcome = ScanOutcome::default();

        for chunk in sampled.chunks(self.concurrency.max(1)) {
            // join_all preserves input order, so results stay in block order.
            let fetched = join_all(chunk.iter().map(|&n| self.fetch(n))).await;
            for block in fetched.into_iter().flatten() {
                self.collect_events(&block, now, &mut outcome);
            }
            outcome.blocks_scanned += chunk.len() as u64;

            if outcome.blocks_scanned % 1000 == 0 {
                debug!(
                    "Scan progress: {}/{total} blocks, {} stake / {} unstake events",
                    outcome.blocks_scanned,
                    outcome.stake_events.len(),
                    outcome.unstake_events.len()
                );
            }
        }

        outcome
    }

    /// Count matching events of one kind in `[from, to)` with its own
    /// stride. Used by the weekly breakdown, which only needs counts.
    pub async fn count_matching(&self, from: u64, to: u64, kind: EventKind, stride: u64) -> u64 {
        let sampled: Vec<u64> = (from..to).step_by(stride.max(1) as usize).collect();
        let mut count = 0u64;

        for chunk in sampled.chunks(self.concurrency.max(1)) {
            let fetched = join_all(chunk.iter().map(|&n| self.fetch(n))).await;
            for block in fetched.into_iter().flatten() {
                count += block
                    .transactions
                    .iter()
                    .filter(|tx| self.classifier.classify(tx.to.as_deref(), &tx.input) == Some(kind))
                    .count() as u64;
            }
        }

        count
    }

    async fn fetch(&self, number: u64) -> Option<Block> {
        match self.ledger.block_by_number(number).await {
            Ok(block) => block,
            Err(e) => {
                // Transport failure degrades to "no data for this block".
                debug!("Block {number} fetch failed: {e}");
                None
            }
        }
    }

    fn collect_events(&self, block: &Block, now: DateTime<Utc>, outcome: &mut ScanOutcome) {
        let timestamp = match parse_hex_u64(&block.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        {
            Some(ts) => ts,
            None => {
                warn!("Block with unreadable timestamp {:?}, skipping", block.timestamp);
                return;
            }
        };

        for tx in &block.transactions {
            let Some(kind) = self.classifier.classify(tx.to.as_deref(), &tx.input) else {
                continue;
            };
            let sender = tx.from.to_lowercase();
            let selector = &tx.input[..tx.input.len().min(10)];
            let amount = self.resolver.resolve(kind, &sender, tx).max(0.0);

            match kind {
                EventKind::Stake => outcome.stake_events.push(StakeEvent {
                    address: sender,
                    transaction_hash: tx.hash.clone(),
                    timestamp,
                    selector: selector.to_string(),
                    estimated_amount: amount,
                }),
                EventKind::Unstake => outcome.unstake_events.push(UnstakeEvent::new(
                    sender,
                    tx.hash.clone(),
                    timestamp,
                    selector.to_string(),
                    amount,
                    now,
                )),
            }
        }
    }
}

/// Per-direction summary of a scanned window, straight off the event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub period_days: u32,
    pub blocks_scanned: u64,
    pub events_found: usize,
    pub unique_addresses: usize,
    pub total_estimated_amount: f64,
    pub daily_average_events: f64,
    pub daily_average_amount: f64,
}

impl DirectionSummary {
    fn build<'e>(
        addresses: impl Iterator<Item = &'e str>,
        amounts: impl Iterator<Item = f64>,
        events_found: usize,
        period_days: u32,
        blocks_scanned: u64,
    ) -> Self {
        let unique: std::collections::HashSet<&str> = addresses.collect();
        let total: f64 = amounts.sum();
        let days = period_days as f64;
        Self {
            period_days,
            blocks_scanned,
            events_found,
            unique_addresses: unique.len(),
            total_estimated_amount: total,
            daily_average_events: events_found as f64 / days,
            daily_average_amount: total / days,
        }
    }

    pub fn for_stakes(events: &[StakeEvent], period_days: u32, blocks_scanned: u64) -> Self {
        Self::build(
            events.iter().map(|e| e.address.as_str()),
            events.iter().map(|e| e.estimated_amount),
            events.len(),
            period_days,
            blocks_scanned,
        )
    }

    pub fn for_unstakes(events: &[UnstakeEvent], period_days: u32, blocks_scanned: u64) -> Self {
        Self::build(
            events.iter().map(|e| e.address.as_str()),
            events.iter().map(|e| e.estimated_amount),
            events.len(),
            period_days,
            blocks_scanned,
        )
    }
}
