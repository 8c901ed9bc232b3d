use crate::config::SelectorConfig;
use crate::core::EventKind;

/// Matches transactions against the staking contract and its configured
/// method selectors. Selector sets are data loaded at startup, so new
/// contract dialects need no code change.
pub struct SignatureClassifier {
    staking_contract: String,
    stake_selectors: Vec<String>,
    unstake_selectors: Vec<String>,
}

impl SignatureClassifier {
    pub fn new(staking_contract: &str, selectors: &SelectorConfig) -> Self {
        Self {
            staking_contract: staking_contract.to_lowercase(),
            stake_selectors: selectors.stake.clone(),
            unstake_selectors: selectors.unstake.clone(),
        }
    }

    /// Classify a transaction by destination and call-data prefix.
    /// Contract-creation transactions (no `to`) are never candidates.
    /// Stake selectors are checked before unstake selectors; first match
    /// wins.
    pub fn classify(&self, to: Option<&str>, input: &str) -> Option<EventKind> {
        let to = to?;
        if to.to_lowercase() != self.staking_contract {
            return None;
        }
        if self.stake_selectors.iter().any(|sig| input.starts_with(sig.as_str())) {
            return Some(EventKind::Stake);
        }
        if self.unstake_selectors.iter().any(|sig| input.starts_with(sig.as_str())) {
            return Some(EventKind::Unstake);
        }
        None
    }
}
