use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcConfig,
    pub contracts: ContractConfig,
    pub token: TokenConfig,
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
    pub selectors: SelectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RpcConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContractConfig {
    /// Staking contract address (destination of stake/unstake calls).
    pub staking: String,
    /// ERC-20 token contract address (target of the balance probe).
    pub token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TokenConfig {
    pub total_supply: f64,
    pub decimals: u32,
    /// Balance assumed when the direct probe fails and no better
    /// estimation is available.
    pub fallback_balance: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Approximate blocks per day on the target chain (Base: ~43200).
    pub blocks_per_day: u64,
    /// Sampling stride for the main scan: one block fetched per stride.
    pub stride: u64,
    /// Sampling stride for the weekly counting pass.
    pub weekly_stride: u64,
    /// Maximum in-flight block fetches.
    pub concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window_days: u32,
}

/// Method selector sets per event kind. Data, not logic: different
/// contract dialects plug in here without touching the scanner.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectorConfig {
    pub stake: Vec<String>,
    pub unstake: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            contracts: ContractConfig::default(),
            token: TokenConfig::default(),
            scan: ScanConfig::default(),
            analysis: AnalysisConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".into(),
            user: None,
            password: None,
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            staking: String::new(),
            token: String::new(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            total_supply: 1_000_000_000.0,
            decimals: 18,
            fallback_balance: 458_000_000.0,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            blocks_per_day: 43_200,
            stride: 100,
            weekly_stride: 200,
            concurrency: 8,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { window_days: 14 }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            stake: vec![
                "0xa694fc3a".into(), // stake()
                "0xb6b55f25".into(), // deposit(uint256)
                "0x1249c58b".into(), // mint()
            ],
            unstake: vec![
                "0xf48355b9".into(), // toggleAutoRenew()
                "0x2e1a7d4d".into(), // withdraw(uint256)
                "0x3d18b912".into(), // unstake()
                "0xa06c1a33".into(), // toggleAutoRenew() alternative
            ],
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Reject configurations the pipeline cannot run on. Called once,
    /// before any scanning starts.
    pub fn validate(&self) -> Result<()> {
        if self.contracts.staking.trim().is_empty() {
            return Err(Error::Config("staking contract address is required".into()));
        }
        if self.contracts.token.trim().is_empty() {
            return Err(Error::Config("token contract address is required".into()));
        }
        if self.analysis.window_days == 0 {
            return Err(Error::Config(
                "analysis window must be at least 1 day".into(),
            ));
        }
        if self.token.total_supply <= 0.0 {
            return Err(Error::Config("token total supply must be positive".into()));
        }
        if self.scan.stride == 0 || self.scan.weekly_stride == 0 {
            return Err(Error::Config("scan stride must be at least 1 block".into()));
        }
        if self.scan.concurrency == 0 {
            return Err(Error::Config("scan concurrency must be at least 1".into()));
        }
        if self.selectors.stake.is_empty() && self.selectors.unstake.is_empty() {
            return Err(Error::Config(
                "at least one method selector is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.contracts.staking = "0x1111111111111111111111111111111111111111".into();
        config.contracts.token = "0x2222222222222222222222222222222222222222".into();
        config
    }

    #[test]
    fn default_config_missing_contracts_is_invalid() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn zero_window_days_rejected() {
        let mut config = valid_config();
        config.analysis.window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_stride_rejected() {
        let mut config = valid_config();
        config.scan.stride = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_selectors_rejected() {
        let mut config = valid_config();
        config.selectors.stake.clear();
        config.selectors.unstake.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_selectors_present() {
        let config = Config::default();
        assert_eq!(config.selectors.stake.len(), 3);
        assert_eq!(config.selectors.unstake.len(), 4);
    }

    #[test]
    fn parses_toml_overrides() {
        let toml_src = r#"
            [contracts]
            staking = "0xaaa"
            token = "0xbbb"

            [analysis]
            window_days = 30

            [scan]
            stride = 50
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.analysis.window_days, 30);
        assert_eq!(config.scan.stride, 50);
        // Untouched sections keep defaults.
        assert_eq!(config.scan.blocks_per_day, 43_200);
        assert!(config.validate().is_ok());
    }
}
