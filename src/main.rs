mod analysis;
mod config;
mod core;
mod error;
mod report;
mod rpc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::rpc::EthRpc;

/// Staking protocol health check: scans stake/unstake flows over a
/// rolling block window and produces a point-in-time report.
#[derive(Debug, Parser)]
#[command(name = "stakepulse", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Staking contract address (overrides config).
    #[arg(long)]
    staking: Option<String>,

    /// Token contract address (overrides config).
    #[arg(long)]
    token: Option<String>,

    /// Analysis window in days (overrides config).
    #[arg(long)]
    days: Option<u32>,

    /// Token total supply (overrides config).
    #[arg(long)]
    supply: Option<f64>,

    /// JSON-RPC endpoint URL (overrides config).
    #[arg(long)]
    rpc_url: Option<String>,

    /// Output path for the JSON report (default: timestamped file).
    #[arg(long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stakepulse=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("Health check failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config);
    apply_overrides(&mut config, &cli);
    config.validate()?;

    tracing::info!("🎯 Staking health check starting");
    tracing::info!("Staking contract: {}", config.contracts.staking);
    tracing::info!("Token contract: {}", config.contracts.token);
    tracing::info!("Analysis window: {} days", config.analysis.window_days);

    let rpc = EthRpc::new(&config.rpc);
    let result = core::pipeline::run_health_check(&rpc, &config).await?;

    report::render(&result);

    let output = cli
        .output
        .unwrap_or_else(|| result.default_output_path());
    result.save_json(&output)?;
    tracing::info!("Report saved to {output}");

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(staking) = &cli.staking {
        config.contracts.staking = staking.clone();
    }
    if let Some(token) = &cli.token {
        config.contracts.token = token.clone();
    }
    if let Some(days) = cli.days {
        config.analysis.window_days = days;
    }
    if let Some(supply) = cli.supply {
        config.token.total_supply = supply;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc.url = url.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_replace_config_values() {
        let cli = Cli {
            config: "config.toml".into(),
            staking: Some("0xaaa".into()),
            token: Some("0xbbb".into()),
            days: Some(30),
            supply: Some(500_000_000.0),
            rpc_url: Some("http://localhost:9999".into()),
            output: None,
        };
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.contracts.staking, "0xaaa");
        assert_eq!(config.analysis.window_days, 30);
        assert_eq!(config.token.total_supply, 500_000_000.0);
        assert_eq!(config.rpc.url, "http://localhost:9999");
    }

    #[test]
    fn cli_without_overrides_keeps_config() {
        let cli = Cli {
            config: "config.toml".into(),
            staking: None,
            token: None,
            days: None,
            supply: None,
            rpc_url: None,
            output: None,
        };
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.analysis.window_days, 14);
    }
}
