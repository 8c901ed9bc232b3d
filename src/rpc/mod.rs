use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::RpcConfig;
use crate::error::{Error, Result};

/// Simple EVM JSON-RPC client. Read-only: block headers with full
/// transaction lists, latest height, and generic `eth_call` reads.
pub struct EthRpc {
    url: String,
    client: Client,
    /// base64 encoded user:pass for nodes behind an authenticating proxy.
    auth: Option<String>,
}

/// A block as returned by `eth_getBlockByNumber` with full transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    /// Hex-encoded unix timestamp, e.g. "0x66b2c1a0".
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<TxRecord>,
}

/// A transaction as embedded in a block. `to` is absent for contract
/// creation transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct TxRecord {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub value: String,
}

impl EthRpc {
    pub fn new(config: &RpcConfig) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};
        let auth = match (&config.user, &config.password) {
            (Some(user), Some(pass)) => Some(STANDARD.encode(format!("{user}:{pass}"))),
            _ => None,
        };
        Self {
            url: config.url.clone(),
            client: Client::new(),
            auth,
        }
    }

    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", format!("Basic {auth}"));
        }

        let resp = request.send().await?;
        let json: Value = resp.json().await?;

        if let Some(err) = json.get("error").and_then(|e| {
            if e.is_null() {
                None
            } else {
                Some(e.clone())
            }
        }) {
            return Err(Error::Rpc(err));
        }

        Ok(json["result"].clone())
    }

    /// Latest block height (`eth_blockNumber`).
    pub async fn latest_block_number(&self) -> Result<u64> {
        let result = self.call("eth_blockNumber", vec![]).await?;
        let hex = result.as_str().unwrap_or("0x0");
        parse_hex_u64(hex)
    }

    /// Fetch a block with its full transaction list. `Ok(None)` means the
    /// node has no such block.
    pub async fn block_by_number(&self, number: u64) -> Result<Option<Block>> {
        let result = self
            .call(
                "eth_getBlockByNumber",
                vec![json!(format!("{number:#x}")), json!(true)],
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }

    /// Generic read-only contract call (`eth_call` at latest). Returns the
    /// raw hex return data, or `None` when the node reports nothing.
    pub async fn contract_read(&self, contract: &str, call_data: &str) -> Result<Option<String>> {
        let result = self
            .call(
                "eth_call",
                vec![json!({"to": contract, "data": call_data}), json!("latest")],
            )
            .await?;
        match result.as_str() {
            Some(hex) if !hex.is_empty() && hex != "0x" => Ok(Some(hex.to_string())),
            _ => Ok(None),
        }
    }
}

/// Read-only ledger access consumed by the scanner and balance verifier.
/// The production implementation is [`EthRpc`]; tests substitute canned
/// blocks.
#[allow(async_fn_in_trait)]
pub trait LedgerPort: Sync {
    async fn latest_block_number(&self) -> Result<u64>;
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>>;
    async fn contract_read(&self, contract: &str, call_data: &str) -> Result<Option<String>>;
}

impl LedgerPort for EthRpc {
    async fn latest_block_number(&self) -> Result<u64> {
        EthRpc::latest_block_number(self).await
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<Block>> {
        EthRpc::block_by_number(self, number).await
    }

    async fn contract_read(&self, contract: &str, call_data: &str) -> Result<Option<String>> {
        EthRpc::contract_read(self, contract, call_data).await
    }
}

/// Parse a 0x-prefixed hex quantity into u64.
pub fn parse_hex_u64(hex: &str) -> Result<u64> {
    let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
    if trimmed.is_empty() {
        return Err(Error::HexQuantity(hex.to_string()));
    }
    u64::from_str_radix(trimmed, 16).map_err(|_| Error::HexQuantity(hex.to_string()))
}

/// Parse a 0x-prefixed hex quantity into u128. Token balances in wei
/// overflow u64 but fit comfortably in u128.
pub fn parse_hex_u128(hex: &str) -> Result<u128> {
    let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
    if trimmed.is_empty() {
        return Err(Error::HexQuantity(hex.to_string()));
    }
    u128::from_str_radix(trimmed, 16).map_err(|_| Error::HexQuantity(hex.to_string()))
}
