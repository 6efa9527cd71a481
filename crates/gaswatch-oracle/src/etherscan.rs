use async_trait::async_trait;
use gaswatch_core::{parse_metric, GasWatchError, MetricSource, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// gasoracle 返回的价格档位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    #[serde(alias = "safe")]
    SafeGasPrice,
    #[default]
    #[serde(alias = "propose")]
    ProposeGasPrice,
    #[serde(alias = "fast")]
    FastGasPrice,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::SafeGasPrice => "SafeGasPrice",
            PriceField::ProposeGasPrice => "ProposeGasPrice",
            PriceField::FastGasPrice => "FastGasPrice",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub price_field: PriceField,
}

fn default_base_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            price_field: PriceField::default(),
        }
    }
}

/// Etherscan gastracker 价格源
pub struct EtherscanGasOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

impl EtherscanGasOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MetricSource for EtherscanGasOracle {
    async fn fetch(&self) -> Result<f64> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("module", "gastracker"),
                ("action", "gasoracle"),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GasWatchError::Fetch(format!("gas oracle unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(GasWatchError::Fetch(format!(
                "gas oracle returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GasWatchError::Fetch(format!("malformed gas oracle response: {}", e)))?;

        let price = extract_price(&body, self.config.price_field)?;
        debug!(field = self.config.price_field.as_str(), price, "Gas oracle responded");
        Ok(price)
    }

    fn name(&self) -> &str {
        "etherscan"
    }
}

/// 从 gasoracle 响应中读取价格
pub fn extract_price(body: &serde_json::Value, field: PriceField) -> Result<f64> {
    let status = body.get("status").and_then(|s| s.as_str()).unwrap_or_default();
    if status != "1" {
        let reason = body
            .get("result")
            .and_then(|r| r.as_str())
            .or_else(|| body.get("message").and_then(|m| m.as_str()))
            .unwrap_or("unknown error");
        return Err(GasWatchError::Fetch(format!("gas oracle rejected request: {}", reason)));
    }

    let raw = body
        .get("result")
        .and_then(|r| r.get(field.as_str()))
        .ok_or_else(|| GasWatchError::Fetch(format!("{} missing from response", field.as_str())))?;

    match raw {
        serde_json::Value::String(s) => parse_metric(s),
        serde_json::Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GasWatchError::Fetch(format!("invalid {} {}", field.as_str(), n))),
        other => Err(GasWatchError::Fetch(format!(
            "unexpected {} value {}",
            field.as_str(),
            other
        ))),
    }
}
