pub mod etherscan;

pub use etherscan::{extract_price, EtherscanGasOracle, OracleConfig, PriceField};
