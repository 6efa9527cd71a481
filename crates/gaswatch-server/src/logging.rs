use anyhow::{anyhow, Result};
use gaswatch_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// 初始化日志，RUST_LOG 优先于配置文件中的级别
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow!("failed to install logger: {}", e))
}
