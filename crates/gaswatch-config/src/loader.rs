use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::GlobalConfig;

/// 配置文件名
pub const CONFIG_FILE: &str = "gaswatch.toml";

/// 环境变量前缀，例如 `GASWATCH__SERVICE__INTERVAL_MINUTES=10`
pub const ENV_PREFIX: &str = "GASWATCH";

/// 兼容旧部署的环境变量 → 配置键
const LEGACY_ENV: &[(&str, &str)] = &[
    ("ETHERSCAN_API_KEY", "oracle.api_key"),
    ("EMAIL_ORIGEM_ENDERECO", "email.from"),
    ("EMAIL_ORIGEM_ENDERECO", "email.username"),
    ("EMAIL_ORIGEM_PASSWORD", "email.password"),
    ("EMAIL_DESTINO_ENDERECO", "email.to"),
];

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// 加载配置：文件 < GASWATCH__ 环境变量 < 旧环境变量
    pub fn load(&self) -> Result<GlobalConfig> {
        self.load_with_legacy(|var| std::env::var(var).ok())
    }

    /// 旧环境变量通过 `lookup` 读取，空值视为未设置
    pub fn load_with_legacy<F>(&self, lookup: F) -> Result<GlobalConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = self.config_path();

        if config_path.exists() {
            info!(path = %config_path.display(), "Loading configuration");
        } else {
            // 文件不存在时使用默认值，环境变量仍然生效
            debug!(path = %config_path.display(), "Config file not found, using defaults");
        }

        let mut builder = Config::builder()
            .add_source(
                File::new(
                    config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                    FileFormat::Toml,
                )
                .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );

        for (var, key) in LEGACY_ENV {
            let value = lookup(*var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        let config: GlobalConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// 加载并校验配置
    pub fn load_validated(&self) -> Result<GlobalConfig> {
        let config = self.load()?;
        config.validate()?;
        Ok(config)
    }
}
