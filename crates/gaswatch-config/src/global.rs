use anyhow::{anyhow, Result};
use gaswatch_core::{Band, BandSet, CycleOptions};
use gaswatch_notify::{EmailConfig, WebhookConfig};
use gaswatch_oracle::OracleConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bands::default_bands;

/// 全局配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_bands")]
    pub bands: Vec<Band>,
}

/// 服务配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// 轮询间隔（分钟），必须是 60 的约数
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,

    /// 六段式 cron 表达式，设置后覆盖 interval_minutes
    #[serde(default)]
    pub cron: Option<String>,

    /// 启动时发送服务启动通知
    #[serde(default = "default_true")]
    pub startup_notice: bool,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,
}

/// 通知方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Email,
    Webhook,
    Log,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

// 默认值函数
fn default_service_name() -> String {
    "Ethereum Gas Price Checker".to_string()
}

fn default_interval_minutes() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_notify_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            interval_minutes: default_interval_minutes(),
            cron: None,
            startup_notice: true,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            notify_timeout_secs: default_notify_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            oracle: OracleConfig::default(),
            notifier: NotifierConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::default(),
            bands: default_bands(),
        }
    }
}

impl ServiceConfig {
    /// tokio-cron-scheduler 使用的六段式表达式（秒 分 时 日 月 周）
    pub fn cron_expression(&self) -> String {
        match &self.cron {
            Some(cron) => cron.clone(),
            None if self.interval_minutes >= 60 => "0 0 * * * *".to_string(),
            None => format!("0 */{} * * * *", self.interval_minutes),
        }
    }

    pub fn cycle_options(&self) -> CycleOptions {
        CycleOptions {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            notify_timeout: Duration::from_secs(self.notify_timeout_secs),
        }
    }
}

impl GlobalConfig {
    /// 校验后的区间列表
    pub fn band_set(&self) -> Result<BandSet> {
        Ok(BandSet::new(self.bands.clone())?)
    }

    pub fn validate(&self) -> Result<()> {
        // `*/N` 在每小时整点重置，只有 60 的约数才是固定间隔
        let interval = self.service.interval_minutes;
        if self.service.cron.is_none() && (interval == 0 || interval > 60 || 60 % interval != 0) {
            return Err(anyhow!(
                "interval_minutes ({}) must divide 60; set service.cron for other schedules",
                interval
            ));
        }

        if self.service.fetch_timeout_secs == 0 || self.service.notify_timeout_secs == 0 {
            return Err(anyhow!("fetch and notify timeouts must be greater than 0"));
        }

        self.band_set()?;

        match self.notifier.kind {
            NotifierKind::Email if !self.email.is_complete() => {
                return Err(anyhow!("email notifier requires email.from and email.to"));
            }
            NotifierKind::Webhook if self.notifier.webhook.is_none() => {
                return Err(anyhow!("webhook notifier requires notifier.webhook.url"));
            }
            _ => {}
        }

        Ok(())
    }

    /// 隐藏密钥后的配置
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.oracle.api_key.is_empty() {
            config.oracle.api_key = "***".to_string();
        }
        if config.email.password.is_some() {
            config.email.password = Some("***".to_string());
        }
        config
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
