use anyhow::Result;
use gaswatch_config::{GlobalConfig, NotifierKind, ServiceConfig};
use gaswatch_core::PollCycle;
use gaswatch_notify::{EmailNotifier, LogNotifier, Notifier, NotifyMessage, WebhookNotifier};
use gaswatch_oracle::EtherscanGasOracle;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

/// 按配置创建通知器
pub fn build_notifier(config: &GlobalConfig) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match config.notifier.kind {
        NotifierKind::Email => Arc::new(EmailNotifier::new(&config.email)?),
        NotifierKind::Webhook => {
            let webhook = config
                .notifier
                .webhook
                .clone()
                .ok_or_else(|| anyhow::anyhow!("notifier.webhook is not configured"))?;
            Arc::new(WebhookNotifier::new(webhook))
        }
        NotifierKind::Log => Arc::new(LogNotifier),
    };

    info!(notifier = notifier.name(), "Notifier ready");
    Ok(notifier)
}

/// 组装轮询周期
pub fn build_cycle(config: &GlobalConfig, notifier: Arc<dyn Notifier>) -> Result<Arc<PollCycle>> {
    let source = Arc::new(EtherscanGasOracle::new(config.oracle.clone()));
    let bands = config.band_set()?;

    Ok(Arc::new(PollCycle::new(
        source,
        notifier,
        bands,
        config.service.cycle_options(),
    )))
}

pub fn startup_message(service: &ServiceConfig) -> NotifyMessage {
    NotifyMessage::info(
        format!("The '{}' service has been started successfully!", service.name),
        "You should receive emails with the price of gas on the ethereum network when price level changes.",
    )
}

/// 发送服务启动通知，失败只记录日志
pub async fn announce_startup(notifier: &dyn Notifier, service: &ServiceConfig) -> bool {
    let message = startup_message(service);
    let limit = Duration::from_secs(service.notify_timeout_secs);

    match timeout(limit, notifier.send(&message)).await {
        Ok(Ok(result)) if result.success => {
            info!(notifier = notifier.name(), "Startup notification sent");
            true
        }
        Ok(Ok(result)) => {
            error!(notifier = notifier.name(), error = %result.message, "Startup notification failed");
            false
        }
        Ok(Err(e)) => {
            error!(notifier = notifier.name(), error = %e, "Startup notification failed");
            false
        }
        Err(_) => {
            error!(notifier = notifier.name(), after = ?limit, "Startup notification timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_message() {
        let message = startup_message(&ServiceConfig::default());
        assert_eq!(
            message.title,
            "The 'Ethereum Gas Price Checker' service has been started successfully!"
        );
    }

    #[tokio::test]
    async fn test_build_log_notifier_and_cycle() {
        let mut config = GlobalConfig::default();
        config.notifier.kind = NotifierKind::Log;

        let notifier = build_notifier(&config).unwrap();
        assert_eq!(notifier.name(), "log");
        assert!(announce_startup(notifier.as_ref(), &config.service).await);

        let cycle = build_cycle(&config, notifier).unwrap();
        assert_eq!(cycle.bands().len(), 4);
        assert_eq!(cycle.last_band().await, None);
    }

    #[test]
    fn test_build_email_notifier_requires_addresses() {
        let config = GlobalConfig::default();
        assert!(build_notifier(&config).is_err());
    }

    #[test]
    fn test_build_cycle_rejects_invalid_bands() {
        let mut config = GlobalConfig::default();
        config.bands.truncate(2);
        assert!(build_cycle(&config, Arc::new(LogNotifier)).is_err());
    }
}
