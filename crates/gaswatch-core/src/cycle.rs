use crate::band::BandSet;
use crate::error::{GasWatchError, Result};
use crate::policy::{decide, PolicyState};
use async_trait::async_trait;
use gaswatch_notify::Notifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// 价格源 trait
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// 获取一次当前数值
    async fn fetch(&self) -> Result<f64>;

    fn name(&self) -> &str;
}

/// 解析价格源返回的文本数值，无法解析或非有限值视为获取失败
pub fn parse_metric(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| GasWatchError::Fetch(format!("unparsable metric {:?}: {}", raw, e)))?;

    if !value.is_finite() {
        return Err(GasWatchError::Fetch(format!("non-finite metric {:?}", raw)));
    }

    Ok(value)
}

/// 周期超时设置
#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            notify_timeout: Duration::from_secs(30),
        }
    }
}

/// 周期结束状态
#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    Sent { band: String, value: f64 },
    Skipped { band: String, value: f64 },
    Failed(GasWatchError),
}

impl CycleResult {
    pub fn outcome(&self) -> &'static str {
        match self {
            CycleResult::Sent { .. } => "sent",
            CycleResult::Skipped { .. } => "skipped",
            CycleResult::Failed(_) => "failed",
        }
    }
}

/// 轮询周期：获取 → 分类 → 决策 → 通知
pub struct PollCycle {
    source: Arc<dyn MetricSource>,
    notifier: Arc<dyn Notifier>,
    bands: BandSet,
    options: CycleOptions,
    state: Mutex<PolicyState>,
    /// 周期互斥，同一时刻只允许一个周期在执行
    in_flight: Mutex<()>,
}

impl PollCycle {
    pub fn new(
        source: Arc<dyn MetricSource>,
        notifier: Arc<dyn Notifier>,
        bands: BandSet,
        options: CycleOptions,
    ) -> Self {
        Self {
            source,
            notifier,
            bands,
            options,
            state: Mutex::new(PolicyState::new()),
            in_flight: Mutex::new(()),
        }
    }

    /// 执行一个周期；若已有周期在执行则排队等待
    pub async fn run_cycle(&self) -> CycleResult {
        let _guard = self.in_flight.lock().await;
        self.execute().await
    }

    /// 定时触发入口；已有周期在执行时直接跳过本次触发
    pub async fn run_tick(&self) -> Option<CycleResult> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!(source = %self.source.name(), "Previous cycle still running, tick skipped");
            return None;
        };
        Some(self.execute().await)
    }

    /// 当前记录的区间
    pub async fn last_band(&self) -> Option<String> {
        self.state.lock().await.last_band().map(str::to_string)
    }

    pub fn bands(&self) -> &BandSet {
        &self.bands
    }

    async fn execute(&self) -> CycleResult {
        debug!(source = %self.source.name(), "Checking gas cost...");

        let value = match timeout(self.options.fetch_timeout, self.source.fetch()).await {
            Ok(Ok(value)) if value.is_finite() => value,
            Ok(Ok(value)) => {
                return report(
                    CycleResult::Failed(GasWatchError::Fetch(format!(
                        "non-finite metric {}",
                        value
                    ))),
                    None,
                    None,
                )
            }
            Ok(Err(e)) => return report(CycleResult::Failed(e), None, None),
            Err(_) => {
                return report(
                    CycleResult::Failed(GasWatchError::Timeout {
                        operation: "fetch",
                        after: self.options.fetch_timeout,
                    }),
                    None,
                    None,
                )
            }
        };

        let band = match self.bands.classify(value) {
            Ok(band) => band,
            Err(e) => return report(CycleResult::Failed(e), Some(value), None),
        };

        // 锁只在决策期间持有，不跨越通知的 await
        let decision = {
            let mut state = self.state.lock().await;
            decide(band, value, &mut state)
        };

        if !decision.should_notify || !self.notifier.is_enabled() {
            info!("The notification was skipped -> {}", decision.message.content);
            return report(
                CycleResult::Skipped {
                    band: band.code.clone(),
                    value,
                },
                Some(value),
                Some(band.code.as_str()),
            );
        }

        let sent = timeout(self.options.notify_timeout, self.notifier.send(&decision.message)).await;
        let result = match sent {
            Ok(Ok(outcome)) if outcome.success => {
                info!("{} | {} Gwei.", decision.message.title, value);
                CycleResult::Sent {
                    band: band.code.clone(),
                    value,
                }
            }
            Ok(Ok(outcome)) => CycleResult::Failed(GasWatchError::Notify(outcome.message)),
            Ok(Err(e)) => CycleResult::Failed(GasWatchError::Notify(e.to_string())),
            Err(_) => CycleResult::Failed(GasWatchError::Timeout {
                operation: "notify",
                after: self.options.notify_timeout,
            }),
        };

        report(result, Some(value), Some(band.code.as_str()))
    }
}

/// 每个周期结束时输出一条结构化日志
fn report(result: CycleResult, value: Option<f64>, band: Option<&str>) -> CycleResult {
    match &result {
        CycleResult::Failed(e) => error!(
            outcome = result.outcome(),
            band = ?band,
            value = ?value,
            error = %e,
            "Gas price cycle failed"
        ),
        _ => info!(
            outcome = result.outcome(),
            band = ?band,
            value = ?value,
            "Gas price cycle finished"
        ),
    }
    result
}
