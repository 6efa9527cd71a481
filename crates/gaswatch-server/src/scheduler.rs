use anyhow::Result;
use gaswatch_core::PollCycle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

/// 按 cron 表达式定时触发轮询周期
pub struct CycleScheduler {
    cycle: Arc<PollCycle>,
    scheduler: Arc<RwLock<Option<JobScheduler>>>,
}

impl CycleScheduler {
    pub fn new(cycle: Arc<PollCycle>) -> Self {
        Self {
            cycle,
            scheduler: Arc::new(RwLock::new(None)),
        }
    }

    /// 启动调度器并注册周期任务
    pub async fn start(&self, cron: &str) -> Result<()> {
        let scheduler = JobScheduler::new().await?;

        let cycle = self.cycle.clone();
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let cycle = cycle.clone();

            Box::pin(async move {
                debug!("Scheduled tick");
                // 周期结果已在 PollCycle 内记录
                let _ = cycle.run_tick().await;
            })
        })?;

        let job_id = scheduler.add(job).await?;
        scheduler.start().await?;

        *self.scheduler.write().await = Some(scheduler);

        info!(cron = %cron, job_id = %job_id, "Cycle scheduler started");
        Ok(())
    }

    /// 停止调度器
    pub async fn stop(&self) -> Result<()> {
        if let Some(mut scheduler) = self.scheduler.write().await.take() {
            scheduler.shutdown().await?;
        }

        info!("Cycle scheduler stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler.read().await.is_some()
    }
}
