//! 批量探测引擎
//!
//! 将一批目标分发到有界工作池并发探测，收集全部结果

use crate::probe::checker::Prober;
use crate::probe::result::{ProbeResult, ProbeStatus, Target};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// 默认并发度：取可用并行度，探测是I/O密集型但不允许无界并发
fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// 批量探测引擎
///
/// 每个目标的探测相互独立，单个目标的失败（解析错误、I/O错误、panic）
/// 不会影响、延迟或取消其他目标的探测。`run` 本身不返回错误，
/// 单目标失败一律编码为OFFLINE结果。
pub struct ProbeEngine {
    /// 单目标探测器
    prober: Arc<dyn Prober>,
    /// 并发控制信号量
    semaphore: Arc<Semaphore>,
    /// 工作池大小
    pool_size: usize,
}

impl ProbeEngine {
    /// 创建新的探测引擎
    ///
    /// # 参数
    /// * `prober` - 单目标探测器
    /// * `pool_size` - 工作池大小（缺省时取可用并行度）
    ///
    /// # 返回
    /// * `Self` - 引擎实例
    pub fn new(prober: Arc<dyn Prober>, pool_size: Option<usize>) -> Self {
        let pool_size = pool_size.unwrap_or_else(default_pool_size).max(1);
        Self {
            prober,
            semaphore: Arc::new(Semaphore::new(pool_size)),
            pool_size,
        }
    }

    /// 获取工作池大小
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// 并发探测一批目标
    ///
    /// 等待所有已分发的探测完成后才返回，结果与目标一一对应（顺序不保证）。
    ///
    /// # 参数
    /// * `targets` - 目标列表
    /// * `probe_timeout` - 单次探测超时
    ///
    /// # 返回
    /// * `Vec<ProbeResult>` - 每个目标恰好一条结果
    pub async fn run(&self, targets: &[Target], probe_timeout: Duration) -> Vec<ProbeResult> {
        debug!("开始批量探测，目标数量: {}，并发上限: {}", targets.len(), self.pool_size);

        let handles: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let prober = Arc::clone(&self.prober);
                let semaphore = Arc::clone(&self.semaphore);
                tokio::spawn(async move {
                    match semaphore.acquire().await {
                        Ok(_permit) => prober.probe(&target, probe_timeout).await,
                        // 信号量只在引擎销毁时关闭，兜底为离线
                        Err(_) => ProbeResult::new(&target, ProbeStatus::Offline)
                            .with_failure_reason("工作池已关闭".to_string()),
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(targets.len());
        for (target, handle) in targets.iter().zip(join_all(handles).await) {
            match handle {
                Ok(result) => results.push(result),
                Err(e) => {
                    // 单个探测任务panic不影响其他目标
                    error!("探测任务异常退出 {}: {}", target.host, e);
                    results.push(
                        ProbeResult::new(target, ProbeStatus::Offline)
                            .with_failure_reason("探测任务异常退出".to_string()),
                    );
                }
            }
        }

        debug!("批量探测完成，结果数量: {}", results.len());
        results
    }
}
