//! 动态调度器模块
//!
//! 可运行时重配置的周期性探测任务：开关、周期、超时均可在线调整，
//! 每次重配置保证先取消旧的定时器注册再注册新的，任意时刻最多一个
//! 活动定时器，周期之间永不重叠。

use crate::alert::DeltaTracker;
use crate::config::GlobalConfig;
use crate::error::{ConfigError, Result};
use crate::notify::NotificationFanout;
use crate::probe::{ProbeEngine, ProbeResult, Target};
use crate::storage::TargetStore;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};
use uuid::Uuid;

/// 全量调度器的实时推送主题
pub const FLEET_TOPIC: &str = "status-of-servers/server-status-updates";

/// 固定目标调度器的实时推送主题
pub const PINNED_TOPIC: &str = "status-of-servers/single-server-status-updates";

/// 调度配置
///
/// 由调度器实例独占持有，外部重配置请求原子替换并触发
/// 取消-重注册，绝不暴露裸共享字段。
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// 是否启用调度
    pub enabled: bool,
    /// 探测周期
    pub period: Duration,
    /// 单次探测超时
    pub probe_timeout: Duration,
    /// 是否启用告警通知
    pub notifications_enabled: bool,
}

impl ScheduleConfig {
    /// 从全局配置构建调度配置
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            enabled: global.schedule_enabled,
            period: Duration::from_secs(global.period_seconds),
            probe_timeout: Duration::from_millis(global.probe_timeout_ms),
            notifications_enabled: global.notifications_enabled,
        }
    }
}

/// 目标选择策略
///
/// 全量与固定目标两个调度器实例共享同一状态机，只在目标选择上不同。
#[derive(Debug, Clone)]
pub enum TargetSelection {
    /// 探测存储中的全部目标
    Fleet,
    /// 只探测显式固定的目标子集
    Pinned(Vec<Uuid>),
}

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 已停止，不再注册新周期
    Stopped,
    /// 运行中，存在一个活动定时器
    Active,
}

/// 活动定时器句柄：唯一持有，重配置时整体替换
struct TimerHandle {
    /// 停止信号发送端
    shutdown: watch::Sender<bool>,
    /// 定时器任务
    #[allow(dead_code)]
    task: JoinHandle<()>,
}

/// 周期执行所需的共享状态
///
/// 定时器任务跨代共享这份状态：`cycle_lock` 保证即使新旧定时器
/// 短暂共存（旧周期尚在收尾、新定时器已注册），周期体也绝不并发。
struct CycleShared {
    /// 实例名（日志用）
    name: String,
    /// 实时推送主题
    topic: String,
    /// 调度配置（每次触发前读取快照，变更作用于下一次触发）
    config: StdMutex<ScheduleConfig>,
    /// 目标选择策略
    selection: StdMutex<TargetSelection>,
    /// 探测引擎
    engine: Arc<ProbeEngine>,
    /// 目标存储
    store: Arc<dyn TargetStore>,
    /// 通知分发器
    fanout: Arc<NotificationFanout>,
    /// 差异追踪器（周期串行化保证独占访问）
    tracker: Mutex<DeltaTracker>,
    /// 周期互斥锁，保证周期体不重叠
    cycle_lock: Mutex<()>,
}

impl CycleShared {
    /// 选取本周期的目标集合
    async fn select_targets(&self) -> Result<Vec<Target>> {
        let selection = self
            .selection
            .lock()
            .expect("目标选择锁中毒")
            .clone();

        match selection {
            TargetSelection::Fleet => self.store.list_targets().await,
            TargetSelection::Pinned(ids) => {
                let mut targets = Vec::with_capacity(ids.len());
                for id in ids {
                    match self.store.get_target(id).await {
                        Ok(target) => targets.push(target),
                        // 单个失效的固定目标不能拖垮整个周期
                        Err(e) => warn!("调度器 {} 固定目标 {} 获取失败，跳过: {}", self.name, id, e),
                    }
                }
                Ok(targets)
            }
        }
    }

    /// 执行一个完整周期：选目标、批量探测、写历史、算差异、推送、告警
    ///
    /// 周期体在 `cycle_lock` 下执行，触发到本方法返回之间是一个
    /// 同步屏障：所有探测完成后才进入历史写入与差异计算。
    async fn run_cycle(&self) -> Result<()> {
        let _guard = self.cycle_lock.lock().await;

        // 已触发的周期使用触发时的配置快照
        let config = self.config.lock().expect("调度配置锁中毒").clone();

        let targets = self.select_targets().await?;
        if targets.is_empty() {
            warn!("调度器 {} 没有可探测的目标，跳过本周期", self.name);
            return Ok(());
        }

        let results = self.engine.run(&targets, config.probe_timeout).await;
        debug_assert_eq!(results.len(), targets.len());

        // 历史写入是尽力而为，失败不阻塞推送与告警
        if let Err(e) = self.store.append_history(&results).await {
            error!("调度器 {} 历史记录写入失败: {}", self.name, e);
        }

        let offline: Vec<ProbeResult> = results
            .iter()
            .filter(|r| !r.status.is_online())
            .cloned()
            .collect();

        // 差异计算与离线集合提交是同一原子步骤
        let delta = {
            let mut tracker = self.tracker.lock().await;
            tracker.process(offline)
        };

        // 实时推送硬失败作为本周期的错误上报，下一周期独立进行
        self.fanout.publish(&self.topic, &results).await?;

        if config.notifications_enabled && !delta.is_empty() {
            self.fanout
                .alert(&delta, config.period, config.probe_timeout)
                .await;
        }

        Ok(())
    }
}

/// 动态调度器
///
/// 状态机：STOPPED <-> ACTIVE。启用、调整周期、调整超时、调整固定
/// 目标列表都会取消当前定时器注册并按新配置重新注册；已经在执行
/// 的周期体允许跑完，取消只阻止未来的触发，绝不中断在途的探测。
/// 重配置是幂等的：同一配置提交两次得到同一稳态，不会出现两个
/// 并存的调度。
pub struct DynamicScheduler {
    /// 共享周期状态
    shared: Arc<CycleShared>,
    /// 活动定时器句柄
    handle: StdMutex<Option<TimerHandle>>,
}

impl DynamicScheduler {
    /// 创建新的动态调度器
    ///
    /// # 参数
    /// * `name` - 实例名
    /// * `topic` - 实时推送主题
    /// * `selection` - 目标选择策略
    /// * `config` - 初始调度配置
    /// * `engine` - 探测引擎
    /// * `store` - 目标存储
    /// * `fanout` - 通知分发器
    ///
    /// # 返回
    /// * `Self` - 调度器实例
    pub fn new(
        name: impl Into<String>,
        topic: impl Into<String>,
        selection: TargetSelection,
        config: ScheduleConfig,
        engine: Arc<ProbeEngine>,
        store: Arc<dyn TargetStore>,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self {
            shared: Arc::new(CycleShared {
                name: name.into(),
                topic: topic.into(),
                config: StdMutex::new(config),
                selection: StdMutex::new(selection),
                engine,
                store,
                fanout,
                tracker: Mutex::new(DeltaTracker::new()),
                cycle_lock: Mutex::new(()),
            }),
            handle: StdMutex::new(None),
        }
    }

    /// 创建全量调度器
    pub fn fleet(
        config: ScheduleConfig,
        engine: Arc<ProbeEngine>,
        store: Arc<dyn TargetStore>,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self::new(
            "fleet",
            FLEET_TOPIC,
            TargetSelection::Fleet,
            config,
            engine,
            store,
            fanout,
        )
    }

    /// 创建固定目标调度器
    pub fn pinned(
        ids: Vec<Uuid>,
        config: ScheduleConfig,
        engine: Arc<ProbeEngine>,
        store: Arc<dyn TargetStore>,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self::new(
            "single",
            PINNED_TOPIC,
            TargetSelection::Pinned(ids),
            config,
            engine,
            store,
            fanout,
        )
    }

    /// 获取当前调度器状态
    pub fn state(&self) -> SchedulerState {
        if self.handle.lock().expect("定时器句柄锁中毒").is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Stopped
        }
    }

    /// 获取当前调度配置快照
    pub fn config(&self) -> ScheduleConfig {
        self.shared.config.lock().expect("调度配置锁中毒").clone()
    }

    /// 进程启动时按初始配置决定是否开始调度
    pub fn start(&self) {
        if self.config().enabled {
            self.reschedule();
        }
    }

    /// 启用调度
    pub fn enable(&self) {
        {
            let mut config = self.shared.config.lock().expect("调度配置锁中毒");
            config.enabled = true;
        }
        info!("调度器 {} 已启用", self.shared.name);
        self.reschedule();
    }

    /// 停用调度
    ///
    /// 在途的周期允许跑完并正常持久化、推送、告警，之后不再注册新周期。
    pub fn disable(&self) {
        {
            let mut config = self.shared.config.lock().expect("调度配置锁中毒");
            config.enabled = false;
        }
        info!("调度器 {} 已停用", self.shared.name);
        self.cancel_timer();
    }

    /// 调整探测周期
    ///
    /// # 参数
    /// * `seconds` - 新周期（秒，最小1），非法值同步拒绝，原配置保持生效
    ///
    /// # 返回
    /// * `Result<()>` - 调整结果
    pub fn set_period(&self, seconds: u64) -> Result<()> {
        if seconds == 0 {
            return Err(ConfigError::ValidationError("探测周期不能小于1秒".to_string()).into());
        }

        {
            let mut config = self.shared.config.lock().expect("调度配置锁中毒");
            config.period = Duration::from_secs(seconds);
        }
        info!("调度器 {} 周期调整为 {} 秒", self.shared.name, seconds);
        self.reschedule();
        Ok(())
    }

    /// 调整单次探测超时
    ///
    /// # 参数
    /// * `probe_timeout` - 新超时，零值同步拒绝
    ///
    /// # 返回
    /// * `Result<()>` - 调整结果
    pub fn set_probe_timeout(&self, probe_timeout: Duration) -> Result<()> {
        if probe_timeout.is_zero() {
            return Err(ConfigError::ValidationError("探测超时时间不能为0".to_string()).into());
        }

        {
            let mut config = self.shared.config.lock().expect("调度配置锁中毒");
            config.probe_timeout = probe_timeout;
        }
        info!(
            "调度器 {} 探测超时调整为 {} 毫秒",
            self.shared.name,
            probe_timeout.as_millis()
        );
        self.reschedule();
        Ok(())
    }

    /// 开关告警通知
    ///
    /// 只影响周期体内的告警分支，不需要取消-重注册。
    pub fn set_notifications_enabled(&self, enabled: bool) {
        let mut config = self.shared.config.lock().expect("调度配置锁中毒");
        config.notifications_enabled = enabled;
        info!(
            "调度器 {} 告警通知已{}",
            self.shared.name,
            if enabled { "开启" } else { "关闭" }
        );
    }

    /// 调整固定目标列表
    ///
    /// 仅对固定目标调度器有效，全量调度器同步拒绝。
    ///
    /// # 参数
    /// * `ids` - 新的固定目标ID列表
    ///
    /// # 返回
    /// * `Result<()>` - 调整结果
    pub fn set_pinned_targets(&self, ids: Vec<Uuid>) -> Result<()> {
        {
            let mut selection = self.shared.selection.lock().expect("目标选择锁中毒");
            match *selection {
                TargetSelection::Pinned(_) => {
                    *selection = TargetSelection::Pinned(ids);
                }
                TargetSelection::Fleet => {
                    return Err(ConfigError::ValidationError(
                        "全量调度器不支持固定目标列表".to_string(),
                    )
                    .into());
                }
            }
        }
        info!("调度器 {} 固定目标列表已更新", self.shared.name);
        self.reschedule();
        Ok(())
    }

    /// 立即执行一个周期（与定时触发共用同一周期互斥锁）
    pub async fn run_cycle_now(&self) -> Result<()> {
        self.shared.run_cycle().await
    }

    /// 取消当前定时器并在启用状态下按最新配置重新注册
    ///
    /// 持有句柄锁完成整个替换，保证任意时刻最多一个活动定时器。
    fn reschedule(&self) {
        let mut handle = self.handle.lock().expect("定时器句柄锁中毒");

        if let Some(old) = handle.take() {
            let _ = old.shutdown.send(true);
        }

        let config = self.shared.config.lock().expect("调度配置锁中毒").clone();
        if !config.enabled {
            return;
        }

        *handle = Some(Self::spawn_timer(Arc::clone(&self.shared), config.period));
    }

    /// 取消当前定时器注册
    ///
    /// 只发送停止信号，不中止任务：在途的周期体跑完后定时器自行退出。
    fn cancel_timer(&self) {
        let mut handle = self.handle.lock().expect("定时器句柄锁中毒");
        if let Some(old) = handle.take() {
            let _ = old.shutdown.send(true);
            info!("调度器 {} 定时器已取消", self.shared.name);
        }
    }

    /// 注册新的定时器任务
    fn spawn_timer(shared: Arc<CycleShared>, period: Duration) -> TimerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                "调度器 {} 定时器启动，周期 {} 秒",
                shared.name,
                period.as_secs()
            );

            loop {
                // 停止信号优先于到期的tick，停用后不再开始新周期
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = shared.run_cycle().await {
                            // 本周期的失败只记录，下一周期独立进行
                            error!("调度器 {} 周期执行失败: {}", shared.name, e);
                        }
                    }
                }
            }

            info!("调度器 {} 定时器退出", shared.name);
        });

        TimerHandle { shutdown, task }
    }
}

impl Drop for DynamicScheduler {
    fn drop(&mut self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(old) = handle.take() {
                let _ = old.shutdown.send(true);
            }
        }
    }
}
