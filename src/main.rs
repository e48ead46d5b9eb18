//! Server Pulse 主程序入口
//!
//! 服务器状态监控与告警调度引擎

use anyhow::{Context, Result};
use clap::Parser;
use server_pulse::alert::AlertTemplate;
use server_pulse::cli::{default_config_path, Args, Commands};
use server_pulse::config::{Config, ConfigLoader, TomlConfigLoader};
use server_pulse::logging::{LogConfig, LoggingSystem};
use server_pulse::notify::{
    BroadcastLiveChannel, InMemorySubscriberRegistry, MessageDelivery, NoOpDelivery,
    NotificationFanout, TelegramDelivery,
};
use server_pulse::probe::{HttpProber, ProbeEngine, Target};
use server_pulse::scheduler::{DynamicScheduler, ScheduleConfig};
use server_pulse::storage::InMemoryTargetStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        console: true,
        json_format: false,
        ..Default::default()
    };
    LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Server Pulse v{} 启动", server_pulse::VERSION);

    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Start { period, timeout } => execute_start(args, *period, *timeout).await,
        Commands::Check { timeout } => execute_check(args, *timeout).await,
        Commands::Validate => {
            let config = load_config(args).await?;
            println!("配置有效，目标数量: {}", config.targets.len());
            Ok(())
        }
        Commands::Version => {
            println!("{} v{}", server_pulse::APP_NAME, server_pulse::VERSION);
            Ok(())
        }
    }
}

/// 加载配置文件
async fn load_config(args: &Args) -> Result<Config> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(default_config_path);

    let loader = TomlConfigLoader::new(true);
    let config = loader
        .load_from_file(&path)
        .await
        .with_context(|| format!("加载配置文件失败: {}", path.display()))?;

    info!("配置加载完成: {}", path.display());
    Ok(config)
}

/// 组装通知分发器
fn build_fanout(
    config: &Config,
    live: Arc<BroadcastLiveChannel>,
    registry: Arc<InMemorySubscriberRegistry>,
) -> Result<NotificationFanout> {
    let delivery: Arc<dyn MessageDelivery> = match &config.global.telegram_bot_token {
        Some(token) => Arc::new(TelegramDelivery::new(token.clone())?),
        None => {
            info!("未配置Telegram token，告警走空投递实现");
            Arc::new(NoOpDelivery)
        }
    };

    let template = AlertTemplate::new(config.global.alert_template.as_deref())?;

    Ok(NotificationFanout::new(live, delivery, registry, template))
}

/// 应用命令行覆盖项
///
/// 非法值同步拒绝，配置文件中的原值保持不变。
fn apply_overrides(
    config: &mut Config,
    period_override: Option<u64>,
    timeout_override: Option<u64>,
) -> Result<()> {
    if period_override == Some(0) {
        anyhow::bail!("探测周期不能小于1秒");
    }
    if timeout_override == Some(0) {
        anyhow::bail!("探测超时时间不能为0");
    }

    if let Some(period) = period_override {
        config.global.period_seconds = period;
    }
    if let Some(timeout) = timeout_override {
        config.global.probe_timeout_ms = timeout;
    }
    Ok(())
}

/// 启动监控调度服务
async fn execute_start(
    args: &Args,
    period_override: Option<u64>,
    timeout_override: Option<u64>,
) -> Result<()> {
    let mut config = load_config(args).await?;
    apply_overrides(&mut config, period_override, timeout_override)?;

    let targets: Vec<Target> = config.targets.iter().map(Target::from).collect();
    let store = Arc::new(InMemoryTargetStore::with_targets(targets).await);

    let prober = Arc::new(HttpProber::new()?);
    let engine = Arc::new(ProbeEngine::new(
        prober,
        config.global.max_concurrent_probes,
    ));

    let live = Arc::new(BroadcastLiveChannel::default());
    let registry = Arc::new(InMemorySubscriberRegistry::new());
    let fanout = Arc::new(build_fanout(&config, live, registry)?);

    let schedule = ScheduleConfig::from_global(&config.global);
    let scheduler = DynamicScheduler::fleet(schedule, engine, store, fanout);

    scheduler.start();
    info!(
        "调度已启动，周期 {} 秒，超时 {} 毫秒",
        config.global.period_seconds, config.global.probe_timeout_ms
    );

    // 等待退出信号，在途周期会跑完后退出
    signal::ctrl_c().await.context("等待退出信号失败")?;
    info!("收到退出信号，停止调度");
    scheduler.disable();

    Ok(())
}

/// 对配置中的全部目标执行一次探测并打印结果
async fn execute_check(args: &Args, timeout_override: Option<u64>) -> Result<()> {
    let config = load_config(args).await?;

    let targets: Vec<Target> = config.targets.iter().map(Target::from).collect();
    if targets.is_empty() {
        println!("配置中没有监控目标");
        return Ok(());
    }

    let prober = Arc::new(HttpProber::new()?);
    let engine = ProbeEngine::new(prober, config.global.max_concurrent_probes);

    let probe_timeout =
        Duration::from_millis(timeout_override.unwrap_or(config.global.probe_timeout_ms));
    let results = engine.run(&targets, probe_timeout).await;

    for result in &results {
        match (result.response_code, result.latency_ms()) {
            (Some(code), Some(latency)) => {
                println!("{} [{}] {} 状态码 {} 延迟 {}ms", result.name, result.host, result.status, code, latency);
            }
            _ => {
                let reason = result
                    .failure_reason
                    .as_deref()
                    .unwrap_or("不可达");
                println!("{} [{}] {} ({})", result.name, result.host, result.status, reason);
            }
        }
    }

    Ok(())
}
