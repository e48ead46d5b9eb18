//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Server Pulse - 服务器状态监控与告警调度引擎
#[derive(Parser, Debug, Clone)]
#[command(
    name = "server-pulse",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "SERVER_PULSE_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "SERVER_PULSE_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动监控调度服务
    Start {
        /// 探测周期（秒），覆盖配置文件
        #[arg(
            short,
            long,
            value_name = "SECONDS",
            help = "探测周期（秒）",
            env = "SERVER_PULSE_PERIOD"
        )]
        period: Option<u64>,

        /// 单次探测超时（毫秒），覆盖配置文件
        #[arg(
            short,
            long,
            value_name = "MILLIS",
            help = "单次探测超时（毫秒）",
            env = "SERVER_PULSE_TIMEOUT"
        )]
        timeout: Option<u64>,
    },

    /// 对配置中的全部目标执行一次探测并打印结果
    Check {
        /// 单次探测超时（毫秒）
        #[arg(short, long, value_name = "MILLIS", help = "单次探测超时（毫秒）")]
        timeout: Option<u64>,
    },

    /// 验证配置文件
    Validate,

    /// 显示版本信息
    Version,
}

/// 解析默认配置文件路径
///
/// 优先使用当前目录下的 server-pulse.toml，其次使用用户配置目录。
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from("server-pulse.toml");
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("server-pulse").join("config.toml"))
        .unwrap_or(local)
}
