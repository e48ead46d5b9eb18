//! Server Pulse - 服务器状态监控与告警调度引擎
//!
//! 这是一个用Rust编写的服务器健康监控调度引擎，支持：
//! - 周期性探测（DNS解析 + 可达性检测 + HTTP状态/延迟采集）
//! - 有界并发的批量探测
//! - 跨周期的上下线差异追踪与告警
//! - 运行时动态调整调度参数（周期、超时、开关）
//! - 实时结果推送与多订阅者告警分发

pub mod alert;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod probe;
pub mod scheduler;
pub mod storage;

// 重新导出主要类型
pub use config::{Config, GlobalConfig, TargetConfig};
pub use error::{Result, ServerPulseError};
pub use probe::{HttpProber, ProbeEngine, ProbeResult, ProbeStatus, Prober, Target};
pub use scheduler::{DynamicScheduler, ScheduleConfig, TargetSelection};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
