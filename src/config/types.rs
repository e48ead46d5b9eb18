//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};

/// 主配置结构，包含全局配置和初始目标列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    pub global: GlobalConfig,
    /// 初始监控目标列表
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 启动时是否开启调度
    #[serde(default = "default_schedule_enabled")]
    pub schedule_enabled: bool,
    /// 探测周期（秒，最小1）
    #[serde(default = "default_period")]
    pub period_seconds: u64,
    /// 单次探测超时（毫秒）
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// 是否开启告警通知
    #[serde(default)]
    pub notifications_enabled: bool,
    /// 最大并发探测数（缺省时取可用并行度）
    pub max_concurrent_probes: Option<usize>,
    /// Telegram机器人token（缺省时告警走空实现）
    pub telegram_bot_token: Option<String>,
    /// 告警消息模板（handlebars语法）
    pub alert_template: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            schedule_enabled: default_schedule_enabled(),
            period_seconds: default_period(),
            probe_timeout_ms: default_probe_timeout(),
            notifications_enabled: false,
            max_concurrent_probes: None,
            telegram_bot_token: None,
            alert_template: None,
        }
    }
}

/// 监控目标配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// 显示名称
    pub name: String,
    /// 主机名（用于解析与可达性检测）
    pub host: String,
    /// 探测URL（缺省时为 https://{host}）
    pub url: Option<String>,
}

// 默认值函数
fn default_log_level() -> String {
    "info".to_string()
}
fn default_schedule_enabled() -> bool {
    true
}
fn default_period() -> u64 {
    60
}
fn default_probe_timeout() -> u64 {
    5000
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.period_seconds == 0 {
        return Err("探测周期不能小于1秒".to_string());
    }

    if config.global.probe_timeout_ms == 0 {
        return Err("探测超时时间不能为0".to_string());
    }

    if let Some(0) = config.global.max_concurrent_probes {
        return Err("最大并发探测数不能为0".to_string());
    }

    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    // 验证目标列表
    let mut seen = std::collections::HashSet::new();
    for target in &config.targets {
        if target.name.trim().is_empty() {
            return Err("目标名称不能为空".to_string());
        }
        if target.host.trim().is_empty() {
            return Err(format!("目标 {} 的主机名不能为空", target.name));
        }
        // (host, name) 是跨周期的差异追踪标识，必须唯一
        if !seen.insert((target.host.clone(), target.name.clone())) {
            return Err(format!(
                "目标重复: host={} name={}",
                target.host, target.name
            ));
        }
    }

    Ok(())
}
