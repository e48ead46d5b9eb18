//! 日志系统模块
//!
//! 提供结构化日志配置和初始化功能

use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// 全局日志初始化标记，防止重复初始化
static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选）
    pub file_path: Option<PathBuf>,
    /// 是否输出到控制台
    pub console: bool,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            console: true,
            json_format: false,
        }
    }
}

/// 日志系统管理器
pub struct LoggingSystem;

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 返回
    /// * `Result<()>` - 初始化结果
    pub fn setup_logging(config: LogConfig) -> Result<()> {
        // 重复初始化直接返回成功（测试场景下常见）
        if LOGGING_INITIALIZED.get().is_some() {
            return Ok(());
        }

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::level_to_directive(config.level)));

        let console_layer = if config.console {
            if config.json_format {
                Some(fmt::layer().json().with_target(true).boxed())
            } else {
                Some(fmt::layer().with_target(true).boxed())
            }
        } else {
            None
        };

        let file_layer = match &config.file_path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("打开日志文件失败: {}", path.display()))?;
                Some(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(Arc::new(file))
                        .boxed(),
                )
            }
            None => None,
        };

        registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .context("初始化tracing订阅器失败")?;

        // 桥接log宏到tracing
        let _ = tracing_log::LogTracer::init();

        let _ = LOGGING_INITIALIZED.set(true);
        Ok(())
    }

    /// 将日志级别转换为EnvFilter指令
    fn level_to_directive(level: LevelFilter) -> &'static str {
        match level {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }
}
