//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Server Pulse 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum ServerPulseError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测相关错误
    #[error("探测错误: {0}")]
    Probe(#[from] ProbeError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 存储相关错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测错误类型
///
/// 单个目标的探测失败会被降级为OFFLINE结果，这些错误只用于
/// 失败原因的分类和日志记录，不会中断探测周期。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// 域名解析失败
    #[error("域名解析失败: {host}")]
    ResolutionFailed { host: String },

    /// HTTP请求错误
    #[error("HTTP请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 超时错误
    #[error("探测超时")]
    Timeout,
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败
    #[error("通知发送失败: {0}")]
    DeliveryError(String),

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    TemplateError(String),

    /// 实时通道推送失败
    #[error("实时通道推送失败: {0}")]
    ChannelError(String),
}

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// 目标不存在
    #[error("存储中不存在该目标: {id}")]
    TargetNotFound { id: uuid::Uuid },

    /// 历史记录写入失败
    #[error("历史记录写入失败: {0}")]
    HistoryWriteError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ServerPulseError>;
