//! 命令行接口模块

pub mod args;

// 重新导出主要类型
pub use args::{default_config_path, Args, Commands, LogLevel};
