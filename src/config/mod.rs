//! 配置模块
//!
//! 提供配置数据结构、TOML加载和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{ConfigLoader, TomlConfigLoader};
pub use types::{validate_config, Config, GlobalConfig, TargetConfig};
