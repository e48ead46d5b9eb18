//! 探测模块
//!
//! 提供单目标探测、批量并发探测和探测结果类型

pub mod checker;
pub mod engine;
pub mod result;

// 重新导出主要类型
pub use checker::{HttpProber, Prober};
pub use engine::ProbeEngine;
pub use result::{ProbeResult, ProbeStatus, Target, TargetKey};
