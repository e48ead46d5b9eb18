//! 告警模块
//!
//! 提供跨周期的上下线差异追踪和告警消息渲染

pub mod message;
pub mod tracker;

// 重新导出主要类型
pub use message::AlertTemplate;
pub use tracker::DeltaTracker;
