//! 通知模块
//!
//! 提供实时结果推送、订阅者注册表和告警消息分发功能

pub mod fanout;
pub mod live;
pub mod registry;
pub mod sender;
pub mod telegram;

// 重新导出主要类型
pub use fanout::NotificationFanout;
pub use live::{BroadcastLiveChannel, LiveChannel, LiveUpdate};
pub use registry::{InMemorySubscriberRegistry, SubscriberRegistry};
pub use sender::{MessageDelivery, NoOpDelivery, Subscriber};
pub use telegram::TelegramDelivery;
