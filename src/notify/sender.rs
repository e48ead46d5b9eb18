//! 消息投递接口
//!
//! 定义告警消息投递的trait和空实现

use async_trait::async_trait;

/// 订阅者：告警消息的投递目的地（例如一个聊天身份）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscriber {
    /// 目的地标识（例如chat id）
    pub id: String,
}

impl Subscriber {
    /// 创建新的订阅者
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// 消息投递trait
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// 向单个订阅者投递一条文本消息
    ///
    /// # 参数
    /// * `subscriber` - 订阅者
    /// * `text` - 消息文本
    ///
    /// # 返回
    /// * `anyhow::Result<()>` - 投递结果
    async fn deliver(&self, subscriber: &Subscriber, text: &str) -> anyhow::Result<()>;
}

/// 空的消息投递实现（用于测试或禁用通知）
pub struct NoOpDelivery;

#[async_trait]
impl MessageDelivery for NoOpDelivery {
    async fn deliver(&self, _subscriber: &Subscriber, _text: &str) -> anyhow::Result<()> {
        // 不执行任何操作
        Ok(())
    }
}
