//! 实时结果推送通道
//!
//! 每个周期把完整结果集推送给订阅了实时更新的消费者，发后即忘。

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// 实时推送帧
#[derive(Debug, Clone)]
pub struct LiveUpdate {
    /// 主题
    pub topic: String,
    /// JSON负载
    pub payload: Value,
}

/// 实时通道trait
#[async_trait]
pub trait LiveChannel: Send + Sync {
    /// 向主题推送一帧负载
    ///
    /// # 参数
    /// * `topic` - 主题
    /// * `payload` - JSON负载
    ///
    /// # 返回
    /// * `Result<()>` - 推送结果，核心不要求确认
    async fn publish(&self, topic: &str, payload: Value) -> Result<()>;
}

/// 基于广播通道的实时推送实现
pub struct BroadcastLiveChannel {
    /// 广播发送端
    sender: broadcast::Sender<LiveUpdate>,
}

impl BroadcastLiveChannel {
    /// 创建新的广播通道
    ///
    /// # 参数
    /// * `capacity` - 通道容量
    ///
    /// # 返回
    /// * `Self` - 通道实例
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅实时更新
    pub fn subscribe(&self) -> broadcast::Receiver<LiveUpdate> {
        self.sender.subscribe()
    }

    /// 获取当前接收端数量
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastLiveChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl LiveChannel for BroadcastLiveChannel {
    async fn publish(&self, topic: &str, payload: Value) -> Result<()> {
        let update = LiveUpdate {
            topic: topic.to_string(),
            payload,
        };

        // 没有接收端时发送失败是正常情况，发后即忘
        if self.sender.send(update).is_err() {
            debug!("主题 {} 当前没有实时订阅者", topic);
        }

        Ok(())
    }
}
