//! 订阅者注册表
//!
//! 告警订阅者的动态注册表。成员变更（添加、清空）由外部事件驱动，
//! 分发组件每个周期只读取一次一致的快照。

use crate::notify::sender::Subscriber;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// 订阅者注册表trait
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// 获取当前订阅者快照
    ///
    /// # 返回
    /// * `Vec<Subscriber>` - 快照列表
    async fn list_subscribers(&self) -> Vec<Subscriber>;

    /// 添加订阅者
    ///
    /// # 参数
    /// * `subscriber` - 要添加的订阅者
    async fn add(&self, subscriber: Subscriber);

    /// 清空全部订阅者
    async fn clear(&self);
}

/// 内存订阅者注册表实现
#[derive(Default)]
pub struct InMemorySubscriberRegistry {
    /// 订阅者列表
    subscribers: RwLock<Vec<Subscriber>>,
}

impl InMemorySubscriberRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRegistry for InMemorySubscriberRegistry {
    async fn list_subscribers(&self) -> Vec<Subscriber> {
        self.subscribers.read().await.clone()
    }

    async fn add(&self, subscriber: Subscriber) {
        let mut subscribers = self.subscribers.write().await;
        if !subscribers.contains(&subscriber) {
            info!("添加告警订阅者: {}", subscriber.id);
            subscribers.push(subscriber);
        }
    }

    async fn clear(&self) {
        info!("清空告警订阅者列表");
        self.subscribers.write().await.clear();
    }
}
