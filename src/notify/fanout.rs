//! 通知分发器
//!
//! 每个周期把完整结果集推送到实时通道，并在有变化时向全部订阅者
//! 发送一条汇总告警，单个订阅者的投递失败相互隔离。

use crate::alert::AlertTemplate;
use crate::error::Result;
use crate::notify::live::LiveChannel;
use crate::notify::registry::SubscriberRegistry;
use crate::notify::sender::MessageDelivery;
use crate::probe::ProbeResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// 通知分发器
pub struct NotificationFanout {
    /// 实时通道
    live: Arc<dyn LiveChannel>,
    /// 消息投递器
    delivery: Arc<dyn MessageDelivery>,
    /// 订阅者注册表
    registry: Arc<dyn SubscriberRegistry>,
    /// 告警消息模板
    template: AlertTemplate,
}

impl NotificationFanout {
    /// 创建新的通知分发器
    ///
    /// # 参数
    /// * `live` - 实时通道
    /// * `delivery` - 消息投递器
    /// * `registry` - 订阅者注册表
    /// * `template` - 告警消息模板
    ///
    /// # 返回
    /// * `Self` - 分发器实例
    pub fn new(
        live: Arc<dyn LiveChannel>,
        delivery: Arc<dyn MessageDelivery>,
        registry: Arc<dyn SubscriberRegistry>,
        template: AlertTemplate,
    ) -> Self {
        Self {
            live,
            delivery,
            registry,
            template,
        }
    }

    /// 推送完整结果集到实时通道
    ///
    /// 无论告警是否开启，每个周期恰好推送一次。
    /// 推送硬失败作为本周期的错误上报，下一周期不受影响。
    ///
    /// # 参数
    /// * `topic` - 推送主题
    /// * `results` - 本周期的完整结果集
    ///
    /// # 返回
    /// * `Result<()>` - 推送结果
    pub async fn publish(&self, topic: &str, results: &[ProbeResult]) -> Result<()> {
        let payload = serde_json::to_value(results)?;
        self.live.publish(topic, payload).await
    }

    /// 向全部订阅者发送一条汇总告警
    ///
    /// 每个周期渲染一条消息（不是每个目标一条），发送给注册表的
    /// 当前快照。单个订阅者投递失败只记录日志，不影响其余订阅者，
    /// 也不会让周期失败。
    ///
    /// # 参数
    /// * `delta` - 本周期的变化集（调用方保证非空）
    /// * `period` - 当前检测周期
    /// * `probe_timeout` - 当前探测超时
    pub async fn alert(&self, delta: &[ProbeResult], period: Duration, probe_timeout: Duration) {
        let subscribers = self.registry.list_subscribers().await;
        if subscribers.is_empty() {
            debug!("没有告警订阅者，跳过发送");
            return;
        }

        let text = match self.template.render(delta, period, probe_timeout) {
            Ok(text) => text,
            Err(e) => {
                error!("渲染告警消息失败: {}", e);
                return;
            }
        };

        let mut delivered = 0usize;
        for subscriber in &subscribers {
            match self.delivery.deliver(subscriber, &text).await {
                Ok(()) => delivered += 1,
                Err(e) => error!("向订阅者 {} 投递告警失败: {}", subscriber.id, e),
            }
        }

        info!(
            "告警分发完成: 变化条目 {}，订阅者 {}，成功 {}",
            delta.len(),
            subscribers.len(),
            delivered
        );
    }
}
