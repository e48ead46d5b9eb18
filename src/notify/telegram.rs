//! Telegram消息投递实现
//!
//! 通过Bot API的sendMessage接口向订阅者投递告警消息

use crate::notify::sender::{MessageDelivery, Subscriber};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

/// Telegram消息投递器
pub struct TelegramDelivery {
    /// HTTP客户端
    client: Client,
    /// Bot API基础地址
    api_base: String,
    /// 机器人token
    token: String,
}

impl TelegramDelivery {
    /// 创建新的Telegram投递器
    ///
    /// # 参数
    /// * `token` - 机器人token
    ///
    /// # 返回
    /// * `Result<Self>` - 投递器实例
    pub fn new(token: String) -> Result<Self> {
        Self::with_api_base(token, "https://api.telegram.org".to_string())
    }

    /// 创建使用自定义API地址的投递器（用于测试）
    ///
    /// # 参数
    /// * `token` - 机器人token
    /// * `api_base` - Bot API基础地址
    ///
    /// # 返回
    /// * `Result<Self>` - 投递器实例
    pub fn with_api_base(token: String, api_base: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("创建HTTP客户端失败")?;

        Ok(Self {
            client,
            api_base,
            token,
        })
    }
}

#[async_trait]
impl MessageDelivery for TelegramDelivery {
    async fn deliver(&self, subscriber: &Subscriber, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = json!({
            "chat_id": subscriber.id,
            "text": text,
        });

        debug!("向订阅者 {} 发送Telegram消息", subscriber.id);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("发送Telegram消息失败")?;

        if response.status().is_success() {
            info!("Telegram消息发送成功: {}", subscriber.id);
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Telegram消息发送失败: {} - {}", status, text);
            Err(anyhow::anyhow!("Telegram消息发送失败: {}", status))
        }
    }
}
