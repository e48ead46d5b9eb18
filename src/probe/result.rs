//! 探测结果数据结构
//!
//! 定义监控目标、探测状态和探测结果类型

use crate::config::TargetConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 监控目标
///
/// 在一个探测周期内不可变，由外部存储拥有，按值传入核心。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    /// 目标ID（存储分配，可能被重新生成）
    pub id: Uuid,
    /// 主机名
    pub host: String,
    /// 显示名称
    pub name: String,
    /// 探测URL
    pub url: String,
}

impl Target {
    /// 创建新的监控目标
    ///
    /// # 参数
    /// * `host` - 主机名
    /// * `name` - 显示名称
    /// * `url` - 探测URL（缺省时为 https://{host}）
    ///
    /// # 返回
    /// * `Self` - 目标实例
    pub fn new(host: String, name: String, url: Option<String>) -> Self {
        let url = url.unwrap_or_else(|| format!("https://{}", host));
        Self {
            id: Uuid::new_v4(),
            host,
            name,
            url,
        }
    }

    /// 获取跨周期的稳定标识
    ///
    /// 差异追踪使用 (host, name) 而非存储分配的id，
    /// 因为历史记录行的id可能被置空或重新生成。
    pub fn key(&self) -> TargetKey {
        TargetKey {
            host: self.host.clone(),
            name: self.name.clone(),
        }
    }
}

impl From<&TargetConfig> for Target {
    fn from(config: &TargetConfig) -> Self {
        Target::new(config.host.clone(), config.name.clone(), config.url.clone())
    }
}

/// 跨周期差异追踪使用的稳定标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetKey {
    /// 主机名
    pub host: String,
    /// 显示名称
    pub name: String,
}

/// 探测状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// 目标在线
    Online,
    /// 目标离线
    Offline,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Online => write!(f, "在线"),
            ProbeStatus::Offline => write!(f, "离线"),
        }
    }
}

impl ProbeStatus {
    /// 判断是否在线
    pub fn is_online(&self) -> bool {
        matches!(self, ProbeStatus::Online)
    }
}

/// 探测结果
///
/// 每个目标每个周期产生一条，创建后不再修改，
/// 一个周期的结果集是一个新的不可变批次。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 目标ID
    pub target_id: Uuid,
    /// 主机名
    pub host: String,
    /// 显示名称
    pub name: String,
    /// 探测URL
    pub url: String,
    /// 探测状态
    pub status: ProbeStatus,
    /// HTTP状态码（在线时存在）
    pub response_code: Option<u16>,
    /// 响应延迟（在线时存在）
    #[serde(default, with = "option_duration_serde")]
    pub latency: Option<Duration>,
    /// 探测时间戳
    pub timestamp: DateTime<Utc>,
    /// 失败原因（解析失败或I/O失败时存在）
    pub failure_reason: Option<String>,
}

impl ProbeResult {
    /// 创建新的探测结果
    ///
    /// # 参数
    /// * `target` - 监控目标
    /// * `status` - 探测状态
    ///
    /// # 返回
    /// * `Self` - 探测结果实例
    pub fn new(target: &Target, status: ProbeStatus) -> Self {
        Self {
            target_id: target.id,
            host: target.host.clone(),
            name: target.name.clone(),
            url: target.url.clone(),
            status,
            response_code: None,
            latency: None,
            timestamp: Utc::now(),
            failure_reason: None,
        }
    }

    /// 设置HTTP状态码
    pub fn with_response_code(mut self, code: u16) -> Self {
        self.response_code = Some(code);
        self
    }

    /// 设置响应延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 设置失败原因
    pub fn with_failure_reason(mut self, reason: String) -> Self {
        self.failure_reason = Some(reason);
        self
    }

    /// 获取跨周期的稳定标识
    pub fn key(&self) -> TargetKey {
        TargetKey {
            host: self.host.clone(),
            name: self.name.clone(),
        }
    }

    /// 复制一份并重新标记状态（用于恢复告警条目）
    pub fn relabeled(&self, status: ProbeStatus) -> Self {
        let mut copy = self.clone();
        copy.status = status;
        copy
    }

    /// 获取延迟（毫秒）
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency.map(|d| d.as_millis() as u64)
    }
}

/// Option<Duration>序列化模块（毫秒）
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_target() -> Target {
        Target::new(
            "example.com".to_string(),
            "主站".to_string(),
            None,
        )
    }

    #[test]
    fn test_target_default_url() {
        let target = sample_target();
        assert_eq!(target.url, "https://example.com");
    }

    #[test]
    fn test_target_key_ignores_id() {
        let a = sample_target();
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        // 存储重新分配id不影响差异追踪标识
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_probe_status_display() {
        assert_eq!(ProbeStatus::Online.to_string(), "在线");
        assert_eq!(ProbeStatus::Offline.to_string(), "离线");
    }

    #[test]
    fn test_probe_result_builder() {
        let target = sample_target();
        let result = ProbeResult::new(&target, ProbeStatus::Online)
            .with_response_code(200)
            .with_latency(Duration::from_millis(120));

        assert_eq!(result.status, ProbeStatus::Online);
        assert_eq!(result.response_code, Some(200));
        assert_eq!(result.latency_ms(), Some(120));
        assert!(result.failure_reason.is_none());
    }

    #[test]
    fn test_probe_result_relabeled() {
        let target = sample_target();
        let offline = ProbeResult::new(&target, ProbeStatus::Offline);
        let online = offline.relabeled(ProbeStatus::Online);

        assert_eq!(offline.status, ProbeStatus::Offline);
        assert_eq!(online.status, ProbeStatus::Online);
        assert_eq!(online.key(), offline.key());
    }

    #[test]
    fn test_probe_result_serialization() {
        let target = sample_target();
        let result = ProbeResult::new(&target, ProbeStatus::Online)
            .with_response_code(200)
            .with_latency(Duration::from_millis(55));

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("online"));

        let parsed: ProbeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, ProbeStatus::Online);
        assert_eq!(parsed.latency_ms(), Some(55));
    }

    #[test]
    fn test_offline_result_has_no_metadata() {
        let target = sample_target();
        let result = ProbeResult::new(&target, ProbeStatus::Offline)
            .with_failure_reason("域名解析失败".to_string());

        assert!(result.response_code.is_none());
        assert!(result.latency.is_none());
        assert!(result.failure_reason.is_some());
    }
}
