//! 告警消息模板
//!
//! 将一个周期的变化集渲染为一条汇总消息（每周期一条，不是每目标一条）

use crate::error::{NotificationError, Result};
use crate::probe::ProbeResult;
use handlebars::Handlebars;
use serde_json::json;
use std::time::Duration;

/// 默认告警模板
const DEFAULT_TEMPLATE: &str = "\
{{#each targets}}\
服务器 {{name}} url {{url}} 状态 {{status}}，超时阈值 {{../timeout_ms}} 毫秒，检测周期 {{../period_seconds}} 秒\n\
{{/each}}";

/// 告警消息模板
pub struct AlertTemplate {
    /// handlebars注册表
    registry: Handlebars<'static>,
}

impl AlertTemplate {
    /// 创建告警模板
    ///
    /// # 参数
    /// * `template` - 自定义模板（handlebars语法），缺省时使用内置模板
    ///
    /// # 返回
    /// * `Result<Self>` - 模板实例，模板语法错误时同步拒绝
    pub fn new(template: Option<&str>) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry
            .register_template_string("alert", template.unwrap_or(DEFAULT_TEMPLATE))
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;

        Ok(Self { registry })
    }

    /// 渲染一条汇总消息
    ///
    /// # 参数
    /// * `delta` - 本周期的变化集
    /// * `period` - 当前检测周期
    /// * `probe_timeout` - 当前探测超时
    ///
    /// # 返回
    /// * `Result<String>` - 渲染后的消息
    pub fn render(
        &self,
        delta: &[ProbeResult],
        period: Duration,
        probe_timeout: Duration,
    ) -> Result<String> {
        let targets: Vec<_> = delta
            .iter()
            .map(|r| {
                json!({
                    "name": r.name,
                    "host": r.host,
                    "url": r.url,
                    "status": r.status.to_string(),
                    "failure_reason": r.failure_reason,
                })
            })
            .collect();

        let context = json!({
            "targets": targets,
            "period_seconds": period.as_secs(),
            "timeout_ms": probe_timeout.as_millis() as u64,
        });

        self.registry
            .render("alert", &context)
            .map_err(|e| NotificationError::TemplateError(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeStatus, Target};

    fn delta_entry(host: &str, name: &str, status: ProbeStatus) -> ProbeResult {
        let target = Target::new(host.to_string(), name.to_string(), None);
        ProbeResult::new(&target, status)
    }

    #[test]
    fn test_render_default_template() {
        let template = AlertTemplate::new(None).unwrap();
        let delta = vec![
            delta_entry("a.example.com", "服务器A", ProbeStatus::Offline),
            delta_entry("b.example.com", "服务器B", ProbeStatus::Online),
        ];

        let message = template
            .render(&delta, Duration::from_secs(60), Duration::from_millis(5000))
            .unwrap();

        assert!(message.contains("服务器A"));
        assert!(message.contains("服务器B"));
        assert!(message.contains("离线"));
        assert!(message.contains("在线"));
        assert!(message.contains("60"));
        assert!(message.contains("5000"));
        // 一条消息两行，每个变化条目一行
        assert_eq!(message.lines().count(), 2);
    }

    #[test]
    fn test_render_custom_template() {
        let template =
            AlertTemplate::new(Some("{{#each targets}}{{name}}:{{status}};{{/each}}")).unwrap();
        let delta = vec![delta_entry("a.example.com", "A", ProbeStatus::Offline)];

        let message = template
            .render(&delta, Duration::from_secs(30), Duration::from_millis(1000))
            .unwrap();

        assert_eq!(message, "A:离线;");
    }

    #[test]
    fn test_invalid_template_rejected() {
        assert!(AlertTemplate::new(Some("{{#each targets}}")).is_err());
    }

    #[test]
    fn test_render_empty_delta() {
        let template = AlertTemplate::new(None).unwrap();
        let message = template
            .render(&[], Duration::from_secs(60), Duration::from_millis(5000))
            .unwrap();
        assert!(message.is_empty());
    }
}
