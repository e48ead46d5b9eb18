//! 上下线差异追踪器
//!
//! 对比当前周期与上一周期的离线目标集合，计算需要告警的变化集

use crate::probe::{ProbeResult, ProbeStatus, TargetKey};
use std::collections::HashMap;
use tracing::debug;

/// 上下线差异追踪器
///
/// 保存上一个已完成周期的离线目标集合，以 (host, name) 为键。
/// 差异计算与状态提交在 `process` 中作为同一原子步骤完成，
/// 调用方通过调度器的周期串行化保证不会并发调用。
#[derive(Debug, Default)]
pub struct DeltaTracker {
    /// 上一周期的离线目标集合
    previous_offline: HashMap<TargetKey, ProbeResult>,
}

impl DeltaTracker {
    /// 创建新的差异追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 纯差异计算：对称差
    ///
    /// 本周期新离线的目标标记为离线，上一周期离线而本周期恢复的
    /// 目标重新标记为在线。同一周期内一个目标恢复、另一个目标离线
    /// 也会产生非空变化集（集合大小比较法会漏报这种情况）。
    ///
    /// # 参数
    /// * `current` - 当前周期的离线集合
    /// * `previous` - 上一周期的离线集合
    ///
    /// # 返回
    /// * `Vec<ProbeResult>` - 需要告警的变化集
    pub fn delta(
        current: &HashMap<TargetKey, ProbeResult>,
        previous: &HashMap<TargetKey, ProbeResult>,
    ) -> Vec<ProbeResult> {
        let mut delta = Vec::new();

        // 新离线的目标
        for (key, result) in current {
            if !previous.contains_key(key) {
                delta.push(result.clone());
            }
        }

        // 已恢复的目标
        for (key, result) in previous {
            if !current.contains_key(key) {
                delta.push(result.relabeled(ProbeStatus::Online));
            }
        }

        delta
    }

    /// 计算本周期变化集并提交新的离线集合
    ///
    /// 空变化集是正常且频繁的结果（离线集合没有变化），不触发告警。
    ///
    /// # 参数
    /// * `current_offline` - 当前周期的离线结果列表
    ///
    /// # 返回
    /// * `Vec<ProbeResult>` - 需要告警的变化集
    pub fn process(&mut self, current_offline: Vec<ProbeResult>) -> Vec<ProbeResult> {
        let current: HashMap<TargetKey, ProbeResult> = current_offline
            .into_iter()
            .map(|r| (r.key(), r))
            .collect();

        let delta = Self::delta(&current, &self.previous_offline);

        debug!(
            "差异计算完成: 上周期离线 {}，本周期离线 {}，变化 {}",
            self.previous_offline.len(),
            current.len(),
            delta.len()
        );

        self.previous_offline = current;
        delta
    }

    /// 获取上一周期的离线目标数量
    pub fn previous_offline_count(&self) -> usize {
        self.previous_offline.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Target;

    fn offline(host: &str) -> ProbeResult {
        let target = Target::new(host.to_string(), host.to_string(), None);
        ProbeResult::new(&target, ProbeStatus::Offline)
    }

    fn hosts(results: &[ProbeResult]) -> Vec<&str> {
        let mut hosts: Vec<&str> = results.iter().map(|r| r.host.as_str()).collect();
        hosts.sort();
        hosts
    }

    #[test]
    fn test_all_recovered() {
        let mut tracker = DeltaTracker::new();
        tracker.process(vec![offline("a"), offline("b")]);

        let delta = tracker.process(vec![]);

        assert_eq!(hosts(&delta), vec!["a", "b"]);
        assert!(delta.iter().all(|r| r.status == ProbeStatus::Online));
        assert_eq!(tracker.previous_offline_count(), 0);
    }

    #[test]
    fn test_newly_offline() {
        let mut tracker = DeltaTracker::new();
        tracker.process(vec![offline("a")]);

        let delta = tracker.process(vec![offline("a"), offline("b")]);

        assert_eq!(hosts(&delta), vec!["b"]);
        assert_eq!(delta[0].status, ProbeStatus::Offline);
        assert_eq!(tracker.previous_offline_count(), 2);
    }

    #[test]
    fn test_partially_recovered() {
        let mut tracker = DeltaTracker::new();
        tracker.process(vec![offline("a"), offline("b")]);

        let delta = tracker.process(vec![offline("a")]);

        assert_eq!(hosts(&delta), vec!["b"]);
        assert_eq!(delta[0].status, ProbeStatus::Online);
    }

    #[test]
    fn test_unchanged_is_empty() {
        let mut tracker = DeltaTracker::new();
        tracker.process(vec![offline("a")]);

        let delta = tracker.process(vec![offline("a")]);

        assert!(delta.is_empty());
        assert_eq!(tracker.previous_offline_count(), 1);
    }

    #[test]
    fn test_first_cycle_reports_all_offline() {
        let mut tracker = DeltaTracker::new();

        let delta = tracker.process(vec![offline("a")]);

        assert_eq!(hosts(&delta), vec!["a"]);
        assert_eq!(delta[0].status, ProbeStatus::Offline);
    }

    #[test]
    fn test_simultaneous_swap_detected() {
        // 同周期内a恢复、b离线，集合大小不变，对称差仍能捕获两者
        let mut tracker = DeltaTracker::new();
        tracker.process(vec![offline("a")]);

        let delta = tracker.process(vec![offline("b")]);

        assert_eq!(hosts(&delta), vec!["a", "b"]);
        let a = delta.iter().find(|r| r.host == "a").unwrap();
        let b = delta.iter().find(|r| r.host == "b").unwrap();
        assert_eq!(a.status, ProbeStatus::Online);
        assert_eq!(b.status, ProbeStatus::Offline);
    }

    #[test]
    fn test_identity_is_host_and_name() {
        let mut tracker = DeltaTracker::new();

        let target = Target::new("a".to_string(), "服务器A".to_string(), None);
        tracker.process(vec![ProbeResult::new(&target, ProbeStatus::Offline)]);

        // 同一(host, name)但存储重新分配了id，不应视为新目标
        let mut reassigned = Target::new("a".to_string(), "服务器A".to_string(), None);
        reassigned.id = uuid::Uuid::new_v4();
        let delta = tracker.process(vec![ProbeResult::new(&reassigned, ProbeStatus::Offline)]);

        assert!(delta.is_empty());
    }
}
