//! 集成测试共用的测试替身
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use server_pulse::error::{NotificationError, Result, StorageError};
use server_pulse::notify::{LiveChannel, MessageDelivery, Subscriber};
use server_pulse::probe::{ProbeResult, ProbeStatus, Prober, Target};
use server_pulse::storage::{InMemoryTargetStore, TargetStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// 按主机名脚本化返回结果的探测器，可注入延迟并记录并发峰值
pub struct ScriptedProber {
    offline_hosts: Mutex<HashSet<String>>,
    delay: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
    total_probes: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            offline_hosts: Mutex::new(HashSet::new()),
            delay,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            total_probes: AtomicUsize::new(0),
        }
    }

    /// 设置离线主机集合（下个探测立即生效）
    pub fn set_offline(&self, hosts: &[&str]) {
        let mut offline = self.offline_hosts.lock().unwrap();
        offline.clear();
        offline.extend(hosts.iter().map(|h| h.to_string()));
    }

    /// 并发探测峰值
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// 累计探测次数
    pub fn total_probes(&self) -> usize {
        self.total_probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &Target, _probe_timeout: Duration) -> ProbeResult {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total_probes.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.current.fetch_sub(1, Ordering::SeqCst);

        let offline = self.offline_hosts.lock().unwrap().contains(&target.host);
        if offline {
            ProbeResult::new(target, ProbeStatus::Offline)
        } else {
            ProbeResult::new(target, ProbeStatus::Online).with_response_code(200)
        }
    }
}

/// 记录投递内容的消息投递器，可对指定订阅者注入失败
pub struct RecordingDelivery {
    failing: HashSet<String>,
    delivered: Mutex<Vec<(String, String)>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| id.to_string()).collect(),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// 已成功投递的 (订阅者, 消息) 列表
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageDelivery for RecordingDelivery {
    async fn deliver(&self, subscriber: &Subscriber, text: &str) -> anyhow::Result<()> {
        if self.failing.contains(&subscriber.id) {
            anyhow::bail!("投递被拒绝: {}", subscriber.id);
        }
        self.delivered
            .lock()
            .unwrap()
            .push((subscriber.id.clone(), text.to_string()));
        Ok(())
    }
}

/// 可注入历史写入失败的存储包装
pub struct UnreliableStore {
    inner: InMemoryTargetStore,
    fail_history: AtomicBool,
}

impl UnreliableStore {
    pub async fn with_targets(targets: Vec<Target>) -> Self {
        Self {
            inner: InMemoryTargetStore::with_targets(targets).await,
            fail_history: AtomicBool::new(false),
        }
    }

    /// 开关历史写入失败注入
    pub fn set_history_failing(&self, failing: bool) {
        self.fail_history.store(failing, Ordering::SeqCst);
    }

    pub async fn history_len(&self) -> usize {
        self.inner.history_len().await
    }
}

#[async_trait]
impl TargetStore for UnreliableStore {
    async fn list_targets(&self) -> Result<Vec<Target>> {
        self.inner.list_targets().await
    }

    async fn get_target(&self, id: Uuid) -> Result<Target> {
        self.inner.get_target(id).await
    }

    async fn append_history(&self, results: &[ProbeResult]) -> Result<()> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(StorageError::HistoryWriteError("历史存储不可用".to_string()).into());
        }
        self.inner.append_history(results).await
    }
}

/// 可注入推送失败的实时通道，记录成功推送次数
pub struct FlakyLiveChannel {
    failing: AtomicBool,
    published: AtomicUsize,
}

impl FlakyLiveChannel {
    pub fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            published: AtomicUsize::new(0),
        }
    }

    /// 开关推送失败注入
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 成功推送的帧数
    pub fn published(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveChannel for FlakyLiveChannel {
    async fn publish(&self, topic: &str, _payload: Value) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::ChannelError(format!("主题 {} 推送失败", topic)).into());
        }
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 构造测试目标
pub fn make_targets(hosts: &[&str]) -> Vec<Target> {
    hosts
        .iter()
        .map(|h| Target::new(h.to_string(), format!("服务器-{}", h), None))
        .collect()
}
