//! 存储协作方接口
//!
//! 目标与历史记录的持久化由外部存储负责，核心只消费这组契约。
//! 历史写入是尽力而为的记录，不与探测构成事务。

use crate::error::{Result, StorageError};
use crate::probe::{ProbeResult, Target};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 目标存储trait，定义存储协作方接口
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// 列出全部监控目标
    ///
    /// # 返回
    /// * `Result<Vec<Target>>` - 目标列表
    async fn list_targets(&self) -> Result<Vec<Target>>;

    /// 按ID获取目标
    ///
    /// # 参数
    /// * `id` - 目标ID
    ///
    /// # 返回
    /// * `Result<Target>` - 目标，不存在时返回错误
    async fn get_target(&self, id: Uuid) -> Result<Target>;

    /// 追加一批历史记录
    ///
    /// # 参数
    /// * `results` - 本周期的探测结果集
    ///
    /// # 返回
    /// * `Result<()>` - 写入结果
    async fn append_history(&self, results: &[ProbeResult]) -> Result<()>;
}

/// 内存目标存储实现（用于组装和测试）
#[derive(Default)]
pub struct InMemoryTargetStore {
    /// 目标表
    targets: RwLock<HashMap<Uuid, Target>>,
    /// 历史记录
    history: RwLock<Vec<ProbeResult>>,
}

impl InMemoryTargetStore {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用初始目标列表创建内存存储
    pub async fn with_targets(targets: Vec<Target>) -> Self {
        let store = Self::new();
        for target in targets {
            store.add_target(target).await;
        }
        store
    }

    /// 添加目标
    ///
    /// # 参数
    /// * `target` - 要添加的目标
    pub async fn add_target(&self, target: Target) {
        self.targets.write().await.insert(target.id, target);
    }

    /// 移除目标
    pub async fn remove_target(&self, id: Uuid) {
        self.targets.write().await.remove(&id);
    }

    /// 获取历史记录条数
    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    /// 获取历史记录快照
    pub async fn history_snapshot(&self) -> Vec<ProbeResult> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    async fn list_targets(&self) -> Result<Vec<Target>> {
        Ok(self.targets.read().await.values().cloned().collect())
    }

    async fn get_target(&self, id: Uuid) -> Result<Target> {
        self.targets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::TargetNotFound { id }.into())
    }

    async fn append_history(&self, results: &[ProbeResult]) -> Result<()> {
        self.history.write().await.extend_from_slice(results);
        Ok(())
    }
}
