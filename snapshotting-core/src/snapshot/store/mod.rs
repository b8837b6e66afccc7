//! 快照存储（SnapshotStore）
//!
//! 以聚合 ID 为键、按版本排序的快照行存储。同一 (aggregate_id, version)
//! 只能写入一次，重复写入返回 `StorageConflict`。
//!
mod codec;
mod in_memory;
#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub mod sql;

pub use codec::{IdentifierEncoding, SnapshotCodec, SnapshotRow, StorageKey};
pub use in_memory::InMemorySnapshotStore;

use crate::{
    error::{DomainError, DomainResult},
    persist::SerializedMessage,
};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 读取从最新一行往前数第 `offset` 行；不存在时返回 `NotFound`
    async fn load(&self, aggregate_id: &str, offset: usize) -> DomainResult<SerializedMessage>;

    /// 原子地追加一行快照
    async fn append(&self, aggregate_id: &str, message: SerializedMessage) -> DomainResult<()>;

    /// 读取最新一行
    async fn load_latest(&self, aggregate_id: &str) -> DomainResult<SerializedMessage> {
        self.load(aggregate_id, 0).await
    }
}

#[async_trait]
impl<T> SnapshotStore for Arc<T>
where
    T: SnapshotStore + ?Sized,
{
    async fn load(&self, aggregate_id: &str, offset: usize) -> DomainResult<SerializedMessage> {
        (**self).load(aggregate_id, offset).await
    }

    async fn append(&self, aggregate_id: &str, message: SerializedMessage) -> DomainResult<()> {
        (**self).append(aggregate_id, message).await
    }
}

pub(crate) fn not_found(aggregate_id: &str, location: &str) -> DomainError {
    DomainError::NotFound {
        reason: format!("snapshot not found for aggregate with id {aggregate_id} in {location}"),
    }
}

pub(crate) fn ensure_same_aggregate(aggregate_id: &str, message: &SerializedMessage) -> DomainResult<()> {
    if message.aggregate_id() != aggregate_id {
        return Err(DomainError::InvalidValue {
            reason: format!(
                "snapshot message belongs to aggregate {} but was appended under {aggregate_id}",
                message.aggregate_id()
            ),
        });
    }
    Ok(())
}
