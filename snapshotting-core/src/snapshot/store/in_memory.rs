use super::{
    SnapshotCodec, SnapshotRow, SnapshotStore, StorageKey, ensure_same_aggregate, not_found,
};
use crate::{
    error::{DomainError, DomainResult},
    persist::SerializedMessage,
};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, warn};

/// 内存快照存储：每个聚合一组按版本降序排列的行，`offset` 即下标
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    rows: DashMap<StorageKey, Vec<SnapshotRow>>,
    codec: SnapshotCodec,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: SnapshotCodec) -> Self {
        Self {
            rows: DashMap::new(),
            codec,
        }
    }

    /// 某聚合已存储的快照行数
    pub fn snapshot_count(&self, aggregate_id: &str) -> DomainResult<usize> {
        let key = self.codec.encode_key(aggregate_id)?;
        Ok(self.rows.get(&key).map(|rows| rows.len()).unwrap_or(0))
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, aggregate_id: &str, offset: usize) -> DomainResult<SerializedMessage> {
        let key = self.codec.encode_key(aggregate_id)?;
        let rows = self
            .rows
            .get(&key)
            .ok_or_else(|| not_found(aggregate_id, "memory"))?;
        let row = rows
            .value()
            .get(offset)
            .ok_or_else(|| not_found(aggregate_id, "memory"))?;

        debug!(aggregate_id, offset, version = row.version, "snapshot loaded");
        self.codec.decode(row)
    }

    async fn append(&self, aggregate_id: &str, message: SerializedMessage) -> DomainResult<()> {
        ensure_same_aggregate(aggregate_id, &message)?;
        let row = self.codec.encode(&message)?;

        // entry 持有分片写锁，唯一性检查与插入不可分割
        let mut rows = self.rows.entry(row.aggregate_id.clone()).or_default();
        if rows.iter().any(|existing| existing.version == row.version) {
            warn!(aggregate_id, version = row.version, "duplicate snapshot rejected");
            return Err(DomainError::StorageConflict {
                aggregate_id: aggregate_id.to_string(),
                version: message.version().value(),
            });
        }

        let position = rows
            .iter()
            .position(|existing| existing.version < row.version)
            .unwrap_or(rows.len());
        debug!(aggregate_id, version = row.version, "snapshot appended");
        rows.insert(position, row);
        Ok(())
    }
}
